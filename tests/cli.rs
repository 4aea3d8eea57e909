use assert_cmd::Command;
use predicates::prelude::*;

fn worker() -> Command {
    let mut cmd = Command::cargo_bin("transcript-worker").unwrap();
    // Keep the host environment from leaking into the run
    for var in [
        "TRANSCRIPT_WORKER_CONFIG",
        "YTDLP_PATH",
        "YTDLP_SUB_LANG",
        "YTDLP_TIMEOUT_SECS",
        "YTDLP_PRESETS",
        "TRANSCRIPT_TEMP_DIR",
        "HOST",
        "PORT",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn help_lists_subcommands() {
    worker()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("fetch"))
        .stdout(predicate::str::contains("presets"));
}

#[test]
fn presets_follow_the_environment() {
    worker()
        .arg("presets")
        .env("YTDLP_PRESETS", "ios,tv_embedded")
        .assert()
        .success()
        .stdout(predicate::str::contains("1. ios (--extractor-args youtube:player_client=ios)"))
        .stdout(predicate::str::contains("2. tv_embedded"))
        .stdout(predicate::str::contains("default").not());
}

#[test]
fn fetch_rejects_non_youtube_urls_without_running_yt_dlp() {
    worker()
        .args(["fetch", "https://example.com/watch?v=abc"])
        .env("YTDLP_PATH", "/nonexistent/yt-dlp-binary")
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"errorCode\": \"INVALID_URL\""));
}

#[test]
fn fetch_reports_missing_binary_as_ytdlp_failure() {
    let temp = tempfile::tempdir().unwrap();
    worker()
        .args(["fetch", "https://youtu.be/dQw4w9WgXcQ"])
        .env("YTDLP_PATH", "/nonexistent/yt-dlp-binary")
        .env("TRANSCRIPT_TEMP_DIR", temp.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"errorCode\": \"YTDLP_FAILED\""))
        .stdout(predicate::str::contains("\"exitCode\": null"));

    assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
}

#[test]
fn unknown_preset_is_a_usage_error() {
    worker()
        .args(["presets", "--presets", "toaster"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown client preset"));
}

#[test]
fn explicit_missing_config_file_fails() {
    worker()
        .args(["--config", "/nonexistent/config.yaml", "presets"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file does not exist"));
}

#[test]
fn port_from_environment_is_applied() {
    let cwd = tempfile::tempdir().unwrap();
    worker()
        .current_dir(cwd.path())
        .env("PORT", "8081")
        .args(["config", "--show"])
        .assert()
        .success()
        .stdout(predicate::str::contains(":8081"));
}
