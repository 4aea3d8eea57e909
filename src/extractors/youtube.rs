use async_trait::async_trait;
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use super::{CaptionExtractor, ClientPreset, ExtractorError, ToolOutput};
use crate::config::YtDlpConfig;

/// YouTube caption extractor using yt-dlp
pub struct YtDlpExtractor {
    yt_dlp_path: String,
    sub_lang: String,
    include_manual_subs: bool,
    timeout: Duration,
}

impl YtDlpExtractor {
    pub fn new() -> Self {
        Self::from_config(&YtDlpConfig::default())
    }

    pub fn from_config(config: &YtDlpConfig) -> Self {
        Self {
            yt_dlp_path: config.binary.clone(),
            sub_lang: config.sub_lang.clone(),
            include_manual_subs: config.include_manual_subs,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Path or name of the executable being run
    pub fn binary(&self) -> &str {
        &self.yt_dlp_path
    }

    /// Report the installed yt-dlp version, if it can be run at all
    pub async fn version(&self) -> Option<String> {
        let output = Command::new(&self.yt_dlp_path)
            .arg("--version")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .ok()?;

        if !output.status.success() {
            return None;
        }

        Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Build the argument vector for one caption-only run
    pub fn build_args(&self, url: &str, preset: &ClientPreset, output_dir: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--skip-download".into(),
            "--write-auto-subs".into(),
        ];

        if self.include_manual_subs {
            args.push("--write-subs".into());
        }

        args.push("--sub-langs".into());
        args.push(OsString::from(&self.sub_lang));
        for flag in ["--sub-format", "vtt", "--no-playlist", "--no-progress", "-o"] {
            args.push(flag.into());
        }
        args.push(output_dir.join("%(id)s.%(ext)s").into_os_string());

        if let Some(extractor_args) = preset.extractor_args() {
            args.push("--extractor-args".into());
            args.push(extractor_args.into());
        }

        // Anything after `--` is a URL, never an option
        args.push("--".into());
        args.push(url.into());

        args
    }
}

#[async_trait]
impl CaptionExtractor for YtDlpExtractor {
    async fn fetch_captions(
        &self,
        url: &str,
        preset: &ClientPreset,
        output_dir: &Path,
    ) -> Result<ToolOutput, ExtractorError> {
        let args = self.build_args(url, preset, output_dir);
        tracing::info!(
            preset = %preset,
            "Running {} {}",
            self.yt_dlp_path,
            args.iter()
                .map(|arg| arg.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );

        let child = Command::new(&self.yt_dlp_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(self.timeout, child).await {
            Ok(result) => result.map_err(|source| ExtractorError::Spawn {
                tool: self.yt_dlp_path.clone(),
                source,
            })?,
            Err(_) => {
                return Err(ExtractorError::TimedOut {
                    tool: self.yt_dlp_path.clone(),
                    timeout: self.timeout,
                })
            }
        };

        Ok(ToolOutput {
            exit_code: output.status.code(),
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn tool_name(&self) -> &'static str {
        "yt-dlp"
    }
}

impl Default for YtDlpExtractor {
    fn default() -> Self {
        Self::new()
    }
}
