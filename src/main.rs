use anyhow::Context;
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use transcript_worker::server::{self, AppState, ErrorBody, TranscriptResponse};
use transcript_worker::{utils, Cli, Commands, Config, Result, TranscriptPipeline, YtDlpExtractor};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.json_logs);

    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_overrides(cli.overrides());
    config.validate()?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            // Check for required external dependencies (non-fatal in Docker)
            let extractor = YtDlpExtractor::from_config(&config.ytdlp);
            let missing_deps = utils::check_dependencies(&extractor).await;
            for dep in missing_deps {
                tracing::warn!("Dependency check warning: {} (continuing anyway)", dep);
            }

            let state = AppState {
                pipeline: Arc::new(TranscriptPipeline::new(&config)),
            };
            let addr = format!("{}:{}", config.server.host, config.server.port);
            server::serve(&addr, state)
                .await
                .with_context(|| format!("Failed to serve on {}", addr))?;
        }
        Commands::Fetch { url } => {
            let pipeline = TranscriptPipeline::new(&config);

            let output = match pipeline.fetch_from_query(Some(&url)).await {
                Ok(transcript) => {
                    let body = TranscriptResponse::from(transcript);
                    println!("{}", serde_json::to_string_pretty(&body)?);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    let body = ErrorBody::from(&e);
                    println!("{}", serde_json::to_string_pretty(&body)?);
                    ExitCode::FAILURE
                }
            };
            return Ok(output);
        }
        Commands::Presets => {
            println!("Client presets (tried in order):");
            for (index, preset) in config.ytdlp.presets.iter().enumerate() {
                match preset.extractor_args() {
                    Some(args) => println!("  {}. {} (--extractor-args {})", index + 1, preset, args),
                    None => println!("  {}. {} (yt-dlp defaults)", index + 1, preset),
                }
            }
        }
        Commands::Check => {
            let extractor = YtDlpExtractor::from_config(&config.ytdlp);
            match extractor.version().await {
                Some(version) => println!("✓ {} {}", config.ytdlp.binary, version),
                None => {
                    eprintln!("✗ {} is not available. Please install it: https://github.com/yt-dlp/yt-dlp", config.ytdlp.binary);
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Commands::Config { show, init } => {
            if init {
                let path = Config::default_path()?;
                if path.exists() {
                    anyhow::bail!("Config file already exists: {}", path.display());
                }
                Config::default().save(&path)?;
                println!("Default configuration written to: {}", path.display());
            } else if show {
                config.display();
            } else {
                println!("Edit the config file to change settings:");
                println!("  {}", Config::default_path()?.display());
                println!("Run with --show to print the active configuration.");
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn init_tracing(verbose: bool, json: bool) {
    let default_filter = if verbose {
        "transcript_worker=debug,tower_http=debug"
    } else {
        "transcript_worker=info,tower_http=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    // Logs go to stderr so `fetch` output stays clean JSON
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
