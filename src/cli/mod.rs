use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Overrides;
use crate::extractors::ClientPreset;

#[derive(Parser)]
#[command(
    name = "transcript-worker",
    about = "Transcript Worker - Fetch YouTube captions with yt-dlp and serve them as plain text",
    version,
    long_about = "An HTTP worker that runs yt-dlp with a series of client presets until one yields English (or configured) captions, then returns the caption text as JSON."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file (defaults to ./config.yaml, then the user config directory)
    #[arg(short, long, global = true, env = "TRANSCRIPT_WORKER_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub server: ServerArgs,

    #[command(flatten)]
    pub tool: ToolArgs,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server (default)
    Serve,

    /// Fetch one transcript and print the JSON response body
    Fetch {
        /// YouTube video URL
        #[arg(value_name = "URL")]
        url: String,
    },

    /// List the client presets that will be tried, in order
    Presets,

    /// Check that yt-dlp is installed and runnable
    Check,

    /// Show or initialise the configuration file
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,

        /// Write a default config file to the user config directory
        #[arg(long, conflicts_with = "show")]
        init: bool,
    },
}

/// Listener settings, resolved with or without a subcommand
#[derive(Args, Debug, Default)]
pub struct ServerArgs {
    /// Address to bind
    #[arg(long, global = true, env = "HOST", value_name = "ADDR")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, global = true, env = "PORT", value_name = "PORT")]
    pub port: Option<u16>,
}

/// Caption tool settings shared by every subcommand
#[derive(Args, Debug, Default)]
pub struct ToolArgs {
    /// Path to the yt-dlp executable
    #[arg(long, global = true, env = "YTDLP_PATH", value_name = "PATH")]
    pub yt_dlp: Option<String>,

    /// Subtitle language to request
    #[arg(long, global = true, env = "YTDLP_SUB_LANG", value_name = "LANG")]
    pub sub_lang: Option<String>,

    /// Seconds before a single yt-dlp run is killed
    #[arg(long, global = true, env = "YTDLP_TIMEOUT_SECS", value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Comma-separated client presets, tried in order
    #[arg(long, global = true, env = "YTDLP_PRESETS", value_delimiter = ',', value_name = "LIST")]
    pub presets: Option<Vec<ClientPreset>>,

    /// Directory for per-request temp workspaces
    #[arg(long, global = true, env = "TRANSCRIPT_TEMP_DIR", value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,
}

impl Cli {
    /// Collect config overrides from the parsed arguments
    pub fn overrides(&self) -> Overrides {
        Overrides {
            host: self.server.host.clone(),
            port: self.server.port,
            yt_dlp_path: self.tool.yt_dlp.clone(),
            sub_lang: self.tool.sub_lang.clone(),
            timeout_secs: self.tool.timeout,
            presets: self.tool.presets.clone(),
            temp_dir: self.tool.temp_dir.clone(),
        }
    }
}
