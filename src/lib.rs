//! Transcript Worker - fetch YouTube captions with yt-dlp and serve them as plain text
//!
//! The worker runs yt-dlp once per client preset until one of them yields a
//! WebVTT caption file, strips that file down to text, and reports failures
//! as a small set of typed error codes.

pub mod cli;
pub mod config;
pub mod extractors;
pub mod server;
pub mod subtitles;
pub mod transcript;
pub mod utils;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use extractors::{CaptionExtractor, ClientPreset, YtDlpExtractor};
pub use transcript::{Transcript, TranscriptPipeline};

use serde::Serialize;

/// Result type used throughout the application plumbing
pub type Result<T> = anyhow::Result<T>;

/// Machine-readable error codes returned to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    MissingUrl,
    InvalidUrl,
    YoutubeRateLimit,
    NoCaptions,
    VideoUnavailable,
    YoutubeBotCheck,
    YtdlpFailed,
    NoVttFile,
    EmptyTranscript,
    FsError,
    WorkerSetupFailed,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::MissingUrl => "MISSING_URL",
            ErrorCode::InvalidUrl => "INVALID_URL",
            ErrorCode::YoutubeRateLimit => "YOUTUBE_RATE_LIMIT",
            ErrorCode::NoCaptions => "NO_CAPTIONS",
            ErrorCode::VideoUnavailable => "VIDEO_UNAVAILABLE",
            ErrorCode::YoutubeBotCheck => "YOUTUBE_BOT_CHECK",
            ErrorCode::YtdlpFailed => "YTDLP_FAILED",
            ErrorCode::NoVttFile => "NO_VTT_FILE",
            ErrorCode::EmptyTranscript => "EMPTY_TRANSCRIPT",
            ErrorCode::FsError => "FS_ERROR",
            ErrorCode::WorkerSetupFailed => "WORKER_SETUP_FAILED",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error types a transcript request can end in
#[derive(thiserror::Error, Debug)]
pub enum TranscriptError {
    #[error("Query parameter \"url\" is required.")]
    MissingUrl,

    #[error("The provided URL does not look like a valid YouTube URL.")]
    InvalidUrl(String),

    #[error("YouTube is rate-limiting this server (HTTP 429). Try again later or paste the transcript manually.")]
    RateLimited,

    #[error("No captions were found for this video (manual or auto).")]
    NoCaptions,

    #[error("The video is private, removed, or otherwise unavailable.")]
    VideoUnavailable,

    #[error("YouTube asked this server to prove it is not a bot. Try again later.")]
    BotCheck,

    #[error("yt-dlp failed to fetch captions.")]
    ToolFailed {
        exit_code: Option<i32>,
        attempts: usize,
    },

    #[error("No caption (.vtt) file was produced for this video.")]
    NoVttFile,

    #[error("Captions were fetched but the resulting transcript was empty after processing.")]
    EmptyTranscript,

    #[error("Captions were fetched, but there was a filesystem error while reading the transcript.")]
    Filesystem(#[source] std::io::Error),

    #[error("Failed to prepare temporary environment for yt-dlp.")]
    Setup(#[source] std::io::Error),
}

impl TranscriptError {
    pub fn code(&self) -> ErrorCode {
        match self {
            TranscriptError::MissingUrl => ErrorCode::MissingUrl,
            TranscriptError::InvalidUrl(_) => ErrorCode::InvalidUrl,
            TranscriptError::RateLimited => ErrorCode::YoutubeRateLimit,
            TranscriptError::NoCaptions => ErrorCode::NoCaptions,
            TranscriptError::VideoUnavailable => ErrorCode::VideoUnavailable,
            TranscriptError::BotCheck => ErrorCode::YoutubeBotCheck,
            TranscriptError::ToolFailed { .. } => ErrorCode::YtdlpFailed,
            TranscriptError::NoVttFile => ErrorCode::NoVttFile,
            TranscriptError::EmptyTranscript => ErrorCode::EmptyTranscript,
            TranscriptError::Filesystem(_) => ErrorCode::FsError,
            TranscriptError::Setup(_) => ErrorCode::WorkerSetupFailed,
        }
    }

    /// Extra structured context for the response body
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            TranscriptError::ToolFailed {
                exit_code,
                attempts,
            } => Some(serde_json::json!({
                "exitCode": exit_code,
                "attempts": attempts,
            })),
            _ => None,
        }
    }
}
