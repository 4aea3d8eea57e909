use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use url::Url;

pub mod presets;
pub mod youtube;

pub use presets::{ClientPreset, PresetError};
pub use youtube::YtDlpExtractor;

use crate::TranscriptError;

/// Captured result of one caption tool invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Process exit code, `None` when killed by a signal
    pub exit_code: Option<i32>,

    /// Whether the process exited successfully
    pub success: bool,

    pub stdout: String,

    pub stderr: String,
}

impl ToolOutput {
    /// Text used for failure classification: stderr, or stdout when stderr is empty
    pub fn diagnostic_text(&self) -> &str {
        if self.stderr.trim().is_empty() {
            &self.stdout
        } else {
            &self.stderr
        }
    }
}

/// Errors raised before the tool produced any output
#[derive(thiserror::Error, Debug)]
pub enum ExtractorError {
    #[error("Failed to launch {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} did not finish within {timeout:?}")]
    TimedOut { tool: String, timeout: Duration },
}

/// Trait for fetching caption files with an external tool
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CaptionExtractor: Send + Sync {
    /// Run the tool once with the given preset, writing caption files into `output_dir`
    async fn fetch_captions(
        &self,
        url: &str,
        preset: &ClientPreset,
        output_dir: &Path,
    ) -> Result<ToolOutput, ExtractorError>;

    /// Name of the underlying tool, for logs and error messages
    fn tool_name(&self) -> &'static str;
}

/// Validate the `url` query parameter and return it trimmed
pub fn validate_request_url(raw: Option<&str>) -> Result<String, TranscriptError> {
    let url = match raw.map(str::trim) {
        Some(url) if !url.is_empty() => url,
        _ => return Err(TranscriptError::MissingUrl),
    };

    if !is_likely_youtube_url(url) {
        return Err(TranscriptError::InvalidUrl(url.to_string()));
    }

    Ok(url.to_string())
}

/// Check whether a string parses as an http(s) URL on a YouTube host
pub fn is_likely_youtube_url(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };

    if !matches!(parsed.scheme(), "http" | "https") {
        return false;
    }

    let Some(host) = parsed.host_str() else {
        return false;
    };
    let host = host.to_lowercase();

    host.contains("youtube.com") || host == "youtu.be" || host.ends_with(".youtube.com")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_or_blank_url() {
        assert!(matches!(
            validate_request_url(None),
            Err(TranscriptError::MissingUrl)
        ));
        assert!(matches!(
            validate_request_url(Some("   ")),
            Err(TranscriptError::MissingUrl)
        ));
    }

    #[test]
    fn test_valid_url_is_trimmed() {
        let url = validate_request_url(Some("  https://youtu.be/dQw4w9WgXcQ \n")).unwrap();
        assert_eq!(url, "https://youtu.be/dQw4w9WgXcQ");
    }

    #[test]
    fn test_youtube_hosts() {
        assert!(is_likely_youtube_url("https://www.youtube.com/watch?v=abc"));
        assert!(is_likely_youtube_url("https://m.youtube.com/watch?v=abc"));
        assert!(is_likely_youtube_url("https://music.YouTube.com/watch?v=abc"));
        assert!(is_likely_youtube_url("http://youtu.be/abc"));
        assert!(is_likely_youtube_url("https://youtube.com/shorts/abc"));
    }

    #[test]
    fn test_rejects_other_urls() {
        assert!(!is_likely_youtube_url("https://vimeo.com/123"));
        assert!(!is_likely_youtube_url("https://notyoutu.be/abc"));
        assert!(!is_likely_youtube_url("youtube.com/watch?v=abc"));
        assert!(!is_likely_youtube_url("ftp://youtube.com/watch?v=abc"));
        assert!(!is_likely_youtube_url("not a url"));

        match validate_request_url(Some("https://example.com/video")) {
            Err(TranscriptError::InvalidUrl(url)) => assert_eq!(url, "https://example.com/video"),
            other => panic!("expected InvalidUrl, got {:?}", other),
        }
    }

    #[test]
    fn test_diagnostic_text_prefers_stderr() {
        let output = ToolOutput {
            exit_code: Some(1),
            success: false,
            stdout: "stdout text".to_string(),
            stderr: "stderr text".to_string(),
        };
        assert_eq!(output.diagnostic_text(), "stderr text");

        let quiet = ToolOutput {
            stderr: "  \n".to_string(),
            ..output
        };
        assert_eq!(quiet.diagnostic_text(), "stdout text");
    }
}
