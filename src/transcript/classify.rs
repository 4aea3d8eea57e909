use crate::TranscriptError;

/// Reasons an attempt failed that the worker knows how to report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    RateLimited,
    NoCaptions,
    VideoUnavailable,
    BotCheck,
    NoVttFile,
    EmptyTranscript,
}

const RATE_LIMIT_MARKERS: &[&str] = &["http error 429"];

const NO_CAPTION_MARKERS: &[&str] = &[
    "unable to download video subtitles",
    "no subtitles",
    "no caption",
];

const UNAVAILABLE_MARKERS: &[&str] = &[
    "video unavailable",
    "private video",
    "this video has been removed",
];

const BOT_CHECK_MARKERS: &[&str] = &["sign in to confirm", "not a bot"];

/// Classify free-text tool output; the first matching group wins.
pub fn classify_output(text: &str) -> Option<FailureKind> {
    let msg = text.to_lowercase();
    let matches = |markers: &[&str]| markers.iter().any(|marker| msg.contains(marker));

    if matches(RATE_LIMIT_MARKERS) {
        Some(FailureKind::RateLimited)
    } else if matches(NO_CAPTION_MARKERS) {
        Some(FailureKind::NoCaptions)
    } else if matches(UNAVAILABLE_MARKERS) {
        Some(FailureKind::VideoUnavailable)
    } else if matches(BOT_CHECK_MARKERS) {
        Some(FailureKind::BotCheck)
    } else {
        None
    }
}

impl From<FailureKind> for TranscriptError {
    fn from(kind: FailureKind) -> Self {
        match kind {
            FailureKind::RateLimited => TranscriptError::RateLimited,
            FailureKind::NoCaptions => TranscriptError::NoCaptions,
            FailureKind::VideoUnavailable => TranscriptError::VideoUnavailable,
            FailureKind::BotCheck => TranscriptError::BotCheck,
            FailureKind::NoVttFile => TranscriptError::NoVttFile,
            FailureKind::EmptyTranscript => TranscriptError::EmptyTranscript,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit() {
        let stderr = "ERROR: [youtube] abc: Unable to download API page: HTTP Error 429: Too Many Requests";
        assert_eq!(classify_output(stderr), Some(FailureKind::RateLimited));
    }

    #[test]
    fn test_rate_limit_wins_over_subtitle_errors() {
        let stderr = "ERROR: Unable to download video subtitles for 'en': HTTP Error 429: Too Many Requests";
        assert_eq!(classify_output(stderr), Some(FailureKind::RateLimited));
    }

    #[test]
    fn test_no_captions_variants() {
        for stderr in [
            "ERROR: Unable to download video subtitles for 'en': HTTP Error 404",
            "WARNING: There are no subtitles for the requested languages",
            "no captions available",
            "NO CAPTION TRACKS",
        ] {
            assert_eq!(classify_output(stderr), Some(FailureKind::NoCaptions), "{}", stderr);
        }
    }

    #[test]
    fn test_unavailable_and_bot_check() {
        assert_eq!(
            classify_output("ERROR: [youtube] abc: Private video. Sign in if you've been granted access"),
            Some(FailureKind::VideoUnavailable)
        );
        assert_eq!(
            classify_output("ERROR: [youtube] abc: Video unavailable"),
            Some(FailureKind::VideoUnavailable)
        );
        assert_eq!(
            classify_output("ERROR: [youtube] abc: Sign in to confirm you’re not a bot."),
            Some(FailureKind::BotCheck)
        );
    }

    #[test]
    fn test_unknown_output() {
        assert_eq!(classify_output("ERROR: something exploded"), None);
        assert_eq!(classify_output(""), None);
    }

    #[test]
    fn test_kinds_map_to_error_codes() {
        use crate::ErrorCode;

        assert_eq!(
            TranscriptError::from(FailureKind::RateLimited).code(),
            ErrorCode::YoutubeRateLimit
        );
        assert_eq!(
            TranscriptError::from(FailureKind::EmptyTranscript).code(),
            ErrorCode::EmptyTranscript
        );
        assert_eq!(
            TranscriptError::from(FailureKind::NoVttFile).code(),
            ErrorCode::NoVttFile
        );
    }
}
