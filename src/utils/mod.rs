use crate::extractors::YtDlpExtractor;

/// First `max_chars` characters of `text`, never splitting a character
pub fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Check if the current environment has required tools
pub async fn check_dependencies(extractor: &YtDlpExtractor) -> Vec<String> {
    let mut missing = Vec::new();

    match extractor.version().await {
        Some(version) => tracing::debug!("Found {} {}", extractor.binary(), version),
        None => missing.push(format!(
            "{} - required to fetch captions (https://github.com/yt-dlp/yt-dlp)",
            extractor.binary()
        )),
    }

    missing
}
