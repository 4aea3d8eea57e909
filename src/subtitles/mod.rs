//! WebVTT handling: turning a caption file into a single line of plain text.

use regex::Regex;
use std::sync::LazyLock;

static TIMING_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{2,}:)?\d{2}:\d{2}\.\d{3}\s+-->\s+(\d{2,}:)?\d{2}:\d{2}\.\d{3}")
        .expect("timing pattern is valid")
});

static INLINE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));

/// Strip a WebVTT document down to its spoken text, joined by single spaces.
///
/// Headers, cue numbers, timing lines, comment and style blocks and inline
/// markup are dropped. A line repeating the previous kept line is dropped
/// too, since YouTube auto-captions roll each line through two cues.
pub fn strip_vtt_to_plain_text(vtt: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut seen_cue = false;
    let mut in_block = false;
    let mut after_blank = true;

    let vtt = vtt.trim_start_matches('\u{feff}');

    for line in vtt.lines() {
        let trimmed = line.trim();
        let block_boundary = after_blank;
        after_blank = trimmed.is_empty();

        if trimmed.is_empty() {
            in_block = false;
            continue;
        }
        if in_block {
            continue;
        }
        if trimmed == "WEBVTT" || trimmed.starts_with("WEBVTT ") || trimmed.starts_with("WEBVTT\t") {
            continue;
        }
        if block_boundary && is_block_start(trimmed) {
            in_block = true;
            continue;
        }
        if !seen_cue && is_header_metadata(trimmed) {
            continue;
        }
        if trimmed.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }
        if TIMING_LINE.is_match(trimmed) {
            seen_cue = true;
            continue;
        }

        let text = clean_cue_text(trimmed);
        if text.is_empty() {
            continue;
        }
        if out.last() == Some(&text) {
            continue;
        }
        out.push(text);
    }

    out.join(" ")
}

/// Length of the transcript as a JavaScript client sees it (UTF-16 code units)
pub fn transcript_length(text: &str) -> usize {
    text.encode_utf16().count()
}

fn is_block_start(line: &str) -> bool {
    ["NOTE", "STYLE", "REGION"]
        .iter()
        .any(|keyword| line == *keyword || line.starts_with(&format!("{} ", keyword)))
}

fn is_header_metadata(line: &str) -> bool {
    line.starts_with("Kind:") || line.starts_with("Language:")
}

fn clean_cue_text(line: &str) -> String {
    let without_tags = INLINE_TAG.replace_all(line, "");
    let decoded = without_tags
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&");

    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_header_numbers_and_timings() {
        let vtt = "WEBVTT\n\n1\n00:00:01.000 --> 00:00:03.000\nHello there\n\n2\n00:00:03.500 --> 00:00:05.000\nGeneral Kenobi\n";
        assert_eq!(strip_vtt_to_plain_text(vtt), "Hello there General Kenobi");
    }

    #[test]
    fn test_handles_crlf_and_surrounding_whitespace() {
        let vtt = "WEBVTT\r\n\r\n00:00:01.000 --> 00:00:02.000\r\n   first line  \r\n\r\n00:00:02.000 --> 00:00:03.000\r\nsecond line\r\n";
        assert_eq!(strip_vtt_to_plain_text(vtt), "first line second line");
    }

    #[test]
    fn test_leading_byte_order_mark_is_ignored() {
        let vtt = "\u{feff}WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nHello\n";
        assert_eq!(strip_vtt_to_plain_text(vtt), "Hello");
    }

    #[test]
    fn test_youtube_auto_caption_format() {
        let vtt = "WEBVTT\nKind: captions\nLanguage: en\n\n\
00:00:00.000 --> 00:00:02.310 align:start position:0%\n\
we're<00:00:00.480><c> no</c><00:00:00.640><c> strangers</c>\n\n\
00:00:02.310 --> 00:00:02.320 align:start position:0%\n\
we're no strangers\n\n\
00:00:02.320 --> 00:00:04.000 align:start position:0%\n\
we're no strangers\n\
to<00:00:02.800><c> love</c>\n";
        assert_eq!(
            strip_vtt_to_plain_text(vtt),
            "we're no strangers to love"
        );
    }

    #[test]
    fn test_skips_note_and_style_blocks() {
        let vtt = "WEBVTT - Some title\n\nNOTE this is a comment\nthat spans lines\n\nSTYLE\n::cue { color: red }\n\n00:01.000 --> 00:02.000\nShort timestamps &amp; entities\n";
        assert_eq!(strip_vtt_to_plain_text(vtt), "Short timestamps & entities");
    }

    #[test]
    fn test_metadata_after_first_cue_is_kept() {
        let vtt = "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nLanguage: is a tricky thing\n";
        assert_eq!(strip_vtt_to_plain_text(vtt), "Language: is a tricky thing");
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(strip_vtt_to_plain_text(""), "");
        assert_eq!(strip_vtt_to_plain_text("WEBVTT\n\n1\n00:00:01.000 --> 00:00:02.000\n\n"), "");
    }

    #[test]
    fn test_transcript_length_counts_utf16_units() {
        assert_eq!(transcript_length("hello"), 5);
        assert_eq!(transcript_length("héllo"), 5);
        assert_eq!(transcript_length("🎵 la"), 5);
    }
}
