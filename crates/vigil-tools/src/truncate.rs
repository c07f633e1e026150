//! Output truncation helpers.

use serde::Serialize;

/// Maximum tool output size in characters before truncation.
pub const MAX_OUTPUT_CHARS: usize = 30_000;

/// Characters of file content shown to the model per read.
pub const READ_CHAR_LIMIT: usize = 20_000;

/// Truncate a string to at most `max_bytes` without splitting a character.
#[must_use]
pub fn truncate_at_char_boundary(s: &str, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        return s.to_string();
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end = end.saturating_sub(1);
    }
    s[..end].to_string()
}

/// Truncate command output to stay within model context limits.
///
/// If `output` exceeds [`MAX_OUTPUT_CHARS`] characters, it is cut and a notice is appended.
#[must_use]
pub fn truncate_output(output: String) -> String {
    if output.chars().count() <= MAX_OUTPUT_CHARS {
        return output;
    }
    let mut truncated: String = output.chars().take(MAX_OUTPUT_CHARS).collect();
    truncated.push_str("\n\n... (output truncated, exceeded 30000 character limit)");
    truncated
}

/// File content prepared for display, with truncation accounting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TruncatedText {
    /// Content, at most `limit` characters.
    pub content: String,
    /// Whether anything was cut.
    pub truncated: bool,
    /// Character count of the full text.
    pub total_chars: usize,
    /// Characters cut.
    pub omitted_chars: usize,
}

/// Keep the first `limit` characters of `text`.
#[must_use]
pub fn truncate_chars(text: &str, limit: usize) -> TruncatedText {
    let total_chars = text.chars().count();
    if total_chars <= limit {
        return TruncatedText {
            content: text.to_string(),
            truncated: false,
            total_chars,
            omitted_chars: 0,
        };
    }
    TruncatedText {
        content: text.chars().take(limit).collect(),
        truncated: true,
        total_chars,
        omitted_chars: total_chars.saturating_sub(limit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_boundary() {
        assert_eq!(truncate_at_char_boundary("héllo", 2), "h");
        assert_eq!(truncate_at_char_boundary("abc", 10), "abc");
    }

    #[test]
    fn test_truncate_output_small() {
        let small = "hello".to_string();
        assert_eq!(truncate_output(small.clone()), small);
    }

    #[test]
    fn test_truncate_output_large() {
        let large = "x".repeat(40_000);
        let result = truncate_output(large);
        assert!(result.len() < 40_000);
        assert!(result.contains("output truncated"));
    }

    #[test]
    fn test_truncate_chars_counts_characters() {
        let text = "é".repeat(25_000);
        let out = truncate_chars(&text, READ_CHAR_LIMIT);
        assert!(out.truncated);
        assert_eq!(out.content.chars().count(), 20_000);
        assert_eq!(out.total_chars, 25_000);
        assert_eq!(out.omitted_chars, 5_000);
    }

    #[test]
    fn test_truncate_chars_short() {
        let out = truncate_chars("short", READ_CHAR_LIMIT);
        assert!(!out.truncated);
        assert_eq!(out.omitted_chars, 0);
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["totalChars"], 5);
        assert_eq!(json["omittedChars"], 0);
    }
}
