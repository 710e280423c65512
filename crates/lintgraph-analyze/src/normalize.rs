//! Tolerant pre-processing of oracle text before strict decoding.
//!
//! Two repairs, in order:
//! 1. If the text contains a fenced block (optionally tagged, e.g. ```json),
//!    keep only the fenced interior.
//! 2. Escape raw tab, newline and carriage-return characters that appear
//!    inside string literals.

use std::sync::LazyLock;

use regex::Regex;

static FENCED_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```\w*\s*(.+?)\s*```").expect("valid fence pattern"));

/// Normalize raw oracle text into something a strict JSON decoder accepts.
pub fn normalize(raw: &str) -> String {
    let text = raw.trim();
    let text = FENCED_BLOCK
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .unwrap_or(text);
    escape_string_controls(text)
}

/// Escape control characters inside string literals.
///
/// Single left-to-right scan tracking two bits of state: whether the cursor
/// is inside a string literal, and whether the previous character was an
/// unconsumed backslash. Everything outside string literals, and every
/// already escaped character, is copied through untouched.
pub fn escape_string_controls(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for c in text.chars() {
        if escaped {
            out.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => {
                out.push(c);
                escaped = true;
            }
            '"' => {
                in_string = !in_string;
                out.push(c);
            }
            '\t' if in_string => out.push_str("\\t"),
            '\n' if in_string => out.push_str("\\n"),
            '\r' if in_string => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_json_is_untouched() {
        let s = r#"{"a": "b", "c": [1, 2]}"#;
        assert_eq!(normalize(s), s);
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        assert_eq!(normalize("  \n{}\n "), "{}");
    }

    #[test]
    fn fenced_block_with_tag() {
        let raw = "Here you go:\n```json\n{\"a\": 1}\n```\nThanks";
        assert_eq!(normalize(raw), "{\"a\": 1}");
    }

    #[test]
    fn fenced_block_without_tag() {
        assert_eq!(normalize("```\n[]\n```"), "[]");
    }

    #[test]
    fn newline_inside_string_is_escaped() {
        assert_eq!(
            escape_string_controls("{\"m\": \"a\nb\"}"),
            "{\"m\": \"a\\nb\"}"
        );
    }

    #[test]
    fn tab_and_carriage_return_inside_string_are_escaped() {
        assert_eq!(
            escape_string_controls("\"a\tb\rc\""),
            "\"a\\tb\\rc\""
        );
    }

    #[test]
    fn whitespace_outside_strings_is_kept() {
        let s = "{\n\t\"a\": 1\r\n}";
        assert_eq!(escape_string_controls(s), s);
    }

    #[test]
    fn escaped_quote_does_not_end_string() {
        let s = "\"say \\\"hi\\\"\nnow\"";
        assert_eq!(escape_string_controls(s), "\"say \\\"hi\\\"\\nnow\"");
    }

    #[test]
    fn existing_escapes_are_not_doubled() {
        let s = r#""line1\nline2""#;
        assert_eq!(escape_string_controls(s), s);
    }

    #[test]
    fn non_ascii_text_survives() {
        let s = "\"héllo\nwörld\"";
        assert_eq!(escape_string_controls(s), "\"héllo\\nwörld\"");
    }
}
