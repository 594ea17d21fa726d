//! Reply normalization for model backends
//!
//! Backends do not reliably honor the requested output format. Every known
//! wrapping convention is stripped here before parsing.

use serde_json::Value;

/// Code fence markers stripped from replies
const FENCES: &[&str] = &["```", "~~~"];

/// Strip a surrounding markdown code fence, including its language tag
///
/// Text that does not open with a known fence is returned trimmed.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();

    let Some((fence, rest)) = FENCES
        .iter()
        .find_map(|fence| trimmed.strip_prefix(fence).map(|rest| (*fence, rest)))
    else {
        return trimmed;
    };

    let body = skip_language_tag(rest);
    let body = body.trim_end();
    body.strip_suffix(fence).unwrap_or(body).trim()
}

/// Drop the info string after an opening fence (`json`, `JSON`, `jsonc`...)
fn skip_language_tag(rest: &str) -> &str {
    let is_tag_char = |c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_';

    match rest.split_once('\n') {
        Some((first_line, remainder)) if first_line.trim().chars().all(is_tag_char) => remainder,
        // Payload on the tag line: ```json {"a":1}\n``` or ```json{"a":1}```
        _ => rest.trim_start_matches(is_tag_char),
    }
}

/// Parse a reply as JSON after stripping fences
///
/// Returns `None` when the text is not valid JSON.
pub fn parse_lenient_json(raw: &str) -> Option<Value> {
    serde_json::from_str(strip_code_fence(raw)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_fence_with_tag() {
        let raw = "```json\n{\"result\":{\"youtube.com\":true}}\n```";
        assert_eq!(strip_code_fence(raw), "{\"result\":{\"youtube.com\":true}}");
    }

    #[test]
    fn test_fence_without_tag() {
        assert_eq!(strip_code_fence("```\n[1, 2]\n```"), "[1, 2]");
    }

    #[test]
    fn test_tilde_fence_and_surrounding_whitespace() {
        assert_eq!(strip_code_fence("  \n~~~JSON\n{}\n~~~  \n"), "{}");
    }

    #[test]
    fn test_single_line_fence() {
        assert_eq!(strip_code_fence("```json{\"a\":1}```"), "{\"a\":1}");
    }

    #[test]
    fn test_payload_on_tag_line() {
        assert_eq!(
            strip_code_fence("```json {\"result\":{\"a\":true}}\n```"),
            "{\"result\":{\"a\":true}}"
        );
        assert_eq!(
            strip_code_fence("```json{\"result\":{\"a\":true}}\n```"),
            "{\"result\":{\"a\":true}}"
        );
        assert_eq!(
            parse_lenient_json("```json {\"a\": true}\n```"),
            Some(json!({"a": true}))
        );
    }

    #[test]
    fn test_missing_closing_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn test_unfenced_text_is_only_trimmed() {
        assert_eq!(strip_code_fence("  {\"a\":1}\n"), "{\"a\":1}");
        assert_eq!(
            strip_code_fence("Sure, here's my analysis"),
            "Sure, here's my analysis"
        );
    }

    #[test]
    fn test_parse_lenient_json() {
        assert_eq!(
            parse_lenient_json("```json\n{\"a\": true}\n```"),
            Some(json!({"a": true}))
        );
        assert_eq!(parse_lenient_json("{\"a\": false}"), Some(json!({"a": false})));
        assert_eq!(
            parse_lenient_json("Sure, here's my analysis: the user is coding."),
            None
        );
        assert_eq!(parse_lenient_json("```json\n{\"a\": \n```"), None);
    }
}
