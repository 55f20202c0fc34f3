//! Embedded-JSON extraction from script text.
//!
//! Shopping pages bootstrap their result data as a JSON object literal inside
//! a script block, e.g. `window.__PRELOADED_STATE__={"shoppingResult":...};`.
//! This module isolates that object without a full script parser: find the
//! marker, find the first `{` after it, scan forward to the matching `}` and
//! decode the span with serde_json.

use serde_json::Value;

/// Result of one extraction attempt.
///
/// `NotFound` means the document carries no candidate payload; `MalformedJson`
/// means a candidate was present but truncated or not valid JSON. Callers can
/// treat the former as "no data this page" and the latter as a page to skip.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    /// A balanced span followed the marker and decoded as a JSON object.
    Found(Value),
    /// The marker is absent, or no `{` follows it.
    NotFound,
    /// Braces never balanced before end of text, or the span failed to decode.
    MalformedJson,
}

/// Extract the first JSON object that follows `marker` in `text`.
///
/// Only the first marker occurrence is considered; see [`extract_all`] for
/// sweeping a document. Pure and single-pass: every input maps to exactly one
/// outcome, nothing is retried or logged here.
pub fn extract(text: &str, marker: &str) -> ExtractionOutcome {
    extract_from(text, marker, 0).0
}

/// Extract starting at byte `offset`.
///
/// Returns the outcome together with the position just past the examined
/// region: past the decoded span on success, or the end of the text when no
/// further candidate exists. Re-invoking with the returned position walks
/// every marker occurrence in the document.
pub fn extract_from(text: &str, marker: &str, offset: usize) -> (ExtractionOutcome, usize) {
    let Some(tail) = text.get(offset..) else {
        // offset past the end or not on a char boundary
        return (ExtractionOutcome::NotFound, text.len());
    };
    let Some(rel) = tail.find(marker) else {
        return (ExtractionOutcome::NotFound, text.len());
    };
    let marker_end = offset + rel + marker.len();

    let Some(brace_rel) = text[marker_end..].find('{') else {
        return (ExtractionOutcome::NotFound, text.len());
    };
    let start = marker_end + brace_rel;

    match balanced_span(&text[start..]) {
        Some(len) => {
            let end = start + len;
            match serde_json::from_str::<Value>(&text[start..end]) {
                Ok(payload) => (ExtractionOutcome::Found(payload), end),
                Err(_) => (ExtractionOutcome::MalformedJson, end),
            }
        }
        None => (ExtractionOutcome::MalformedJson, text.len()),
    }
}

/// Extract every payload in the document, one marker occurrence at a time.
///
/// Stops at the first occurrence that does not yield a payload.
#[allow(dead_code)]
pub fn extract_all(text: &str, marker: &str) -> Vec<Value> {
    let mut payloads = Vec::new();
    let mut pos = 0;

    while pos < text.len() {
        let (outcome, next) = extract_from(text, marker, pos);
        match outcome {
            ExtractionOutcome::Found(payload) => payloads.push(payload),
            _ => break,
        }
        pos = next;
    }

    payloads
}

enum ScanState {
    Normal,
    InString,
    Escaped,
}

/// Byte length of the balanced `{...}` span at the start of `s`, or `None`
/// if the braces never balance.
///
/// Brace characters inside string literals do not count toward the depth, so
/// a payload whose title contains `{` still terminates at the right `}`.
/// Scanning bytes is safe here: `{`, `}`, `"` and `\` are ASCII and never
/// occur inside a multi-byte UTF-8 sequence.
fn balanced_span(s: &str) -> Option<usize> {
    let mut depth: u32 = 0;
    let mut state = ScanState::Normal;

    for (i, b) in s.bytes().enumerate() {
        match state {
            ScanState::Normal => match b {
                b'{' => depth += 1,
                b'}' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Some(i + 1);
                    }
                }
                b'"' => state = ScanState::InString,
                _ => {}
            },
            ScanState::InString => match b {
                b'"' => state = ScanState::Normal,
                b'\\' => state = ScanState::Escaped,
                _ => {}
            },
            ScanState::Escaped => state = ScanState::InString,
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const MARKER: &str = "entry.bootstrap(";

    #[test]
    fn test_no_marker() {
        assert_eq!(extract("no marker here", MARKER), ExtractionOutcome::NotFound);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(extract("", MARKER), ExtractionOutcome::NotFound);
        assert_eq!(extract("   \n\t  ", MARKER), ExtractionOutcome::NotFound);
    }

    #[test]
    fn test_nested_object() {
        let text = r#"foo bar entry.bootstrap(x, {"a": {"b": 1}, "c": [1,2]});"#;
        let outcome = extract(text, MARKER);
        assert_eq!(
            outcome,
            ExtractionOutcome::Found(json!({"a": {"b": 1}, "c": [1, 2]}))
        );
    }

    #[test]
    fn test_payload_matches_direct_decode() {
        let obj = json!({"title": "스마트폰 케이스", "price": 12900, "tags": ["new", "sale"]});
        let text = format!("header text entry.bootstrap({});", obj);
        assert_eq!(extract(&text, MARKER), ExtractionOutcome::Found(obj));
    }

    #[test]
    fn test_missing_closing_brace() {
        let text = r#"entry.bootstrap({"a": 1)"#;
        assert_eq!(extract(text, MARKER), ExtractionOutcome::MalformedJson);
    }

    #[test]
    fn test_one_fewer_closing_brace() {
        let text = r#"entry.bootstrap({"a": {"b": 1});"#;
        assert_eq!(extract(text, MARKER), ExtractionOutcome::MalformedJson);
    }

    #[test]
    fn test_balanced_but_invalid_json() {
        let text = "entry.bootstrap({not json at all})";
        assert_eq!(extract(text, MARKER), ExtractionOutcome::MalformedJson);
    }

    #[test]
    fn test_marker_at_end_of_text() {
        assert_eq!(
            extract("trailing entry.bootstrap(", MARKER),
            ExtractionOutcome::NotFound
        );
    }

    #[test]
    fn test_marker_with_no_brace_after() {
        assert_eq!(
            extract("entry.bootstrap(null);", MARKER),
            ExtractionOutcome::NotFound
        );
    }

    #[test]
    fn test_empty_object() {
        assert_eq!(
            extract("entry.bootstrap({})", MARKER),
            ExtractionOutcome::Found(json!({}))
        );
    }

    #[test]
    fn test_brace_inside_string_value() {
        let text = r#"entry.bootstrap({"title": "curly { brace } in title", "n": 1});"#;
        assert_eq!(
            extract(text, MARKER),
            ExtractionOutcome::Found(json!({"title": "curly { brace } in title", "n": 1}))
        );
    }

    #[test]
    fn test_escaped_quote_inside_string() {
        let text = r#"entry.bootstrap({"q": "she said \"hi {\" ok"});"#;
        assert_eq!(
            extract(text, MARKER),
            ExtractionOutcome::Found(json!({"q": "she said \"hi {\" ok"}))
        );
    }

    #[test]
    fn test_first_of_two_markers_wins() {
        let text = r#"entry.bootstrap({"x":1}); entry.bootstrap({"y":2});"#;
        assert_eq!(extract(text, MARKER), ExtractionOutcome::Found(json!({"x": 1})));
    }

    #[test]
    fn test_second_invocation_on_remainder() {
        let text = r#"entry.bootstrap({"x":1}); entry.bootstrap({"y":2});"#;
        let (first, end) = extract_from(text, MARKER, 0);
        assert_eq!(first, ExtractionOutcome::Found(json!({"x": 1})));

        let (second, _) = extract_from(text, MARKER, end);
        assert_eq!(second, ExtractionOutcome::Found(json!({"y": 2})));
    }

    #[test]
    fn test_extract_all() {
        let text = r#"a entry.bootstrap({"x":1}) b entry.bootstrap({"y":2}) c"#;
        let payloads = extract_all(text, MARKER);
        assert_eq!(payloads, vec![json!({"x": 1}), json!({"y": 2})]);
    }

    #[test]
    fn test_extract_all_stops_on_malformed() {
        let text = r#"entry.bootstrap({"x":1}) entry.bootstrap({"y": )"#;
        let payloads = extract_all(text, MARKER);
        assert_eq!(payloads, vec![json!({"x": 1})]);
    }

    #[test]
    fn test_idempotent() {
        let text = r#"entry.bootstrap({"a": [1, {"b": 2}]});"#;
        assert_eq!(extract(text, MARKER), extract(text, MARKER));
    }

    #[test]
    fn test_non_json_between_marker_and_brace() {
        // the first `{` after the marker starts the candidate span even when
        // other arguments precede it
        let text = r#"entry.bootstrap(cfg, 42, {"ok": true});"#;
        assert_eq!(extract(text, MARKER), ExtractionOutcome::Found(json!({"ok": true})));
    }

    #[test]
    fn test_multibyte_text_around_payload() {
        let text = r#"검색결과 entry.bootstrap({"메모": "한글 값"}); 끝"#;
        assert_eq!(
            extract(text, MARKER),
            ExtractionOutcome::Found(json!({"메모": "한글 값"}))
        );
    }

    #[test]
    fn test_preloaded_state_marker() {
        let text = r#"<script>window.__PRELOADED_STATE__={"shoppingResult":{"total":2}};</script>"#;
        let outcome = extract(text, "window.__PRELOADED_STATE__");
        assert_eq!(
            outcome,
            ExtractionOutcome::Found(json!({"shoppingResult": {"total": 2}}))
        );
    }
}
