//! Response Normalizer — isolates the JSON payload inside an LLM completion.
//!
//! Two strategies share one contract (`raw text -> isolated payload`):
//!
//! - `Heuristic` (default): trim, drop everything before the first `{`/`[`, strip a
//!   code fence, cut everything after the last `}`/`]`. A stray closing brace in
//!   trailing commentary defeats the last step; that is a known limitation and
//!   the tests pin it.
//! - `BalancedScan`: walks each `{`/`[` candidate, tracking string literals, and
//!   returns the first span whose delimiters balance and which parses as JSON.

use std::str::FromStr;

use serde::de::IgnoredAny;

use crate::cv::error::CvError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NormalizeStrategy {
    #[default]
    Heuristic,
    BalancedScan,
}

impl FromStr for NormalizeStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "heuristic" => Ok(NormalizeStrategy::Heuristic),
            "balanced" | "balanced_scan" => Ok(NormalizeStrategy::BalancedScan),
            other => Err(format!(
                "unknown normalizer '{other}' (expected 'heuristic' or 'balanced')"
            )),
        }
    }
}

impl NormalizeStrategy {
    pub fn isolate(self, raw: &str) -> Result<String, CvError> {
        match self {
            NormalizeStrategy::Heuristic => isolate_payload(raw),
            NormalizeStrategy::BalancedScan => isolate_balanced(raw),
        }
    }
}

fn is_opener(c: char) -> bool {
    c == '{' || c == '['
}

fn no_json(raw: &str) -> CvError {
    CvError::NoJsonFound {
        raw: raw.to_string(),
    }
}

/// Heuristic isolation: prefix strip, fence strip, suffix strip.
pub fn isolate_payload(raw: &str) -> Result<String, CvError> {
    let text = raw.trim();
    let start = text.find(is_opener).ok_or_else(|| no_json(raw))?;
    // Never matches after the prefix strip; kept so both steps mirror the documented order.
    let text = strip_fence(&text[start..]);
    let text = truncate_after_last_closer(text);
    Ok(text.trim().to_string())
}

/// Strips a leading ```` ``` ```` / ```` ```json ```` opener and a trailing ```` ``` ````.
fn strip_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest).trim_start();
    rest.strip_suffix("```").map(str::trim_end).unwrap_or(rest)
}

fn truncate_after_last_closer(text: &str) -> &str {
    match text.rfind('}').max(text.rfind(']')) {
        Some(end) if end > 0 && end + 1 < text.len() => &text[..=end],
        _ => text,
    }
}

enum Scan {
    /// Byte length of the balanced value.
    Balanced(usize),
    /// A closer that does not match the innermost opener.
    Mismatched,
    /// Input ended with delimiters still open.
    Unterminated,
}

/// Scans the value that starts at `text[0]` (an opener).
fn scan_value(text: &str) -> Scan {
    let mut expected: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => expected.push('}'),
            '[' => expected.push(']'),
            '}' | ']' => {
                if expected.pop() != Some(c) {
                    return Scan::Mismatched;
                }
                if expected.is_empty() {
                    return Scan::Balanced(i + 1);
                }
            }
            _ => {}
        }
    }
    Scan::Unterminated
}

/// Balanced-scan isolation.
///
/// If no candidate both balances and parses, the first balanced candidate is
/// returned (or, failing that, everything from the first opener) so that the
/// validator reports the syntax error instead of the payload vanishing.
pub fn isolate_balanced(raw: &str) -> Result<String, CvError> {
    let text = raw.trim();
    let first_opener = text.find(is_opener).ok_or_else(|| no_json(raw))?;

    let mut cursor = first_opener;
    let mut first_balanced: Option<&str> = None;

    while let Some(offset) = text[cursor..].find(is_opener) {
        let start = cursor + offset;
        match scan_value(&text[start..]) {
            Scan::Balanced(len) => {
                let candidate = &text[start..start + len];
                if serde_json::from_str::<IgnoredAny>(candidate).is_ok() {
                    return Ok(candidate.to_string());
                }
                first_balanced.get_or_insert(candidate);
                // Skip nested openers: a fragment of a broken value is not the payload.
                cursor = start + len;
            }
            Scan::Mismatched => cursor = start + 1,
            Scan::Unterminated => break,
        }
    }

    Ok(first_balanced
        .unwrap_or(&text[first_opener..])
        .trim()
        .to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHATTY: &str =
        "Sure! Here is the JSON:\n```json\n{\"fullName\":\"A\"}\n```\nLet me know!";

    fn both(raw: &str) -> (String, String) {
        (
            isolate_payload(raw).unwrap(),
            isolate_balanced(raw).unwrap(),
        )
    }

    #[test]
    fn test_chatty_fenced_completion() {
        let (heuristic, balanced) = both(CHATTY);
        assert_eq!(heuristic, r#"{"fullName":"A"}"#);
        assert_eq!(balanced, r#"{"fullName":"A"}"#);
    }

    #[test]
    fn test_not_json_at_all() {
        for strategy in [NormalizeStrategy::Heuristic, NormalizeStrategy::BalancedScan] {
            match strategy.isolate("not json at all") {
                Err(CvError::NoJsonFound { raw }) => assert_eq!(raw, "not json at all"),
                other => panic!("expected NoJsonFound, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_empty_completion_has_no_json() {
        assert!(matches!(
            isolate_payload("   "),
            Err(CvError::NoJsonFound { .. })
        ));
    }

    #[test]
    fn test_clean_json_passes_through() {
        let clean = r#"{"skills":["Rust","Go"],"links":[]}"#;
        let (heuristic, balanced) = both(clean);
        assert_eq!(heuristic, clean);
        assert_eq!(balanced, clean);
    }

    #[test]
    fn test_surrounding_prose_and_whitespace_removed() {
        let raw = "\n\n  Here you go:\n{\n  \"title\": \"Engineer\"\n}\nHope this helps.  ";
        let (heuristic, balanced) = both(raw);
        assert_eq!(heuristic, "{\n  \"title\": \"Engineer\"\n}");
        assert_eq!(balanced, heuristic);
    }

    #[test]
    fn test_unlabelled_fence() {
        let raw = "```\n{\"a\": [1, 2]}\n```";
        let (heuristic, balanced) = both(raw);
        assert_eq!(heuristic, r#"{"a": [1, 2]}"#);
        assert_eq!(balanced, r#"{"a": [1, 2]}"#);
    }

    #[test]
    fn test_top_level_array_is_isolated() {
        let raw = "Result: [{\"a\":1},{\"b\":2}] done";
        let (heuristic, balanced) = both(raw);
        assert_eq!(heuristic, r#"[{"a":1},{"b":2}]"#);
        assert_eq!(balanced, r#"[{"a":1},{"b":2}]"#);
    }

    #[test]
    fn test_normalizer_is_idempotent() {
        let inputs = [
            CHATTY,
            "prefix {\"a\": {\"b\": [1]}} suffix",
            "[1, 2, 3]",
            "{\"a\": 1,}",
        ];
        for raw in inputs {
            let once = isolate_payload(raw).unwrap();
            assert_eq!(isolate_payload(&once).unwrap(), once);

            let once = isolate_balanced(raw).unwrap();
            assert_eq!(isolate_balanced(&once).unwrap(), once);
        }
    }

    #[test]
    fn test_strip_fence_helper() {
        assert_eq!(strip_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_fence("```\n[1]\n```"), "[1]");
        assert_eq!(strip_fence("```json\n{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_fence("{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn test_fenced_reply_is_unwrapped_by_prefix_and_suffix_strip() {
        assert_eq!(
            isolate_payload("```json\n{\"a\":1}\n```").unwrap(),
            "{\"a\":1}"
        );
        assert_eq!(isolate_payload("```\n[1, 2]\n```").unwrap(), "[1, 2]");
    }

    #[test]
    fn test_single_character_payload_is_not_truncated() {
        assert_eq!(isolate_payload("{").unwrap(), "{");
    }

    // ── Where the two strategies differ ──────────────────────────────────────

    #[test]
    fn test_stray_brace_in_trailing_commentary() {
        let raw = "{\"fullName\":\"A\"}\nNote: I removed the } from your summary.";
        let (heuristic, balanced) = both(raw);
        // Heuristic: the last `}` wins, so the commentary survives and parsing fails later.
        assert_eq!(
            heuristic,
            "{\"fullName\":\"A\"}\nNote: I removed the }"
        );
        assert_eq!(balanced, r#"{"fullName":"A"}"#);
    }

    #[test]
    fn test_braces_in_leading_prose() {
        let raw = "Replace {placeholders} as needed: {\"title\":\"Dev\"}";
        let (heuristic, balanced) = both(raw);
        assert_eq!(heuristic, "{placeholders} as needed: {\"title\":\"Dev\"}");
        assert_eq!(balanced, r#"{"title":"Dev"}"#);
    }

    #[test]
    fn test_closing_brace_inside_string_value() {
        let raw = "{\"summary\":\"uses } and ] freely\"} trailing";
        let (heuristic, balanced) = both(raw);
        assert_eq!(heuristic, r#"{"summary":"uses } and ] freely"}"#);
        assert_eq!(balanced, r#"{"summary":"uses } and ] freely"}"#);
    }

    #[test]
    fn test_escaped_quote_inside_string() {
        let raw = r#"x {"q":"say \"}\" ok"} y"#;
        assert_eq!(isolate_balanced(raw).unwrap(), r#"{"q":"say \"}\" ok"}"#);
    }

    #[test]
    fn test_truncated_output_falls_through_to_validator() {
        let raw = "Here: {\"fullName\":\"A\",\"skills\":[\"Rust\"";
        let balanced = isolate_balanced(raw).unwrap();
        // Nothing balances, so the inner `["Rust"` is never mistaken for the payload.
        assert_eq!(balanced, "{\"fullName\":\"A\",\"skills\":[\"Rust\"");
    }

    #[test]
    fn test_truncated_outer_value_does_not_yield_inner_object() {
        let raw = "{\"experiences\": [{\"jobTitle\": \"Dev\"}]";
        assert_eq!(isolate_balanced(raw).unwrap(), raw);
    }

    #[test]
    fn test_balanced_but_invalid_payload_is_kept_whole() {
        let raw = "Output: {\"a\": {\"b\": 1},} end";
        assert_eq!(isolate_balanced(raw).unwrap(), "{\"a\": {\"b\": 1},}");
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!(
            "heuristic".parse::<NormalizeStrategy>().unwrap(),
            NormalizeStrategy::Heuristic
        );
        assert_eq!(
            " Balanced ".parse::<NormalizeStrategy>().unwrap(),
            NormalizeStrategy::BalancedScan
        );
        assert!("regex".parse::<NormalizeStrategy>().is_err());
    }
}
