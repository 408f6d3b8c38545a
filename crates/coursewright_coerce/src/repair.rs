//! Heuristic repair of loosely formatted JSON.
//!
//! Language models often answer with near-JSON: single-quoted strings,
//! unquoted keys, unquoted text values, or a Markdown code fence around the
//! payload. [`repair_json`] runs a fixed pipeline of small rules over the raw
//! completion before it is parsed. Each rule is exposed on its own so its
//! trigger condition can be tested in isolation.
//!
//! The key and value rules only look at text outside double-quoted string
//! literals, so well-formed JSON passes through them unchanged.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static APOSTROPHE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([A-Za-z0-9_])"([A-Za-z0-9_])"#).expect("apostrophe pattern is valid"));

static BARE_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Za-z_][A-Za-z0-9_]*)(\s*):").expect("bare key pattern is valid")
});

/// A named repair step.
pub type RepairRule = (&'static str, fn(&str) -> String);

/// The repair pipeline, in application order.
pub const RULES: &[RepairRule] = &[
    ("strip_code_fence", strip_code_fence),
    ("normalize_quotes", normalize_quotes),
    ("restore_apostrophes", restore_apostrophes),
    ("quote_bare_keys", quote_bare_keys),
    ("quote_bare_values", quote_bare_values),
];

/// Runs every rule in [`RULES`] over `raw`.
///
/// # Examples
///
/// ```
/// use coursewright_coerce::repair::repair_json;
///
/// let fixed = repair_json("{'question': 'what's this'}");
/// assert_eq!(fixed, r#"{"question": "what's this"}"#);
/// ```
pub fn repair_json(raw: &str) -> String {
    RULES.iter().fold(raw.to_string(), |text, (name, rule)| {
        let next = rule(&text);
        if next != text {
            tracing::trace!(rule = name, "Repair rule rewrote response");
        }
        next
    })
}

/// Removes a Markdown code fence wrapping the whole response.
///
/// Triggers only when the trimmed text starts with three backticks. The
/// opening line (including any language tag) and a closing fence are dropped.
pub fn strip_code_fence(text: &str) -> String {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return text.to_string();
    };

    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    let body = body.trim_end();
    let body = body.strip_suffix("```").unwrap_or(body);
    body.trim().to_string()
}

/// Replaces every single quote with a double quote.
pub fn normalize_quotes(text: &str) -> String {
    text.replace('\'', "\"")
}

/// Turns a double quote between two ASCII word characters back into an apostrophe.
///
/// Matches are found left to right and do not overlap, so `a"b"c` becomes
/// `a'b"c`.
pub fn restore_apostrophes(text: &str) -> String {
    APOSTROPHE.replace_all(text, "${1}'${2}").into_owned()
}

/// Wraps unquoted object keys in double quotes.
///
/// Outside string literals, an identifier (`[A-Za-z_][A-Za-z0-9_]*`, starting
/// at a word boundary) immediately followed by optional whitespace and a colon
/// is quoted.
pub fn quote_bare_keys(text: &str) -> String {
    map_structural(text, |segment| {
        BARE_KEY.replace_all(segment, "\"${1}\"${2}:").into_owned()
    })
}

/// Wraps unquoted text values in double quotes.
///
/// Outside string literals, after a colon and optional whitespace, the value
/// runs to the next `,`, `}` or `]`. It is quoted unless it starts with `"`,
/// `{` or `[`, or is a JSON number, `true`, `false` or `null`. Trailing
/// whitespace stays outside the quotes. A value that runs into a string
/// literal or the end of the input is left untouched.
pub fn quote_bare_values(text: &str) -> String {
    map_structural(text, quote_values_in_segment)
}

fn quote_values_in_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len() + 8);
    let mut rest = segment;

    while let Some(colon) = rest.find(':') {
        out.push_str(&rest[..=colon]);
        rest = &rest[colon + 1..];

        let value_start = rest.len() - rest.trim_start().len();
        out.push_str(&rest[..value_start]);
        rest = &rest[value_start..];

        if rest.is_empty() || rest.starts_with(['"', '{', '[']) {
            continue;
        }

        let Some(end) = rest.find([',', '}', ']']) else {
            continue;
        };

        let run = &rest[..end];
        let value = run.trim_end();
        let trailing = &run[value.len()..];

        if value.is_empty() || is_json_scalar(value) {
            out.push_str(run);
        } else {
            out.push_str(&Value::String(value.to_string()).to_string());
            out.push_str(trailing);
        }
        rest = &rest[end..];
    }

    out.push_str(rest);
    out
}

fn is_json_scalar(text: &str) -> bool {
    matches!(
        serde_json::from_str::<Value>(text),
        Ok(Value::Number(_) | Value::Bool(_) | Value::Null)
    )
}

/// A slice of the input, either inside or outside a double-quoted string.
#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
    Structural(&'a str),
    Literal(&'a str),
}

/// Splits text into structural runs and string literals (quotes included).
///
/// Backslash escapes are honored inside literals. An unterminated literal
/// extends to the end of the input.
fn segments(text: &str) -> Vec<Segment<'_>> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                parts.push(Segment::Literal(&text[start..=idx]));
                start = idx + 1;
                in_string = false;
            }
        } else if ch == '"' {
            if start < idx {
                parts.push(Segment::Structural(&text[start..idx]));
            }
            start = idx;
            in_string = true;
        }
    }

    if start < text.len() {
        let tail = &text[start..];
        parts.push(if in_string {
            Segment::Literal(tail)
        } else {
            Segment::Structural(tail)
        });
    }
    parts
}

fn map_structural(text: &str, f: impl Fn(&str) -> String) -> String {
    segments(text)
        .into_iter()
        .map(|segment| match segment {
            Segment::Structural(s) => f(s),
            Segment::Literal(s) => s.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_split_on_literals() {
        assert_eq!(
            segments(r#"{"a": b, "c\"d": e}"#),
            vec![
                Segment::Structural("{"),
                Segment::Literal(r#""a""#),
                Segment::Structural(": b, "),
                Segment::Literal(r#""c\"d""#),
                Segment::Structural(": e}"),
            ]
        );
    }

    #[test]
    fn unterminated_literal_runs_to_end() {
        assert_eq!(
            segments(r#"{"a": "oops"#),
            vec![
                Segment::Structural("{"),
                Segment::Literal(r#""a""#),
                Segment::Structural(": "),
                Segment::Literal(r#""oops"#),
            ]
        );
    }

    #[test]
    fn code_fence_with_language_tag_is_removed() {
        let raw = "```json\n{\"a\": \"b\"}\n```";
        assert_eq!(strip_code_fence(raw), "{\"a\": \"b\"}");
    }

    #[test]
    fn bare_code_fence_is_removed() {
        assert_eq!(strip_code_fence("  ```\n[1, 2]\n```  "), "[1, 2]");
    }

    #[test]
    fn unfenced_text_is_untouched() {
        let raw = " {\"a\": \"```\"} ";
        assert_eq!(strip_code_fence(raw), raw);
    }

    #[test]
    fn single_quotes_become_double() {
        assert_eq!(normalize_quotes("{'a': 'b'}"), r#"{"a": "b"}"#);
    }

    #[test]
    fn apostrophe_between_word_characters_is_restored() {
        assert_eq!(restore_apostrophes(r#""what"s this""#), r#""what's this""#);
        assert_eq!(restore_apostrophes(r#""rock"n"roll""#), r#""rock'n"roll""#);
    }

    #[test]
    fn quote_at_word_edge_is_kept() {
        assert_eq!(restore_apostrophes(r#"{"a":"b"}"#), r#"{"a":"b"}"#);
        assert_eq!(restore_apostrophes(r#"["x", "y"]"#), r#"["x", "y"]"#);
    }

    #[test]
    fn bare_keys_are_quoted() {
        assert_eq!(
            quote_bare_keys("{name: \"Ada\", born_in : \"London\"}"),
            "{\"name\": \"Ada\", \"born_in\" : \"London\"}"
        );
    }

    #[test]
    fn colons_inside_strings_do_not_trigger_key_quoting() {
        let text = r#"{"category": "cat: description"}"#;
        assert_eq!(quote_bare_keys(text), text);
    }

    #[test]
    fn identifiers_inside_words_are_not_keys() {
        assert_eq!(quote_bare_keys("{1abc: \"x\"}"), "{1abc: \"x\"}");
    }

    #[test]
    fn bare_text_values_are_quoted() {
        assert_eq!(
            quote_bare_values(r#"{"name": John Smith, "city": Paris }"#),
            r#"{"name": "John Smith", "city": "Paris" }"#
        );
    }

    #[test]
    fn scalars_and_containers_are_not_quoted() {
        let text = r#"{"n": 12, "f": -1.5e3, "ok": true, "none": null, "list": [a, b], "obj": {"k": "v"}}"#;
        assert_eq!(quote_bare_values(text), text);
    }

    #[test]
    fn value_with_colon_is_quoted_whole() {
        assert_eq!(
            quote_bare_values(r#"{"time": 10:30}"#),
            r#"{"time": "10:30"}"#
        );
    }

    #[test]
    fn value_running_into_literal_is_left_alone() {
        let text = r#"{"name": John "Johnny" Smith}"#;
        assert_eq!(quote_bare_values(text), text);
    }

    #[test]
    fn backslash_in_bare_value_is_escaped() {
        assert_eq!(
            quote_bare_values(r#"{"path": C:\temp}"#),
            r#"{"path": "C:\\temp"}"#
        );
    }

    #[test]
    fn multiline_loose_object_repairs_to_valid_json() {
        let raw = "{\n  name: John Smith,\n  age: 42,\n  motto: 'don't panic'\n}";
        let fixed = repair_json(raw);
        let value: Value = serde_json::from_str(&fixed).unwrap();
        assert_eq!(value["name"], "John Smith");
        assert_eq!(value["age"], 42);
        assert_eq!(value["motto"], "don't panic");
    }

    #[test]
    fn valid_json_passes_through() {
        let raw = r#"[{"title": "Intro", "chapters": [{"chapter_title": "Basics"}]}]"#;
        assert_eq!(repair_json(raw), raw);
    }
}
