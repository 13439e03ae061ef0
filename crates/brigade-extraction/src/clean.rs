//! Removal of benign non-JSON wrapping
//!
//! Models routinely wrap JSON in markdown fences, annotate it with comments
//! and leave trailing commas. None of these change the data, so they are
//! removed before parsing. Comment and comma handling is string-aware: text
//! inside JSON string literals is never touched.

use regex::Regex;
use std::sync::LazyLock;

/// The whole text is one fenced block
static WHOLE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*```[A-Za-z0-9_+-]*[ \t]*\r?\n?(.*?)\r?\n?\s*```\s*$").unwrap()
});

/// First fenced block anywhere in the text
static INNER_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```[A-Za-z0-9_+-]*[ \t]*\r?\n(.*?)```").unwrap());

/// Strip fences, comments and trailing commas.
#[must_use]
pub fn clean(raw: &str) -> String {
    let unfenced = strip_fences(raw);
    let uncommented = strip_comments(unfenced);
    strip_trailing_commas(&uncommented).trim().to_string()
}

/// Return the contents of the code fence wrapping `raw`, if any.
#[must_use]
pub fn strip_fences(raw: &str) -> &str {
    if let Some(caps) = WHOLE_FENCE.captures(raw)
        && let Some(body) = caps.get(1)
    {
        return body.as_str();
    }
    if let Some(caps) = INNER_FENCE.captures(raw)
        && let Some(body) = caps.get(1)
    {
        return body.as_str();
    }
    raw
}

/// Remove `// line` and `/* block */` comments outside string literals.
#[must_use]
pub fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        let next = chars.peek().copied();
        match (c, next) {
            ('"', _) => {
                in_string = true;
                out.push(c);
            }
            ('/', Some('/')) => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }
    out
}

/// Drop commas that are followed only by whitespace and a closing `}` or `]`.
#[must_use]
pub fn strip_trailing_commas(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            out.push(c);
            continue;
        }
        if c == '"' {
            in_string = true;
        } else if c == ','
            && matches!(
                chars[i + 1..].iter().find(|n| !n.is_whitespace()),
                Some('}' | ']')
            )
        {
            continue;
        }
        out.push(c);
    }
    out
}

/// Substring from the first `{` to the last `}`, if it spans anything.
#[must_use]
pub fn embedded_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_whole_fence() {
        assert_eq!(strip_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_fences("```\n[1]\n```\n"), "[1]");
        assert_eq!(strip_fences("{\"a\": 1}"), "{\"a\": 1}");
    }

    #[test]
    fn test_strip_fence_inside_prose() {
        let raw = "Here you go:\n```json\n{\"a\": 1}\n```\nEnjoy!";
        assert_eq!(strip_fences(raw).trim(), "{\"a\": 1}");
    }

    #[test]
    fn test_comments_removed_outside_strings() {
        let text = "{\n  // the name\n  \"url\": \"http://x.test/a\", /* inline */ \"b\": 2\n}";
        let cleaned = strip_comments(text);
        assert!(!cleaned.contains("the name"));
        assert!(!cleaned.contains("inline"));
        assert!(cleaned.contains("http://x.test/a"));
        let value: serde_json::Value = serde_json::from_str(&cleaned).unwrap();
        assert_eq!(value["b"], 2);
    }

    #[test]
    fn test_trailing_commas_removed() {
        assert_eq!(strip_trailing_commas("{\"a\": [1, 2,],}"), "{\"a\": [1, 2]}");
        assert_eq!(strip_trailing_commas("[1,\n  ]"), "[1\n  ]");
    }

    #[test]
    fn test_trailing_comma_inside_string_kept() {
        assert_eq!(strip_trailing_commas(r#"{"a": ",}"}"#), r#"{"a": ",}"}"#);
        assert_eq!(
            strip_trailing_commas(r#"{"a": "x\",}",}"#),
            r#"{"a": "x\",}"}"#
        );
    }

    #[test]
    fn test_embedded_object() {
        assert_eq!(
            embedded_object("Sure! {\"a\": {\"b\": 1}} Hope that helps."),
            Some("{\"a\": {\"b\": 1}}")
        );
        assert_eq!(embedded_object("no braces"), None);
        assert_eq!(embedded_object("} backwards {"), None);
    }
}
