//! Structured-output extraction from model text
//!
//! Models asked for JSON reply with bare JSON, fenced code blocks, or JSON
//! buried in prose. `parse_output` tries each shape in turn and returns
//! `None` when no usable structure is found - "could not parse" is an
//! expected outcome that callers handle by regenerating, not an error.

use serde_json::Value;
use tracing::debug;

/// Parse a model response into structured data
///
/// Returns `Some` only for a non-empty JSON object; anything else
/// (no JSON, invalid JSON, an empty object, an array) is `None`.
pub fn parse_output(text: &str) -> Option<Value> {
    let candidates = [direct(text), fenced(text), embedded(text)];

    for candidate in candidates.into_iter().flatten() {
        if let Ok(value) = serde_json::from_str::<Value>(&candidate)
            && let Some(obj) = value.as_object()
            && !obj.is_empty()
        {
            return Some(value);
        }
    }

    debug!(text_len = text.len(), "parse_output: no structured data found");
    None
}

/// The whole response is the JSON payload
fn direct(text: &str) -> Option<String> {
    let trimmed = text.trim();
    trimmed.starts_with('{').then(|| trimmed.to_string())
}

/// JSON inside a fenced code block (```json ... ``` or ``` ... ```)
fn fenced(text: &str) -> Option<String> {
    let start = text.find("```")?;
    let after_fence = &text[start + 3..];
    // Skip the language tag on the opening fence line
    let body_start = after_fence.find('\n')? + 1;
    let body = &after_fence[body_start..];
    let end = body.find("```")?;
    Some(body[..end].trim().to_string())
}

/// JSON embedded in prose: outermost brace pair
fn embedded(text: &str) -> Option<String> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| text[start..=end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_json() {
        let value = parse_output(r#"{"task": "What is X?"}"#).unwrap();
        assert_eq!(value["task"], "What is X?");
    }

    #[test]
    fn test_parse_fenced_json() {
        let text = "Here is the plan:\n```json\n{\"task\": \"root\"}\n```\nDone.";
        let value = parse_output(text).unwrap();
        assert_eq!(value["task"], "root");
    }

    #[test]
    fn test_parse_fenced_without_language_tag() {
        let text = "```\n{\"task\": \"root\"}\n```";
        let value = parse_output(text).unwrap();
        assert_eq!(value["task"], "root");
    }

    #[test]
    fn test_parse_embedded_json() {
        let text = "Sure! The decomposition is {\"task\": \"root\", \"sub_plans\": []} as requested.";
        let value = parse_output(text).unwrap();
        assert_eq!(value["task"], "root");
    }

    #[test]
    fn test_parse_rejects_prose() {
        assert!(parse_output("I could not produce a plan for this.").is_none());
    }

    #[test]
    fn test_parse_rejects_empty_object() {
        assert!(parse_output("{}").is_none());
    }

    #[test]
    fn test_parse_rejects_array() {
        assert!(parse_output(r#"[{"task": "a"}]"#).is_none());
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        assert!(parse_output("{\"task\": ").is_none());
    }

    #[test]
    fn test_parse_nested_plan() {
        let text = r#"{"task": {"ask": "root"}, "sub_plans": [{"task": "child"}]}"#;
        let value = parse_output(text).unwrap();
        assert_eq!(value["sub_plans"][0]["task"], "child");
    }
}
