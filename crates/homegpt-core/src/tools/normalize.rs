//! Converts provider results into planner-readable text
//!
//! Providers in the wild do not agree on one result schema. Normalization
//! is an ordered chain of shape matchers over the JSON form of a result;
//! each matcher is a pure `fn(&Value) -> Option<String>` and the first hit
//! wins. The chain is total: it always yields non-empty text.

use serde_json::Value;

/// Placeholder returned when a result carries nothing recognizable
pub const NO_CONTENT: &str = "No content";

/// Fallback message for error results without an explanation
pub const GENERIC_TOOL_ERROR: &str = "Tool reported an error";

/// Raw success payload of a provider call
#[derive(Debug, Clone, PartialEq)]
pub enum RawResult {
    /// Plain text, as produced by the local provider
    Text(String),
    /// Structured payload, e.g. a serialized MCP `CallToolResult`
    Json(Value),
}

impl RawResult {
    /// Check whether the payload carries an error flag
    pub fn is_error(&self) -> bool {
        match self {
            RawResult::Text(_) => false,
            RawResult::Json(value) => has_error_flag(value),
        }
    }
}

impl From<String> for RawResult {
    fn from(text: String) -> Self {
        RawResult::Text(text)
    }
}

impl From<&str> for RawResult {
    fn from(text: &str) -> Self {
        RawResult::Text(text.to_string())
    }
}

impl From<Value> for RawResult {
    fn from(value: Value) -> Self {
        RawResult::Json(value)
    }
}

type ShapeMatcher = fn(&Value) -> Option<String>;

/// Matchers in priority order
const SHAPES: &[ShapeMatcher] = &[error_shape, content_shape, text_shape];

/// Normalize a raw result into text
///
/// Plain text passes through unchanged; structured payloads go through the
/// shape chain. Empty output becomes [`NO_CONTENT`].
pub fn normalize(raw: &RawResult) -> String {
    let text = match raw {
        RawResult::Text(text) => Some(text.clone()),
        RawResult::Json(value) => SHAPES.iter().find_map(|shape| shape(value)),
    };

    match text {
        Some(text) if !text.trim().is_empty() => text,
        _ => NO_CONTENT.to_string(),
    }
}

/// Error flag: `isError`/`is_error` true, or an `error` member
pub fn error_shape(value: &Value) -> Option<String> {
    if !has_error_flag(value) {
        return None;
    }

    let message = value
        .get("content")
        .and_then(content_shape_inner)
        .or_else(|| string_field(value, "message"))
        .or_else(|| match value.get("error") {
            Some(Value::String(s)) => non_empty(s),
            Some(obj @ Value::Object(_)) => string_field(obj, "message"),
            _ => None,
        });

    Some(message.unwrap_or_else(|| GENERIC_TOOL_ERROR.to_string()))
}

/// Content collection: `content` array of blocks, or a `content` string
pub fn content_shape(value: &Value) -> Option<String> {
    content_shape_inner(value.get("content")?)
}

/// Single textual payload: a bare string, a text-like member, or structured content
pub fn text_shape(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_empty(s),
        Value::Object(_) => ["text", "message", "result"]
            .iter()
            .find_map(|key| string_field(value, key))
            .or_else(|| match value.get("structuredContent") {
                Some(Value::Null) | None => None,
                Some(structured) => Some(structured.to_string()),
            }),
        _ => None,
    }
}

/// Text of one content block
///
/// Tries `text`, then nested `content`, then an embedded resource's text,
/// and finally the block's compact JSON.
pub fn block_text(block: &Value) -> Option<String> {
    match block {
        Value::Null => None,
        Value::String(s) => non_empty(s),
        Value::Object(_) => string_field(block, "text")
            .or_else(|| block.get("content").and_then(content_shape_inner))
            .or_else(|| block.get("resource").and_then(|r| string_field(r, "text")))
            .or_else(|| Some(block.to_string())),
        other => Some(other.to_string()),
    }
}

fn content_shape_inner(content: &Value) -> Option<String> {
    match content {
        Value::Array(blocks) => {
            let parts: Vec<String> = blocks.iter().filter_map(block_text).collect();
            (!parts.is_empty()).then(|| parts.join("\n"))
        }
        Value::String(s) => non_empty(s),
        Value::Object(_) => block_text(content),
        _ => None,
    }
}

fn has_error_flag(value: &Value) -> bool {
    let flagged = ["isError", "is_error"]
        .iter()
        .any(|key| value.get(key).and_then(Value::as_bool).unwrap_or(false));

    let error_member = match value.get("error") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    };

    flagged || error_member
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).and_then(non_empty)
}

fn non_empty(s: &str) -> Option<String> {
    (!s.trim().is_empty()).then(|| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_string_unchanged() {
        let raw = RawResult::from("TV turned on successfully");
        assert_eq!(normalize(&raw), "TV turned on successfully");
    }

    #[test]
    fn test_text_blocks_joined_with_newlines() {
        let raw = RawResult::from(json!({
            "content": [
                { "type": "text", "text": "A" },
                { "type": "text", "text": "B" }
            ]
        }));
        assert_eq!(normalize(&raw), "A\nB");
    }

    #[test]
    fn test_empty_or_absent_content_gives_placeholder() {
        assert_eq!(normalize(&RawResult::from(json!({ "content": [] }))), NO_CONTENT);
        assert_eq!(normalize(&RawResult::from(json!({ "content": null }))), NO_CONTENT);
        assert_eq!(normalize(&RawResult::from(json!({}))), NO_CONTENT);
        assert_eq!(normalize(&RawResult::from(Value::Null)), NO_CONTENT);
        assert_eq!(normalize(&RawResult::from("")), NO_CONTENT);
    }

    #[test]
    fn test_error_flag_wins_over_content() {
        let raw = RawResult::from(json!({
            "isError": true,
            "content": [{ "type": "text", "text": "rate limited by upstream" }]
        }));
        assert!(raw.is_error());
        assert_eq!(normalize(&raw), "rate limited by upstream");

        let bare = RawResult::from(json!({ "isError": true }));
        assert_eq!(normalize(&bare), GENERIC_TOOL_ERROR);

        let nested = RawResult::from(json!({ "error": { "code": 42, "message": "bad url" } }));
        assert_eq!(normalize(&nested), "bad url");
    }

    #[test]
    fn test_false_error_flag_is_ignored() {
        let raw = RawResult::from(json!({
            "isError": false,
            "error": null,
            "content": [{ "type": "text", "text": "ok" }]
        }));
        assert!(!raw.is_error());
        assert_eq!(normalize(&raw), "ok");
    }

    #[test]
    fn test_block_fallbacks() {
        let raw = RawResult::from(json!({
            "content": [
                { "type": "wrapper", "content": [{ "text": "nested" }] },
                { "type": "resource", "resource": { "uri": "file:///a", "text": "embedded" } },
                { "type": "image", "mimeType": "image/png" },
                null
            ]
        }));
        let text = normalize(&raw);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "nested");
        assert_eq!(lines[1], "embedded");
        assert!(lines[2].contains("image/png"));
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_single_textual_payloads() {
        assert_eq!(normalize(&RawResult::from(json!("just text"))), "just text");
        assert_eq!(normalize(&RawResult::from(json!({ "content": "inline" }))), "inline");
        assert_eq!(normalize(&RawResult::from(json!({ "result": "42" }))), "42");
        assert_eq!(
            normalize(&RawResult::from(json!({ "structuredContent": { "temp": 21 } }))),
            r#"{"temp":21}"#
        );
    }

    #[test]
    fn test_matchers_in_isolation() {
        assert_eq!(error_shape(&json!({ "content": [] })), None);
        assert_eq!(content_shape(&json!({ "text": "x" })), None);
        assert_eq!(text_shape(&json!({ "content": [] })), None);
        assert_eq!(block_text(&json!(7)), Some("7".to_string()));
    }
}
