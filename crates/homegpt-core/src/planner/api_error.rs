//! Human-readable descriptions of chat endpoint error bodies

use serde_json::Value;

const NO_MODEL: &str =
    "No model is loaded on the chat server. Load a model in LM Studio or run 'lms load'.";
const UNREACHABLE: &str =
    "Cannot connect to the chat server. Make sure it is running on http://localhost:1234.";
const TIMED_OUT: &str = "The request timed out. The model may be busy, try again in a moment.";
const RATE_LIMITED: &str = "Too many requests. Wait a moment before trying again.";
const BAD_TOKEN: &str = "Authentication failed. Check the API key configuration.";
const SERVER_ERROR: &str = "The chat server reported an internal error. Try again or restart it.";
const NOT_FOUND: &str = "The chat endpoint was not found. Check the endpoint configuration.";

/// Longest plain-text body returned verbatim
const MAX_PLAIN_LEN: usize = 200;

/// Turn an error body from the chat endpoint into a short message
///
/// Recognizes `{"error": {"message", "code"}}`, a top-level `message` or
/// `detail`, and a handful of plain-text patterns. Anything else yields
/// `fallback`, except short plain text which is returned as-is.
pub fn describe_api_error(body: &str, fallback: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return fallback.to_string();
    }

    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return describe_plain_text(body, fallback);
    };

    if let Some(error) = value.get("error") {
        return describe_error_object(error);
    }

    ["message", "detail"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| fallback.to_string())
}

fn describe_error_object(error: &Value) -> String {
    let message = match error {
        Value::String(s) => s.as_str(),
        _ => match error.get("message").and_then(Value::as_str) {
            Some(message) => message,
            None => return "API error occurred".to_string(),
        },
    };
    let code = error.get("code").and_then(Value::as_str).unwrap_or_default();
    categorize(message, code).unwrap_or_else(|| message.to_string())
}

fn categorize(message: &str, code: &str) -> Option<String> {
    let lower = message.to_lowercase();
    let known = if lower.contains("no models loaded") || lower.contains("model_not_found") || code == "model_not_found" {
        NO_MODEL
    } else if lower.contains("connection") && lower.contains("refused") {
        UNREACHABLE
    } else if lower.contains("timeout") || lower.contains("timed out") {
        TIMED_OUT
    } else if lower.contains("rate limit") {
        RATE_LIMITED
    } else if lower.contains("invalid") && lower.contains("token") {
        BAD_TOKEN
    } else if lower.contains("server error") || lower.contains("internal error") {
        SERVER_ERROR
    } else {
        return None;
    };
    Some(known.to_string())
}

fn describe_plain_text(body: &str, fallback: &str) -> String {
    let lower = body.to_lowercase();
    if lower.contains("connection refused") {
        UNREACHABLE.to_string()
    } else if lower.contains("404") || lower.contains("not found") {
        NOT_FOUND.to_string()
    } else if lower.contains("500") || lower.contains("internal server error") {
        SERVER_ERROR.to_string()
    } else if body.chars().count() <= MAX_PLAIN_LEN {
        body.to_string()
    } else {
        fallback.to_string()
    }
}
