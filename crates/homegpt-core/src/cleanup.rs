//! Cleanup of JSON action lists in free-form model output
//!
//! Used when a planner is asked to answer with a JSON array of device
//! actions instead of calling tools. Small local models wrap the array in
//! code fences, chatter before it, or drop the brackets; these helpers
//! recover the array on a best-effort basis.

use crate::types::DeviceAction;

/// Fence openings that may precede the array
const FENCE_TAGS: &[&str] = &["```json", "`` json"];

/// Recover a JSON array from model output
///
/// Returns `None` for blank input. The result always has exactly one pair
/// of enclosing brackets but is not guaranteed to be valid JSON.
pub fn clean_json_actions(content: &str) -> Option<String> {
    let content = content.trim();
    if content.is_empty() {
        return None;
    }

    let mut text = content.replace("\\\"", "\"");
    if text.contains("```") || text.contains("`` ") {
        text = strip_before_fence(&text);
        for tag in FENCE_TAGS {
            text = text.replace(tag, "");
        }
        // Everything after the closing fence is chatter
        if let Some(end) = text.get(1..).and_then(|rest| rest.find("```")) {
            if end > 0 {
                text.truncate(end + 1);
            }
        }
        text = text.replace("```", "");
    }

    let text = text.replace('\n', "");
    let body = text
        .trim()
        .trim_start_matches('=')
        .trim_matches('`')
        .trim()
        .trim_start_matches('[')
        .trim_end_matches(']');

    Some(format!("[{}]", body))
}

/// Drop chatter before each known fence tag, tag included
fn strip_before_fence(content: &str) -> String {
    let mut text = content.to_string();
    for tag in FENCE_TAGS {
        if let Some(index) = text.to_ascii_lowercase().find(tag) {
            text = text[index + tag.len()..].to_string();
        }
    }
    text
}

/// Drop a leading ```` ```json ```` and everything after the next fence
pub fn simple_cleanup(content: &str) -> String {
    if !content.contains("```") {
        return content.to_string();
    }
    let mut text = content.replace("```json", "");
    if let Some(index) = text.find("```") {
        text.truncate(index);
    }
    text
}

/// Clean model output and parse it as a list of device actions
pub fn parse_device_actions(content: &str) -> Option<Vec<DeviceAction>> {
    let cleaned = clean_json_actions(content)?;
    serde_json::from_str(&cleaned).ok()
}
