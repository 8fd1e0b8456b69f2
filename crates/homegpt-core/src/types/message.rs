//! Planner conversation message types

use serde::{Deserialize, Serialize};

use super::tool::{ToolArguments, ToolCall};

/// Message role in a planner conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
            MessageRole::Tool => write!(f, "tool"),
        }
    }
}

/// A message in the planner conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The role of the message sender
    pub role: MessageRole,
    /// The content of the message (string or structured parts)
    pub content: MessageContent,
}

impl ChatMessage {
    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Assistant message carrying the tool calls the planner requested
    pub fn tool_calls(calls: &[ToolCall]) -> Self {
        let parts = calls
            .iter()
            .map(|c| ContentPart::tool_use(&c.id, &c.name, c.arguments.clone()))
            .collect();
        Self::with_parts(MessageRole::Assistant, parts)
    }

    /// Tool message carrying one tool result
    pub fn tool_result(tool_use_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::with_parts(
            MessageRole::Tool,
            vec![ContentPart::tool_result(tool_use_id, content)],
        )
    }

    /// Create a message with structured content parts
    pub fn with_parts(role: MessageRole, parts: Vec<ContentPart>) -> Self {
        Self {
            role,
            content: MessageContent::Parts(parts),
        }
    }

    /// Get the text content if this is a simple text message
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Text(s) => Some(s),
            MessageContent::Parts(_) => None,
        }
    }

    /// Render the message as plain text, flattening structured parts
    pub fn flatten_text(&self) -> String {
        match &self.content {
            MessageContent::Text(s) => s.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .map(ContentPart::to_text)
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// Message content - either simple text or structured parts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Simple text content
    Text(String),
    /// Structured content with multiple parts
    Parts(Vec<ContentPart>),
}

impl From<String> for MessageContent {
    fn from(s: String) -> Self {
        MessageContent::Text(s)
    }
}

impl From<&str> for MessageContent {
    fn from(s: &str) -> Self {
        MessageContent::Text(s.to_string())
    }
}

/// Content part for tool-calling turns
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Text content
    Text {
        text: String,
    },
    /// Tool use (planner calling a tool)
    ToolUse {
        id: String,
        name: String,
        input: ToolArguments,
    },
    /// Tool result (returning tool output)
    ToolResult {
        #[serde(rename = "tool_use_id")]
        tool_use_id: String,
        content: String,
    },
}

impl ContentPart {
    /// Create a text content part
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }

    /// Create a tool use content part
    pub fn tool_use(id: impl Into<String>, name: impl Into<String>, input: ToolArguments) -> Self {
        ContentPart::ToolUse {
            id: id.into(),
            name: name.into(),
            input,
        }
    }

    /// Create a tool result content part
    pub fn tool_result(tool_use_id: impl Into<String>, content: impl Into<String>) -> Self {
        ContentPart::ToolResult {
            tool_use_id: tool_use_id.into(),
            content: content.into(),
        }
    }

    fn to_text(&self) -> String {
        match self {
            ContentPart::Text { text } => text.clone(),
            ContentPart::ToolUse { id, name, input } => format!(
                "[Tool call {}]: {}({})",
                id,
                name,
                serde_json::Value::Object(input.clone())
            ),
            ContentPart::ToolResult { tool_use_id, content } => {
                format!("[Tool result for {}]: {}", tool_use_id, content)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chat_message_creation() {
        let sys = ChatMessage::system("You are a smart home assistant");
        assert_eq!(sys.role, MessageRole::System);
        assert_eq!(sys.text(), Some("You are a smart home assistant"));

        let user = ChatMessage::user("Turn on the TV");
        assert_eq!(user.role, MessageRole::User);
    }

    #[test]
    fn test_tool_call_message_flattening() {
        let call = ToolCall::new("call_1", "ExecuteDeviceAction", json!({"deviceName": "TV"}));
        let msg = ChatMessage::tool_calls(&[call]);

        assert_eq!(msg.role, MessageRole::Assistant);
        assert!(msg.text().is_none());
        let flat = msg.flatten_text();
        assert!(flat.contains("ExecuteDeviceAction"));
        assert!(flat.contains("\"deviceName\":\"TV\""));

        let result = ChatMessage::tool_result("call_1", "TV turned on successfully");
        assert_eq!(
            result.flatten_text(),
            "[Tool result for call_1]: TV turned on successfully"
        );
    }

    #[test]
    fn test_content_part_serialization() {
        let part = ContentPart::text("Hello");
        let json = serde_json::to_string(&part).unwrap();
        assert!(json.contains("\"type\":\"text\""));
    }
}
