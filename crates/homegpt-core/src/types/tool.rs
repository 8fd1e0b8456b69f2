//! Tool descriptor and invocation types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Arguments of a tool invocation.
///
/// Values are loosely typed (string, number, or absent). Key order carries
/// no meaning.
pub type ToolArguments = Map<String, Value>;

/// Which provider owns a tool
///
/// This is a lookup key into the registry, not a handle: providers are
/// never owned by the tools they advertise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum ToolSource {
    /// The in-process provider
    Local,
    /// A remote provider, by connection id
    Remote(String),
}

impl ToolSource {
    /// Create a remote source
    pub fn remote(id: impl Into<String>) -> Self {
        ToolSource::Remote(id.into())
    }

    /// Check if this is the local provider
    pub fn is_local(&self) -> bool {
        matches!(self, ToolSource::Local)
    }
}

impl std::fmt::Display for ToolSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolSource::Local => write!(f, "local"),
            ToolSource::Remote(id) => write!(f, "{}", id),
        }
    }
}

/// Tool definition as offered to the planner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    /// Tool name (function name)
    pub name: String,
    /// Description of what the tool does
    pub description: String,
    /// JSON Schema for the input parameters
    #[serde(rename = "inputSchema", skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<Value>,
}

impl Tool {
    /// Create a new tool definition
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: None,
        }
    }

    /// Set the input schema
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.input_schema = Some(schema);
        self
    }
}

/// A tool in the merged registry, with its owning provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Tool name, unique in the merged registry
    pub name: String,
    /// Free text description for the planner
    pub description: String,
    /// JSON Schema for the tool parameters
    #[serde(rename = "inputSchema", skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<Value>,
    /// Provider that advertised this tool
    pub source: ToolSource,
}

impl ToolDescriptor {
    /// Attach a planner-facing tool definition to its source
    pub fn from_tool(tool: Tool, source: ToolSource) -> Self {
        Self {
            name: tool.name,
            description: tool.description,
            input_schema: tool.input_schema,
            source,
        }
    }

    /// Display key used in trace events, e.g. `local:GetMcpStatus`
    pub fn qualified_name(&self) -> String {
        format!("{}:{}", self.source, self.name)
    }
}

impl From<&ToolDescriptor> for Tool {
    fn from(descriptor: &ToolDescriptor) -> Self {
        Tool {
            name: descriptor.name.clone(),
            description: descriptor.description.clone(),
            input_schema: descriptor.input_schema.clone(),
        }
    }
}

/// Tool call requested by the planner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this tool call
    pub id: String,
    /// Name of the tool being called
    pub name: String,
    /// Input arguments for the tool
    #[serde(default)]
    pub arguments: ToolArguments,
}

impl ToolCall {
    /// Create a new tool call
    ///
    /// Non-object inputs are treated as "no arguments".
    pub fn new(id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        let arguments = match input {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }

    /// Get an argument as trimmed, non-empty text
    pub fn get_arg_str(&self, key: &str) -> Option<String> {
        arg_text(&self.arguments, key)
    }
}

/// Read an argument as trimmed, non-empty text.
///
/// Numbers and booleans are rendered; null, empty strings and structured
/// values count as absent.
pub fn arg_text(args: &ToolArguments, key: &str) -> Option<String> {
    match args.get(key)? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Read an argument as a number, accepting numeric strings
pub fn arg_number(args: &ToolArguments, key: &str) -> Option<f64> {
    match args.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_call_args() {
        let call = ToolCall::new(
            "call_1",
            "ExecuteDeviceAction",
            json!({
                "deviceName": "  Kitchen lights ",
                "action": "",
                "value": "23.5"
            }),
        );

        assert_eq!(call.get_arg_str("deviceName"), Some("Kitchen lights".to_string()));
        assert_eq!(call.get_arg_str("action"), None);
        assert_eq!(call.get_arg_str("missing"), None);
        assert_eq!(arg_number(&call.arguments, "value"), Some(23.5));
    }

    #[test]
    fn test_non_object_input_has_no_arguments() {
        let call = ToolCall::new("call_1", "GetMcpStatus", json!("oops"));
        assert!(call.arguments.is_empty());
    }

    #[test]
    fn test_number_arguments_render_as_text() {
        let call = ToolCall::new("c", "search", json!({ "max_results": 5 }));
        assert_eq!(call.get_arg_str("max_results"), Some("5".to_string()));
    }

    #[test]
    fn test_descriptor_to_tool() {
        let descriptor = ToolDescriptor::from_tool(
            Tool::new("search", "Search the web").with_schema(json!({"type": "object"})),
            ToolSource::remote("duckduckgo"),
        );

        assert_eq!(descriptor.qualified_name(), "duckduckgo:search");
        let tool = Tool::from(&descriptor);
        assert_eq!(tool.name, "search");
        assert!(tool.input_schema.is_some());
    }

    #[test]
    fn test_source_display() {
        assert_eq!(ToolSource::Local.to_string(), "local");
        assert_eq!(ToolSource::remote("hass-proxy").to_string(), "hass-proxy");
        assert!(ToolSource::Local.is_local());
    }
}
