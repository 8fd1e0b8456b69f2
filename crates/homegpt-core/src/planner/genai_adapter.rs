//! Adapter between homegpt-core types and genai types
//!
//! Tool-use and tool-result turns map onto genai's native tool call and tool
//! response content, so the endpoint can pair each result with its call id.
//! Any other structured content is flattened to text.

use std::future::Future;
use std::pin::Pin;

use genai::chat::{
    ChatMessage as GenaiMessage, ChatOptions as GenaiOptions, ChatRole as GenaiRole,
    ContentPart as GenaiContentPart, MessageContent as GenaiContent, Tool as GenaiTool,
    ToolCall as GenaiToolCall, ToolResponse as GenaiToolResponse,
};
use genai::resolver::{AuthData, AuthResolver, Endpoint, ServiceTargetResolver};
use genai::{adapter::AdapterKind, Client, ModelIden, ServiceTarget};

use crate::config::PlannerSettings;
use crate::types::{ChatMessage, ContentPart, MessageContent, MessageRole, Tool, ToolCall};

use super::traits::PlanOptions;

/// Default endpoint of a local LM Studio server
pub const LM_STUDIO_ENDPOINT: &str = "http://localhost:1234/v1/";

/// Key sent to local servers that do not check it
const LOCAL_PLACEHOLDER_KEY: &str = "lm-studio";

// ============================================================================
// Message Conversion: homegpt -> genai
// ============================================================================

/// Convert a MessageRole to a genai ChatRole
pub fn to_genai_role(role: MessageRole) -> GenaiRole {
    match role {
        MessageRole::System => GenaiRole::System,
        MessageRole::User => GenaiRole::User,
        MessageRole::Assistant => GenaiRole::Assistant,
        MessageRole::Tool => GenaiRole::Tool,
    }
}

/// Convert a ChatMessage to a genai ChatMessage
///
/// Assistant tool-use parts become genai tool calls and tool-role result
/// parts become tool responses. Everything else is sent as flattened text.
pub fn to_genai_message(msg: ChatMessage) -> GenaiMessage {
    match msg.role {
        MessageRole::Assistant => {
            let calls = to_genai_tool_calls(&msg.content);
            if !calls.is_empty() {
                return GenaiMessage::from(calls);
            }
        }
        MessageRole::Tool => {
            let mut responses = to_genai_tool_responses(&msg.content);
            if responses.len() == 1 {
                return GenaiMessage::from(responses.remove(0));
            }
            if !responses.is_empty() {
                let parts: Vec<GenaiContentPart> =
                    responses.into_iter().map(GenaiContentPart::from).collect();
                return GenaiMessage {
                    role: GenaiRole::Tool,
                    content: GenaiContent::from_parts(parts),
                    options: None,
                };
            }
        }
        MessageRole::System | MessageRole::User => {}
    }

    let text = msg.flatten_text();
    match msg.role {
        MessageRole::System => GenaiMessage::system(text),
        MessageRole::Assistant => GenaiMessage::assistant(text),
        MessageRole::User | MessageRole::Tool => GenaiMessage::user(text),
    }
}

fn to_genai_tool_calls(content: &MessageContent) -> Vec<GenaiToolCall> {
    let MessageContent::Parts(parts) = content else {
        return Vec::new();
    };
    parts
        .iter()
        .filter_map(|part| match part {
            ContentPart::ToolUse { id, name, input } => Some(GenaiToolCall {
                call_id: id.clone(),
                fn_name: name.clone(),
                fn_arguments: serde_json::Value::Object(input.clone()),
                thought_signatures: None,
            }),
            _ => None,
        })
        .collect()
}

fn to_genai_tool_responses(content: &MessageContent) -> Vec<GenaiToolResponse> {
    let MessageContent::Parts(parts) = content else {
        return Vec::new();
    };
    parts
        .iter()
        .filter_map(|part| match part {
            ContentPart::ToolResult { tool_use_id, content } => {
                Some(GenaiToolResponse::new(tool_use_id.clone(), content.clone()))
            }
            _ => None,
        })
        .collect()
}

/// Convert a conversation to genai messages
pub fn to_genai_messages(messages: Vec<ChatMessage>) -> Vec<GenaiMessage> {
    messages.into_iter().map(to_genai_message).collect()
}

// ============================================================================
// Tool Conversion: homegpt -> genai
// ============================================================================

/// Convert a Tool to a genai Tool
pub fn to_genai_tool(tool: Tool) -> GenaiTool {
    let mut genai_tool = GenaiTool::new(&tool.name).with_description(&tool.description);

    if let Some(schema) = tool.input_schema {
        genai_tool = genai_tool.with_schema(schema);
    }

    genai_tool
}

/// Convert tools to genai tools
pub fn to_genai_tools(tools: Vec<Tool>) -> Vec<GenaiTool> {
    tools.into_iter().map(to_genai_tool).collect()
}

/// Convert plan options to genai ChatOptions
pub fn to_genai_options(options: &PlanOptions) -> GenaiOptions {
    let mut genai_opts = GenaiOptions::default();

    if let Some(temp) = options.temperature {
        genai_opts = genai_opts.with_temperature(temp as f64);
    }

    if let Some(max_tokens) = options.max_tokens {
        genai_opts = genai_opts.with_max_tokens(max_tokens);
    }

    // Tool calls are only reported at stream end when captured
    genai_opts.with_capture_tool_calls(true)
}

// ============================================================================
// Response Conversion: genai -> homegpt
// ============================================================================

/// Convert a genai ToolCall to a ToolCall
pub fn from_genai_tool_call(tc: &GenaiToolCall) -> ToolCall {
    ToolCall::new(tc.call_id.clone(), tc.fn_name.clone(), tc.fn_arguments.clone())
}

// ============================================================================
// Client Creation
// ============================================================================

/// Connection settings for the genai client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Provider identifier (e.g., "openai-compatible", "openai", "ollama")
    pub provider: String,
    /// Resolved API key
    pub api_key: Option<String>,
    /// Custom API base URL
    pub api_base: Option<String>,
}

impl From<&PlannerSettings> for ClientConfig {
    fn from(settings: &PlannerSettings) -> Self {
        Self {
            provider: settings.provider.to_lowercase(),
            api_key: settings.resolve_api_key(),
            api_base: settings.endpoint.clone(),
        }
    }
}

/// Providers reached through the OpenAI adapter at a custom endpoint
pub fn is_openai_compatible(provider: &str) -> bool {
    matches!(
        provider.to_lowercase().as_str(),
        "openai-compatible" | "lmstudio" | "lm-studio" | "azure" | "openrouter" | "mistral"
    )
}

/// Providers that run locally and accept any key
fn is_local(provider: &str) -> bool {
    matches!(provider, "openai-compatible" | "lmstudio" | "lm-studio" | "ollama")
}

/// Endpoint for an OpenAI-compatible provider
pub fn compatible_endpoint(provider: &str, api_base: Option<&str>) -> String {
    if let Some(base) = api_base.filter(|b| !b.trim().is_empty()) {
        return base.to_string();
    }
    match provider {
        "openrouter" => "https://openrouter.ai/api/v1/".to_string(),
        "mistral" => "https://api.mistral.ai/v1/".to_string(),
        "azure" => "https://your-resource.openai.azure.com/".to_string(),
        _ => LM_STUDIO_ENDPOINT.to_string(),
    }
}

/// Create a genai Client with explicit auth and endpoint resolution
///
/// Keys come from the settings only, never from genai's own environment
/// lookup.
pub fn create_client(config: &ClientConfig) -> Client {
    let auth_provider = config.provider.clone();
    let auth_key = config.api_key.clone();

    let auth_resolver = AuthResolver::from_resolver_async_fn(
        move |_model_iden: ModelIden| -> Pin<Box<dyn Future<Output = genai::resolver::Result<Option<AuthData>>> + Send>> {
            let provider = auth_provider.clone();
            let key = auth_key.clone();

            Box::pin(async move {
                match key {
                    Some(key) => Ok(Some(AuthData::from_single(key))),
                    None if is_local(&provider) => Ok(Some(AuthData::from_single(LOCAL_PLACEHOLDER_KEY.to_string()))),
                    None => Ok(None),
                }
            })
        },
    );

    let target_provider = config.provider.clone();
    let target_api_base = config.api_base.clone();

    let target_resolver = ServiceTargetResolver::from_resolver_fn(
        move |target: ServiceTarget| -> Result<ServiceTarget, genai::resolver::Error> {
            if !is_openai_compatible(&target_provider) {
                return Ok(target);
            }

            let endpoint = compatible_endpoint(&target_provider, target_api_base.as_deref());
            let model = ModelIden::new(AdapterKind::OpenAI, target.model.model_name.clone());

            Ok(ServiceTarget {
                endpoint: Endpoint::from_owned(endpoint),
                auth: target.auth,
                model,
            })
        },
    );

    Client::builder()
        .with_auth_resolver(auth_resolver)
        .with_service_target_resolver(target_resolver)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_conversion() {
        assert!(matches!(to_genai_role(MessageRole::System), GenaiRole::System));
        assert!(matches!(to_genai_role(MessageRole::Tool), GenaiRole::Tool));
        assert!(matches!(
            to_genai_role(MessageRole::Assistant),
            GenaiRole::Assistant
        ));
    }

    #[test]
    fn test_tool_result_message_keeps_call_id() {
        let msg = ChatMessage::tool_result("call_1", "TV turned on successfully");
        let genai_msg = to_genai_message(msg);

        assert!(matches!(genai_msg.role, GenaiRole::Tool));
        let responses = genai_msg.content.tool_responses();
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].call_id, "call_1");
        assert_eq!(responses[0].content, "TV turned on successfully");
    }

    #[test]
    fn test_assistant_tool_calls_are_native() {
        let calls = vec![ToolCall::new(
            "call_7",
            "ExecuteDeviceAction",
            serde_json::json!({"deviceName": "TV", "action": "On"}),
        )];
        let genai_msg = to_genai_message(ChatMessage::tool_calls(&calls));

        assert!(matches!(genai_msg.role, GenaiRole::Assistant));
        let genai_calls = genai_msg.content.tool_calls();
        assert_eq!(genai_calls.len(), 1);
        assert_eq!(genai_calls[0].call_id, "call_7");
        assert_eq!(genai_calls[0].fn_name, "ExecuteDeviceAction");
        assert_eq!(genai_calls[0].fn_arguments["deviceName"], "TV");
    }

    #[test]
    fn test_plain_messages_stay_text() {
        let genai_msg = to_genai_message(ChatMessage::user("Turn on the TV"));
        assert!(matches!(genai_msg.role, GenaiRole::User));
        assert!(!genai_msg.content.contains_tool_call());
        assert_eq!(genai_msg.content.texts(), vec!["Turn on the TV"]);
    }

    #[test]
    fn test_tool_conversion() {
        let tool = Tool::new("ExecuteDeviceAction", "Controls devices")
            .with_schema(serde_json::json!({
                "type": "object",
                "properties": { "deviceName": { "type": "string" } }
            }));

        let genai_tool = to_genai_tool(tool);
        assert_eq!(genai_tool.name, "ExecuteDeviceAction");
    }

    #[test]
    fn test_compatible_endpoints() {
        assert!(is_openai_compatible("openai-compatible"));
        assert!(is_openai_compatible("OpenRouter"));
        assert!(!is_openai_compatible("openai"));

        assert_eq!(compatible_endpoint("openai-compatible", None), LM_STUDIO_ENDPOINT);
        assert_eq!(
            compatible_endpoint("openai-compatible", Some("http://nas:1234/v1/")),
            "http://nas:1234/v1/"
        );
        assert_eq!(compatible_endpoint("mistral", Some("  ")), "https://api.mistral.ai/v1/");
    }

    #[test]
    fn test_client_config_from_settings() {
        let settings = PlannerSettings {
            provider: "LMStudio".to_string(),
            api_key: Some("sk-test".to_string()),
            ..PlannerSettings::default()
        };
        let config = ClientConfig::from(&settings);
        assert_eq!(config.provider, "lmstudio");
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.api_base.as_deref(), Some(LM_STUDIO_ENDPOINT));
    }
}
