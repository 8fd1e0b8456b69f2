//! Planner trait definition

use async_trait::async_trait;

use super::error::PlannerResult;
use crate::types::{CancellationToken, ChatMessage, Tool, ToolCall};

/// Sampling options for a planner turn
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanOptions {
    /// Temperature for response generation (0.0 - 2.0)
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
}

impl PlanOptions {
    /// Create new options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set temperature
    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    /// Set max tokens
    pub fn with_max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }
}

/// One planner round-trip
#[derive(Debug, Clone)]
pub struct PlannerRequest {
    /// Conversation so far, system prompt first
    pub messages: Vec<ChatMessage>,
    /// Tools the planner may call; empty for plain questions
    pub tools: Vec<Tool>,
    /// Sampling options
    pub options: PlanOptions,
}

impl PlannerRequest {
    /// Create a request without tools
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            tools: Vec::new(),
            options: PlanOptions::default(),
        }
    }

    /// Offer tools to the planner
    pub fn with_tools(mut self, tools: Vec<Tool>) -> Self {
        self.tools = tools;
        self
    }

    /// Set sampling options
    pub fn with_options(mut self, options: PlanOptions) -> Self {
        self.options = options;
        self
    }

    /// Text of the most recent user message
    pub fn last_user_text(&self) -> Option<String> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == crate::types::MessageRole::User)
            .map(ChatMessage::flatten_text)
            .filter(|t| !t.is_empty())
    }
}

/// What the planner decided to do next
#[derive(Debug, Clone, PartialEq)]
pub enum PlannerTurn {
    /// Call these tools, then ask again
    ToolCalls(Vec<ToolCall>),
    /// Final natural-language reply
    Answer(String),
}

impl PlannerTurn {
    /// Create an answer turn
    pub fn answer(text: impl Into<String>) -> Self {
        PlannerTurn::Answer(text.into())
    }
}

/// The chat-completion collaborator
///
/// Given the conversation and the tool list, either requests tool calls or
/// returns a final answer. The reasoning itself is opaque to the core.
#[async_trait]
pub trait Planner: Send + Sync {
    /// Planner name for logs, e.g. "genai", "mock"
    fn name(&self) -> &str;

    /// Run one round-trip
    async fn plan(
        &self,
        request: PlannerRequest,
        cancel_token: CancellationToken,
    ) -> PlannerResult<PlannerTurn>;
}
