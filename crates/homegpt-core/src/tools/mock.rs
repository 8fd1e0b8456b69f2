//! Mock remote tool provider for testing
//!
//! Deterministic tool lists and per-tool responses, with optional failures
//! and delays, without any transport.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;

use super::normalize::RawResult;
use super::remote::RemoteToolProvider;
use crate::mcp::{McpError, McpResult};
use crate::types::{Tool, ToolArguments};

/// Configured outcome of a mock tool call
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return this payload
    Result(RawResult),
    /// Fail with a tool-call error
    Fail(String),
}

/// Mock remote provider
#[derive(Debug, Default)]
pub struct MockRemoteProvider {
    tools: Vec<Tool>,
    list_error: Option<String>,
    responses: HashMap<String, MockResponse>,
    delay: Option<Duration>,
    calls: Mutex<Vec<(String, ToolArguments)>>,
}

impl MockRemoteProvider {
    /// Create a provider with no tools
    pub fn new() -> Self {
        Self::default()
    }

    /// Advertise a tool
    pub fn with_tool(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.tools.push(Tool::new(name, description));
        self
    }

    /// Make `list_tools` fail
    pub fn failing_list(mut self, message: impl Into<String>) -> Self {
        self.list_error = Some(message.into());
        self
    }

    /// Return `result` when `name` is called
    pub fn respond(mut self, name: impl Into<String>, result: impl Into<RawResult>) -> Self {
        self.responses.insert(name.into(), MockResponse::Result(result.into()));
        self
    }

    /// Fail when `name` is called
    pub fn fail_call(mut self, name: impl Into<String>, message: impl Into<String>) -> Self {
        self.responses.insert(name.into(), MockResponse::Fail(message.into()));
        self
    }

    /// Delay every operation
    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay = Some(Duration::from_millis(delay_ms));
        self
    }

    /// Calls received so far, oldest first
    pub fn calls(&self) -> Vec<(String, ToolArguments)> {
        self.calls.lock().clone()
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl RemoteToolProvider for MockRemoteProvider {
    async fn list_tools(&self) -> McpResult<Vec<Tool>> {
        self.pause().await;
        match &self.list_error {
            Some(message) => Err(McpError::ConnectionFailed(message.clone())),
            None => Ok(self.tools.clone()),
        }
    }

    async fn call_tool(&self, name: &str, arguments: ToolArguments) -> McpResult<RawResult> {
        self.pause().await;
        self.calls.lock().push((name.to_string(), arguments));

        match self.responses.get(name) {
            Some(MockResponse::Result(result)) => Ok(result.clone()),
            Some(MockResponse::Fail(message)) => Err(McpError::ToolCallFailed(message.clone())),
            None => Ok(RawResult::Json(json!({
                "content": [{ "type": "text", "text": format!("{} called", name) }],
                "isError": false
            }))),
        }
    }
}
