//! Merged tool registry over the local provider and remote connections
//!
//! The registry itself is read-only after construction. Everything a single
//! command learns (routing table, trace events, queued actions) goes into
//! that command's [`ExecutionContext`].

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use super::connections::ConnectionSet;
use super::local::LocalToolProvider;
use super::normalize::{normalize, RawResult};
use crate::command::ExecutionContext;
use crate::logging::Logger;
use crate::mcp::{McpError, McpResult};
use crate::trace::{TraceEvent, TraceKind};
use crate::types::{Tool, ToolArguments, ToolDescriptor, ToolSource};

/// Default per-call timeout for remote tools
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Registry unifying local and remote tools behind one dispatch surface
pub struct ToolRegistry {
    local: LocalToolProvider,
    connections: ConnectionSet,
    logger: Arc<dyn Logger>,
    call_timeout: Duration,
}

impl ToolRegistry {
    /// Create a registry over a connection set
    pub fn new(connections: ConnectionSet, logger: Arc<dyn Logger>) -> Self {
        Self {
            local: LocalToolProvider::new(),
            connections,
            logger,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Override the remote call timeout
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// The remote connections this registry dispatches to
    pub fn connections(&self) -> &ConnectionSet {
        &self.connections
    }

    /// Discover every tool available to this command
    ///
    /// Local tools come first, then each remote provider in connection-set
    /// order. A provider whose listing fails contributes no tools and one
    /// `Error` event. When two providers advertise the same name the later
    /// one wins. The resulting routing table is stored in `ctx`.
    pub async fn enumerate(&self, ctx: &ExecutionContext) -> Vec<ToolDescriptor> {
        let mut merged = Merge::default();

        for tool in self.local.list_tools(ctx) {
            merged.add(ctx, ToolDescriptor::from_tool(tool, ToolSource::Local));
        }

        let listings = join_all(self.connections.iter().map(|(id, provider)| {
            let provider = Arc::clone(provider);
            async move { (id, self.bounded(ctx, provider.list_tools()).await) }
        }))
        .await;

        for (id, listing) in listings {
            match listing {
                Ok(tools) => {
                    self.logger.debug(&format!(
                        "[ToolRegistry] Discovered {} tools from {}",
                        tools.len(),
                        id
                    ));
                    for tool in tools {
                        merged.add(ctx, ToolDescriptor::from_tool(tool, ToolSource::remote(id)));
                    }
                }
                Err(e) => {
                    self.logger
                        .warn(&format!("[ToolRegistry] Failed to load tools from {}: {}", id, e));
                    ctx.trace()
                        .error(format!("Failed to load tools from {}", id), e.to_string());
                }
            }
        }

        let descriptors = merged.finish();
        ctx.set_routes(
            descriptors
                .iter()
                .map(|d| (d.name.clone(), d.source.clone()))
                .collect(),
        );
        self.logger.info(&format!(
            "[ToolRegistry] {} tools available ({} remote providers)",
            descriptors.len(),
            self.connections.len()
        ));
        descriptors
    }

    /// Call a tool by name and return its normalized text
    ///
    /// Never fails: unknown names and provider errors come back as
    /// descriptive text, with an `Error` trace event.
    pub async fn dispatch(&self, ctx: &ExecutionContext, name: &str, arguments: &ToolArguments) -> String {
        let Some(source) = ctx.route(name) else {
            let message = format!("Tool '{}' not found in registry", name);
            ctx.trace().record(TraceKind::Error, message.clone());
            return message;
        };

        let qualified = format!("{}:{}", source, name);
        ctx.trace().push(
            TraceEvent::new(TraceKind::ToolCall, qualified.clone())
                .with_details(serde_json::Value::Object(arguments.clone()).to_string()),
        );

        let id = match source {
            ToolSource::Local => {
                let reply = self.local.invoke(ctx, name, arguments);
                return local_response(ctx, qualified, reply);
            }
            ToolSource::Remote(id) => id,
        };

        self.logger
            .debug(&format!("[ToolRegistry] Calling {} on {}", name, id));

        match self.call_remote(ctx, &id, name, arguments).await {
            Ok(raw) => {
                let text = normalize(&raw);
                if raw.is_error() {
                    ctx.trace()
                        .error(format!("Tool {} reported an error", qualified), text.clone());
                } else {
                    ctx.trace()
                        .record_with(TraceKind::ToolResponse, qualified, text.clone());
                }
                text
            }
            Err(e) => {
                self.logger
                    .warn(&format!("[ToolRegistry] Error calling tool {}: {}", qualified, e));
                ctx.trace()
                    .error(format!("Error calling MCP tool {}", qualified), e.to_string());
                format!("Error calling tool '{}': {}", name, e)
            }
        }
    }

    async fn call_remote(
        &self,
        ctx: &ExecutionContext,
        id: &str,
        name: &str,
        arguments: &ToolArguments,
    ) -> McpResult<RawResult> {
        let provider = self
            .connections
            .get(id)
            .ok_or_else(|| McpError::ServerNotFound(id.to_string()))?;

        self.bounded(ctx, provider.call_tool(name, arguments.clone())).await
    }

    /// Run a provider operation under the call timeout, racing cancellation
    async fn bounded<T>(
        &self,
        ctx: &ExecutionContext,
        operation: impl Future<Output = McpResult<T>>,
    ) -> McpResult<T> {
        if ctx.is_cancelled() {
            return Err(McpError::Cancelled);
        }

        tokio::select! {
            result = tokio::time::timeout(self.call_timeout, operation) => match result {
                Ok(result) => result,
                Err(_) => Err(McpError::Timeout(self.call_timeout.as_millis() as u64)),
            },
            _ = ctx.cancel_token().cancelled() => Err(McpError::Cancelled),
        }
    }

    /// Planner-facing definitions of enumerated tools
    pub fn llm_tools(descriptors: &[ToolDescriptor]) -> Vec<Tool> {
        descriptors.iter().map(Tool::from).collect()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("connections", &self.connections)
            .field("call_timeout", &self.call_timeout)
            .finish()
    }
}

/// Normalize and trace a local tool reply the same way as a remote one
fn local_response(ctx: &ExecutionContext, qualified: String, reply: String) -> String {
    let text = normalize(&RawResult::Text(reply));
    ctx.trace()
        .record_with(TraceKind::ToolResponse, qualified, text.clone());
    text
}

/// Name-keyed merge where later descriptors replace earlier ones in place
#[derive(Default)]
struct Merge {
    descriptors: Vec<ToolDescriptor>,
    index: HashMap<String, usize>,
}

impl Merge {
    fn add(&mut self, ctx: &ExecutionContext, descriptor: ToolDescriptor) {
        ctx.trace().record_with(
            TraceKind::ToolAvailable,
            descriptor.qualified_name(),
            descriptor.description.clone(),
        );

        match self.index.get(&descriptor.name) {
            Some(&slot) => {
                let previous = &self.descriptors[slot];
                ctx.trace().error(
                    format!("Tool name collision: {}", descriptor.name),
                    format!("{} replaced by {}", previous.source, descriptor.source),
                );
                self.descriptors[slot] = descriptor;
            }
            None => {
                self.index.insert(descriptor.name.clone(), self.descriptors.len());
                self.descriptors.push(descriptor);
            }
        }
    }

    fn finish(self) -> Vec<ToolDescriptor> {
        self.descriptors
    }
}
