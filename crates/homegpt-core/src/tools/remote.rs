//! Remote tool provider capability

use async_trait::async_trait;

use super::normalize::RawResult;
use crate::mcp::McpResult;
use crate::types::{Tool, ToolArguments};

/// A tool provider reached through an external connection
///
/// How the connection was established (socket, HTTP, child process) is not
/// visible here. Both operations may fail independently per provider with
/// transport, timeout or protocol errors.
#[async_trait]
pub trait RemoteToolProvider: Send + Sync {
    /// List the tools this provider advertises
    async fn list_tools(&self) -> McpResult<Vec<Tool>>;

    /// Call a tool by name
    async fn call_tool(&self, name: &str, arguments: ToolArguments) -> McpResult<RawResult>;
}
