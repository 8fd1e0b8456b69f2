//! MCP client using the official rmcp SDK
//!
//! Connects to MCP servers over Unix socket or HTTP and exposes them as
//! remote tool providers.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use rmcp::{
    ServiceExt,
    model::{CallToolRequestParams, CallToolResult, ClientCapabilities, ClientInfo, Implementation},
    service::RunningService,
    RoleClient,
};
use thiserror::Error;

#[cfg(unix)]
use tokio::net::UnixStream;

use crate::logging::Logger;
use crate::tools::{RawResult, RemoteToolProvider};
use crate::types::{Tool, ToolArguments};

/// MCP client errors
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Tool call failed: {0}")]
    ToolCallFailed(String),

    #[error("MCP server '{0}' not found")]
    ServerNotFound(String),

    #[error("Timed out after {0} ms")]
    Timeout(u64),

    #[error("Call cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),
}

pub type McpResult<T> = Result<T, McpError>;

/// MCP client for one external tool server
pub struct McpClient {
    /// Connection id, used in logs
    id: String,
    /// The underlying rmcp running service
    client: RunningService<RoleClient, ClientInfo>,
    /// Logger
    logger: Arc<dyn Logger>,
}

fn client_info() -> ClientInfo {
    ClientInfo {
        meta: None,
        protocol_version: Default::default(),
        capabilities: ClientCapabilities::default(),
        client_info: Implementation {
            name: "homegpt-core".to_string(),
            title: Some("HomeGPT".to_string()),
            version: env!("CARGO_PKG_VERSION").to_string(),
            website_url: None,
            icons: None,
        },
    }
}

impl McpClient {
    /// Connect to an MCP server over a Unix socket
    #[cfg(unix)]
    pub async fn connect_unix<P: AsRef<Path>>(
        id: impl Into<String>,
        socket_path: P,
        logger: Arc<dyn Logger>,
    ) -> McpResult<Self> {
        let id = id.into();
        let path = socket_path.as_ref();
        logger.info(&format!("[McpClient] {}: connecting to Unix socket {:?}", id, path));

        let stream = UnixStream::connect(path)
            .await
            .map_err(|e| McpError::ConnectionFailed(e.to_string()))?;

        let client = client_info()
            .serve(stream)
            .await
            .map_err(|e| McpError::InitializationFailed(e.to_string()))?;

        logger.info(&format!("[McpClient] {}: connected and initialized", id));

        Ok(Self { id, client, logger })
    }

    /// Connect to an MCP server over HTTP (Streamable HTTP transport)
    pub async fn connect_http(
        id: impl Into<String>,
        url: &str,
        logger: Arc<dyn Logger>,
    ) -> McpResult<Self> {
        use rmcp::transport::StreamableHttpClientTransport;

        let id = id.into();
        logger.info(&format!("[McpClient] {}: connecting to HTTP {}", id, url));

        let transport = StreamableHttpClientTransport::from_uri(url);

        let client = client_info()
            .serve(transport)
            .await
            .map_err(|e| McpError::InitializationFailed(e.to_string()))?;

        logger.info(&format!("[McpClient] {}: connected and initialized", id));

        Ok(Self { id, client, logger })
    }

    /// Connection id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get server info
    pub fn server_info(&self) -> Option<&Implementation> {
        self.client.peer_info().map(|info| &info.server_info)
    }

    /// Close the connection
    pub async fn close(self) -> McpResult<()> {
        self.logger.info(&format!("[McpClient] {}: closing connection", self.id));
        self.client
            .cancel()
            .await
            .map_err(|e| McpError::Protocol(e.to_string()))?;
        Ok(())
    }
}

/// Convert an rmcp tool into the planner-facing tool definition
pub fn tool_from_mcp(tool: rmcp::model::Tool) -> Tool {
    Tool {
        name: tool.name.to_string(),
        description: tool.description.map(|s| s.to_string()).unwrap_or_default(),
        // input_schema is Arc<JsonObject>, convert to Value
        input_schema: serde_json::to_value(tool.input_schema.as_ref()).ok(),
    }
}

/// Keep the MCP result in its JSON form for the normalizer
pub fn raw_from_mcp(result: CallToolResult) -> RawResult {
    match serde_json::to_value(&result) {
        Ok(value) => RawResult::Json(value),
        Err(e) => RawResult::Text(format!("Unreadable MCP result: {}", e)),
    }
}

#[async_trait]
impl RemoteToolProvider for McpClient {
    async fn list_tools(&self) -> McpResult<Vec<Tool>> {
        let result = self
            .client
            .list_tools(Default::default())
            .await
            .map_err(|e| McpError::Protocol(e.to_string()))?;

        self.logger.info(&format!(
            "[McpClient] {}: listed {} tools",
            self.id,
            result.tools.len()
        ));

        Ok(result.tools.into_iter().map(tool_from_mcp).collect())
    }

    async fn call_tool(&self, name: &str, arguments: ToolArguments) -> McpResult<RawResult> {
        self.logger.info(&format!("[McpClient] {}: calling tool {}", self.id, name));

        let params = CallToolRequestParams {
            meta: None,
            name: name.to_owned().into(),
            arguments: Some(arguments),
            task: None,
        };

        let result = self
            .client
            .call_tool(params)
            .await
            .map_err(|e| McpError::ToolCallFailed(e.to_string()))?;

        Ok(raw_from_mcp(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::normalize;
    use rmcp::model::Content;

    #[test]
    fn test_tool_from_mcp() {
        let schema = serde_json::json!({
            "type": "object",
            "properties": { "query": { "type": "string" } }
        });
        let mcp_tool: rmcp::model::Tool = serde_json::from_value(serde_json::json!({
            "name": "search",
            "description": "Search DuckDuckGo",
            "inputSchema": schema
        }))
        .unwrap();

        let tool = tool_from_mcp(mcp_tool);
        assert_eq!(tool.name, "search");
        assert_eq!(tool.description, "Search DuckDuckGo");
        assert_eq!(tool.input_schema.unwrap()["properties"]["query"]["type"], "string");
    }

    #[test]
    fn test_mcp_result_normalizes_to_text() {
        let result = CallToolResult::success(vec![Content::text("A"), Content::text("B")]);
        assert_eq!(normalize(&raw_from_mcp(result)), "A\nB");

        let failed = CallToolResult::error(vec![Content::text("upstream down")]);
        let raw = raw_from_mcp(failed);
        assert!(raw.is_error());
        assert_eq!(normalize(&raw), "upstream down");
    }
}
