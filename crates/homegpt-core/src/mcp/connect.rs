//! Builds the connection set from configured MCP servers

use std::sync::Arc;

use super::client::{McpClient, McpError, McpResult};
use crate::config::{McpServerConfig, McpTransport};
use crate::logging::Logger;
use crate::tools::ConnectionSet;

/// Connect one configured server
pub async fn connect_server(
    server: &McpServerConfig,
    logger: Arc<dyn Logger>,
) -> McpResult<McpClient> {
    match server.transport {
        McpTransport::Http => McpClient::connect_http(&server.id, &server.endpoint, logger).await,
        #[cfg(unix)]
        McpTransport::Unix => McpClient::connect_unix(&server.id, &server.endpoint, logger).await,
        #[cfg(not(unix))]
        McpTransport::Unix => Err(McpError::ConnectionFailed(
            "Unix sockets are not supported on this platform".to_string(),
        )),
    }
}

/// Connect every enabled server
///
/// Servers that fail to connect are logged and left out; one bad server
/// never prevents the others from joining the set.
pub async fn connect_servers(servers: &[McpServerConfig], logger: Arc<dyn Logger>) -> ConnectionSet {
    let mut set = ConnectionSet::new();

    for server in servers.iter().filter(|s| s.enabled) {
        match connect_server(server, Arc::clone(&logger)).await {
            Ok(client) => set.insert(server.id.clone(), Arc::new(client)),
            Err(e) => log_connect_failure(logger.as_ref(), &server.id, &e),
        }
    }

    logger.info(&format!(
        "[McpClient] {} of {} configured servers connected",
        set.len(),
        servers.len()
    ));
    set
}

fn log_connect_failure(logger: &dyn Logger, id: &str, error: &McpError) {
    logger.warn(&format!(
        "[McpClient] Failed to create MCP client for server {}: {}",
        id, error
    ));
}
