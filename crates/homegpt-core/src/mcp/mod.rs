//! MCP (Model Context Protocol) client module
//!
//! Uses the official rmcp SDK to connect to external tool servers.
//! Supports Unix socket and HTTP transports. Connected clients implement
//! [`crate::tools::RemoteToolProvider`] and are collected into a
//! [`crate::tools::ConnectionSet`].
//!
//! # Example
//!
//! ```rust,ignore
//! use homegpt_core::mcp::connect_servers;
//!
//! let config = ConfigFile::user().load()?;
//! let connections = connect_servers(&config.servers, logger.clone()).await;
//! let registry = ToolRegistry::new(connections, logger);
//! ```

mod client;
mod connect;

pub use client::{McpClient, McpError, McpResult, raw_from_mcp, tool_from_mcp};
pub use connect::{connect_server, connect_servers};
