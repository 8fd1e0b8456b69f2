//! HomeGPT Core
//!
//! Tool orchestration and resilience for a natural-language home assistant.
//! Tools come from an in-process device provider and any number of MCP
//! servers; a language-model planner picks which to call, and every command
//! runs under a bounded retry policy with optional self-validation.
//!
//! ## Command execution
//!
//! ```rust,ignore
//! use homegpt_core::{CommandExecutor, CommandRequest, ConfigFile, ConsoleLogger};
//!
//! let config = ConfigFile::user().load()?;
//! let executor = CommandExecutor::from_config(&config, Arc::new(ConsoleLogger::new())).await?;
//!
//! let response = executor
//!     .execute(&CommandRequest::new("Turn on the kitchen lights", devices))
//!     .await;
//!
//! // Side effects for the device layer
//! for action in &response.actions { /* ... */ }
//! ```

pub mod types;
pub mod logging;
pub mod config;
pub mod trace;
pub mod tools;
pub mod mcp;
pub mod planner;
pub mod command;
pub mod cleanup;

// Re-export commonly used types
pub use types::{
    ChatMessage, ContentPart, MessageRole, MessageContent,
    Tool, ToolArguments, ToolCall, ToolDescriptor, ToolSource,
    Device, DeviceAction,
    CancellationToken,
};

pub use logging::{Logger, NoOpLogger, ConsoleLogger, MemoryLogger};

pub use config::{
    AssistantConfig, ConfigError, ConfigFile, ConfigResult,
    McpServerConfig, McpTransport, PlannerSettings, ResilienceSettings,
};

pub use trace::{TraceEvent, TraceKind, TraceLog};

pub use tools::{
    ConnectionSet, LocalToolProvider, RawResult, RemoteToolProvider, ToolRegistry,
    normalize, NO_CONTENT,
};

// MCP client using official rmcp SDK
pub use mcp::{McpClient, McpError, McpResult, connect_servers};

pub use planner::{
    GenaiPlanner, MockPlanner, Planner, PlannerError, PlannerRequest, PlannerResult, PlannerTurn,
    describe_api_error,
};

pub use command::{
    CommandExecutor, CommandRequest, CommandResponse, ExecutionContext, ExecutionError,
    PlannerJudge, Validator, Verdict,
};

pub use cleanup::{clean_json_actions, parse_device_actions};
