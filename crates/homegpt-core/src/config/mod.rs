//! Configuration
//!
//! - `AssistantConfig`: planner, resilience and MCP server settings
//! - `ConfigFile`: YAML file storage (user level or explicit path)

mod error;
mod settings;
mod file;

pub use error::{ConfigError, ConfigResult};
pub use settings::{AssistantConfig, McpServerConfig, McpTransport, PlannerSettings, ResilienceSettings};
pub use file::ConfigFile;
