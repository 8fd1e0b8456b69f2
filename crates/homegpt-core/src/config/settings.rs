//! Assistant configuration values

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::{ConfigError, ConfigResult};

/// Complete configuration of one assistant instance
///
/// Threaded explicitly into planner, registry and executor construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Chat-completion endpoint settings
    #[serde(default)]
    pub planner: PlannerSettings,
    /// Retry and validation policy
    #[serde(default)]
    pub resilience: ResilienceSettings,
    /// External MCP servers
    #[serde(default)]
    pub servers: Vec<McpServerConfig>,
}

impl AssistantConfig {
    /// Check value ranges and server ids
    pub fn validate(&self) -> ConfigResult<()> {
        if self.resilience.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "resilience.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.resilience.max_tool_rounds == 0 {
            return Err(ConfigError::Invalid(
                "resilience.max_tool_rounds must be at least 1".to_string(),
            ));
        }
        if self.planner.model.trim().is_empty() {
            return Err(ConfigError::Invalid("planner.model is empty".to_string()));
        }

        let mut seen = HashSet::new();
        for server in &self.servers {
            if server.id.trim().is_empty() {
                return Err(ConfigError::Invalid("server id is empty".to_string()));
            }
            if !seen.insert(server.id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate server id: {}",
                    server.id
                )));
            }
        }
        Ok(())
    }

    /// Servers that should be connected
    pub fn enabled_servers(&self) -> impl Iterator<Item = &McpServerConfig> {
        self.servers.iter().filter(|s| s.enabled)
    }
}

/// Chat-completion endpoint settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerSettings {
    /// Provider id, e.g. "openai-compatible", "openai", "ollama"
    #[serde(default = "default_provider")]
    pub provider: String,
    /// API base URL (OpenAI-compatible servers such as LM Studio)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,
    /// Explicit API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Environment variable holding the API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens per planner turn
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_provider() -> String {
    "openai-compatible".to_string()
}

fn default_model() -> String {
    "qwen/qwen3-coder-30b".to_string()
}

fn default_temperature() -> f32 {
    0.6
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            endpoint: Some("http://localhost:1234/v1/".to_string()),
            model: default_model(),
            api_key: None,
            api_key_env: None,
            temperature: default_temperature(),
            max_tokens: None,
        }
    }
}

impl PlannerSettings {
    /// Explicit key, else the configured environment variable
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key.clone().filter(|k| !k.is_empty()).or_else(|| {
            self.api_key_env
                .as_deref()
                .and_then(|var| std::env::var(var).ok())
                .filter(|k| !k.is_empty())
        })
    }
}

/// Retry and validation policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResilienceSettings {
    /// Total attempts per command
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
    /// Ask a second, independent yes/no judgment of each answer
    #[serde(default)]
    pub self_validation: bool,
    /// Planner turns per attempt before the attempt is abandoned
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: usize,
    /// Timeout for each remote provider call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_timeout_secs: Option<u64>,
}

fn default_max_attempts() -> usize {
    3
}

fn default_max_tool_rounds() -> usize {
    8
}

impl Default for ResilienceSettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            self_validation: false,
            max_tool_rounds: default_max_tool_rounds(),
            tool_timeout_secs: None,
        }
    }
}

impl ResilienceSettings {
    /// Remote call timeout as a duration
    pub fn tool_timeout(&self) -> Option<Duration> {
        self.tool_timeout_secs.map(Duration::from_secs)
    }
}

/// How an MCP server is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum McpTransport {
    /// Streamable HTTP endpoint
    #[serde(alias = "sse")]
    Http,
    /// Unix domain socket path
    Unix,
}

/// One external MCP server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpServerConfig {
    /// Connection id, also the provider id in the registry
    pub id: String,
    /// Whether to connect at startup
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Transport kind
    pub transport: McpTransport,
    /// URL for HTTP, socket path for Unix
    pub endpoint: String,
}

fn default_enabled() -> bool {
    true
}

impl McpServerConfig {
    /// Create an HTTP server entry
    pub fn http(id: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            enabled: true,
            transport: McpTransport::Http,
            endpoint: endpoint.into(),
        }
    }

    /// Create a Unix socket server entry
    pub fn unix(id: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            enabled: true,
            transport: McpTransport::Unix,
            endpoint: path.into(),
        }
    }

    /// Disable the server
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AssistantConfig::default();
        assert_eq!(config.resilience.max_attempts, 3);
        assert!(!config.resilience.self_validation);
        assert_eq!(config.planner.provider, "openai-compatible");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AssistantConfig::default();
        config.resilience.max_attempts = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = AssistantConfig::default();
        config.servers = vec![
            McpServerConfig::http("duckduckgo", "http://localhost:8080/mcp"),
            McpServerConfig::unix("duckduckgo", "/tmp/ddg.sock"),
        ];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate server id"));
    }

    #[test]
    fn test_enabled_servers() {
        let mut config = AssistantConfig::default();
        config.servers = vec![
            McpServerConfig::http("duckduckgo", "http://localhost:8080/mcp"),
            McpServerConfig::http("youtube", "http://localhost:8081/mcp").disabled(),
        ];
        let ids: Vec<_> = config.enabled_servers().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["duckduckgo"]);
    }

    #[test]
    fn test_api_key_resolution() {
        let settings = PlannerSettings {
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        };
        assert_eq!(settings.resolve_api_key(), Some("sk-test".to_string()));

        let settings = PlannerSettings {
            api_key_env: Some("HOMEGPT_TEST_KEY_THAT_IS_NOT_SET".to_string()),
            ..Default::default()
        };
        assert_eq!(settings.resolve_api_key(), None);
    }
}
