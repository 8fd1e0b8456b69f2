//! File-based configuration (YAML)
//!
//! The user-level file lives at `<config_dir>/homegpt/config.yaml`.

use std::fs;
use std::path::{Path, PathBuf};

use super::error::ConfigResult;
use super::settings::AssistantConfig;

/// YAML configuration file
///
/// # Example
///
/// ```no_run
/// use homegpt_core::config::ConfigFile;
///
/// let file = ConfigFile::user();
/// let config = file.load().unwrap();
/// assert!(config.resilience.max_attempts >= 1);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigFile {
    path: PathBuf,
}

impl ConfigFile {
    /// Config file at a specific path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// User-level config file
    pub fn user() -> Self {
        // XDG config directory (~/.config on Linux, ~/Library/Application Support on macOS)
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".config"));
        Self::new(config_dir.join("homegpt").join("config.yaml"))
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if the config file exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load and validate the config; a missing file yields the defaults
    pub fn load(&self) -> ConfigResult<AssistantConfig> {
        if !self.path.exists() {
            return Ok(AssistantConfig::default());
        }

        let content = fs::read_to_string(&self.path)?;
        let config: AssistantConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate and write the config, creating parent directories
    pub fn save(&self, config: &AssistantConfig) -> ConfigResult<()> {
        config.validate()?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(config)?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    /// Export the config as pretty JSON
    pub fn export_json(&self) -> ConfigResult<String> {
        let config = self.load()?;
        Ok(serde_json::to_string_pretty(&config)?)
    }

    /// Import a JSON config and save it as YAML
    pub fn import_json(&self, json: &str) -> ConfigResult<()> {
        let config: AssistantConfig = serde_json::from_str(json)?;
        self.save(&config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigError, McpServerConfig, McpTransport};
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let file = ConfigFile::new(dir.path().join("config.yaml"));
        assert!(!file.exists());
        assert_eq!(file.load().unwrap(), AssistantConfig::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let file = ConfigFile::new(dir.path().join("nested").join("config.yaml"));

        let mut config = AssistantConfig::default();
        config.resilience.self_validation = true;
        config.servers.push(McpServerConfig::http("duckduckgo", "http://localhost:8080/mcp"));
        file.save(&config).unwrap();

        assert!(file.exists());
        let content = fs::read_to_string(file.path()).unwrap();
        assert!(content.contains("duckduckgo"));
        assert!(content.contains("self_validation: true"));
        assert_eq!(file.load().unwrap(), config);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            "servers:\n  - id: hass-proxy\n    transport: sse\n    endpoint: http://hass:8080/mcp\n",
        )
        .unwrap();

        let config = ConfigFile::new(&path).load().unwrap();
        assert_eq!(config.resilience.max_attempts, 3);
        assert_eq!(config.servers[0].transport, McpTransport::Http);
        assert!(config.servers[0].enabled);
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "resilience: [not, a, map]").unwrap();
        assert!(matches!(ConfigFile::new(&path).load(), Err(ConfigError::Yaml(_))));

        fs::write(&path, "resilience:\n  max_attempts: 0\n").unwrap();
        assert!(matches!(ConfigFile::new(&path).load(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_json_round_trip() {
        let dir = tempdir().unwrap();
        let file = ConfigFile::new(dir.path().join("config.yaml"));
        file.import_json(r#"{"resilience": {"max_attempts": 5}}"#).unwrap();

        let json = file.export_json().unwrap();
        assert!(json.contains("\"max_attempts\": 5"));
    }
}
