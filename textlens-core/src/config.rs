//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/textlens/config.toml` once at
//! process start and treated as read-only for the process lifetime.
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/textlens/` (~/.config/textlens/)
//! - Data: `$XDG_DATA_HOME/textlens/` (~/.local/share/textlens/)
//! - State/Logs: `$XDG_STATE_HOME/textlens/` (~/.local/state/textlens/)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Environment variable consulted when the config file carries no API key.
pub const API_KEY_ENV: &str = "DEEPSEEK_API_KEY";

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Completion service configuration
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Record store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Completion service configuration.
///
/// The API key may live in the config file or in the [`API_KEY_ENV`]
/// environment variable; a request is never issued without one.
#[derive(Debug, Deserialize, Clone)]
pub struct CompletionConfig {
    /// API key for the completion service
    pub api_key: Option<String>,

    /// Service endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Hard wall-clock deadline for one completion call, in seconds
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_endpoint(),
            model: default_model(),
            deadline_secs: default_deadline_secs(),
        }
    }
}

fn default_endpoint() -> String {
    "https://api.deepseek.com".to_string()
}

fn default_model() -> String {
    "deepseek-chat".to_string()
}

fn default_deadline_secs() -> u64 {
    30
}

impl CompletionConfig {
    /// Resolve the API key from config or environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty()))
    }

    /// Validate configuration, returning an error if a request could not be
    /// issued with it. Checked before any network call.
    pub fn validate(&self) -> Result<()> {
        if self.resolve_api_key().is_none() {
            return Err(Error::Config(format!(
                "completion.api_key is not set (or export {})",
                API_KEY_ENV
            )));
        }
        if self.deadline_secs == 0 {
            return Err(Error::Config(
                "completion.deadline_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Record store configuration.
///
/// When disabled, persistence and history degrade to a non-fatal, empty
/// state; the analyze call is unaffected.
#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    /// Enable/disable local persistence of attempts
    #[serde(default = "default_store_enabled")]
    pub enabled: bool,

    /// Override for the database file path
    pub database_path: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            enabled: default_store_enabled(),
            database_path: None,
        }
    }
}

fn default_store_enabled() -> bool {
    true
}

impl StoreConfig {
    /// Check if the store should be opened at all
    pub fn is_ready(&self) -> bool {
        self.enabled
    }

    /// Effective database path (override or XDG default)
    pub fn effective_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(Config::database_path)
    }
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/textlens/config.toml` (~/.config/textlens/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("textlens").join("config.toml")
    }

    /// Returns the data directory path (for the SQLite database)
    ///
    /// `$XDG_DATA_HOME/textlens/` (~/.local/share/textlens/)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("textlens")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/textlens/` (~/.local/state/textlens/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("textlens")
    }

    /// Returns the database file path
    ///
    /// `$XDG_DATA_HOME/textlens/records.db` (~/.local/share/textlens/records.db)
    pub fn database_path() -> PathBuf {
        Self::data_dir().join("records.db")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/textlens/textlens.log` (~/.local/state/textlens/textlens.log)
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("textlens.log")
    }

    /// Ensure XDG base directory environment variables are set.
    ///
    /// This is mainly for CLI binaries that want explicit, stable path behavior
    /// before invoking other components that read these env vars.
    pub fn ensure_xdg_env() {
        let home = home_dir();

        if std::env::var("XDG_DATA_HOME").is_err() {
            std::env::set_var("XDG_DATA_HOME", home.join(".local/share"));
        }

        if std::env::var("XDG_STATE_HOME").is_err() {
            std::env::set_var("XDG_STATE_HOME", home.join(".local/state"));
        }

        if std::env::var("XDG_CONFIG_HOME").is_err() {
            std::env::set_var("XDG_CONFIG_HOME", home.join(".config"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.completion.api_key.is_none());
        assert_eq!(config.completion.endpoint, "https://api.deepseek.com");
        assert_eq!(config.completion.model, "deepseek-chat");
        assert_eq!(config.completion.deadline_secs, 30);
        assert!(config.store.enabled);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[completion]
api_key = "sk-test"
model = "deepseek-chat"
deadline_secs = 10

[store]
enabled = false

[logging]
level = "debug"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.completion.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.completion.deadline_secs, 10);
        assert!(!config.store.enabled);
        assert!(!config.store.is_ready());
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_completion_config_validation() {
        // No key anywhere should fail fast
        let config = CompletionConfig {
            api_key: None,
            ..Default::default()
        };
        if std::env::var(API_KEY_ENV).is_err() {
            assert!(config.validate().is_err());
        }

        // Key in config should pass
        let config = CompletionConfig {
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());

        // Zero deadline is rejected
        let config = CompletionConfig {
            api_key: Some("sk-test".to_string()),
            deadline_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_store_effective_path_override() {
        let config = StoreConfig {
            enabled: true,
            database_path: Some(PathBuf::from("/tmp/custom.db")),
        };
        assert_eq!(config.effective_path(), PathBuf::from("/tmp/custom.db"));
    }
}
