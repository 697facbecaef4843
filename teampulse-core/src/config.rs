//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/teampulse/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/teampulse/` (~/.config/teampulse/)
//! - State/Logs: `$XDG_STATE_HOME/teampulse/` (~/.local/state/teampulse/)
//!
//! Only binaries read this file. The analytics engine itself is handed a
//! [`ProviderConfig`] value and never looks up credentials on its own.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

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

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Task-tracking provider credentials (optional)
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Task-tracking provider configuration
///
/// When both `access_token` and `workspace_id` are set, the live provider
/// is used. Otherwise the engine serves the built-in deterministic dataset.
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// Personal access token for the task tracker
    pub access_token: Option<String>,

    /// Workspace whose members and tasks are analyzed
    pub workspace_id: Option<String>,

    /// REST API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            workspace_id: None,
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

impl ProviderConfig {
    /// Config with credentials set and everything else defaulted.
    pub fn with_credentials(access_token: impl Into<String>, workspace_id: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            workspace_id: Some(workspace_id.into()),
            ..Default::default()
        }
    }

    /// Check if both credentials are present and non-empty
    pub fn has_credentials(&self) -> bool {
        let present = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.is_empty());
        present(&self.access_token) && present(&self.workspace_id)
    }

    /// Credentials are present and the remaining settings are usable
    pub fn is_ready(&self) -> bool {
        self.validate().is_ok()
    }

    /// Validate credentials, returning a configuration error naming the missing one
    pub fn validate(&self) -> Result<()> {
        if self.access_token.as_deref().map_or(true, str::is_empty) {
            return Err(Error::Configuration(
                "provider.access_token is not set".to_string(),
            ));
        }
        if self.workspace_id.as_deref().map_or(true, str::is_empty) {
            return Err(Error::Configuration(
                "provider.workspace_id is not set".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config(
                "provider.timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    "https://app.asana.com/api/1.0".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level for teampulse itself (off, error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log level for the HTTP client crates
    #[serde(default = "default_transport_level")]
    pub transport_level: String,

    /// When to start a new log file
    #[serde(default)]
    pub rotation: LogRotation,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            transport_level: default_transport_level(),
            rotation: LogRotation::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_transport_level() -> String {
    "warn".to_string()
}

/// Log file rotation schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Hourly,
    #[default]
    Daily,
    Never,
}

impl LogRotation {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogRotation::Hourly => "hourly",
            LogRotation::Daily => "daily",
            LogRotation::Never => "never",
        }
    }
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
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/teampulse/config.toml` (~/.config/teampulse/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("teampulse").join("config.toml")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/teampulse/` (~/.local/state/teampulse/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("teampulse")
    }
}
