//! Client configuration.
//!
//! Every field has a default, so a TOML file only needs the values it
//! changes. Credentials are never read from this file.

use std::path::Path;

use serde::{Deserialize, Serialize};
use vodsdk_protocol::constants::DEFAULT_PART_SIZE;
use vodsdk_protocol::{Endpoint, Region, VodError};

/// Errors loading or validating a [`ClientConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("TOML encode error: {0}")]
    Encode(#[from] toml::ser::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl From<ConfigError> for VodError {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::Io(io) => VodError::Io(io),
            other => VodError::Param(other.to_string()),
        }
    }
}

/// Client settings shared by the transport and the upload engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Attempts per request, for both transport failures and retryable
    /// server replies.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Whole-request timeout.
    #[serde(default = "default_timeout_ms")]
    pub socket_timeout_ms: u64,

    #[serde(default = "default_max_idle_connections")]
    pub max_idle_connections: usize,

    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Sent with upload requests when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<Region>,

    /// Part size for chunked uploads, in bytes.
    #[serde(default = "default_part_size")]
    pub part_size: u64,

    /// Pause between transport attempts.
    #[serde(default)]
    pub retry_delay_ms: u64,

    #[serde(default = "Endpoint::api")]
    pub api_endpoint: Endpoint,

    #[serde(default = "Endpoint::upload")]
    pub upload_endpoint: Endpoint,
}

fn default_max_retries() -> u32 {
    3
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_max_idle_connections() -> usize {
    100
}

fn default_idle_timeout_ms() -> u64 {
    10 * 60 * 1000
}

fn default_user_agent() -> String {
    concat!("vodsdk/", env!("CARGO_PKG_VERSION")).into()
}

fn default_part_size() -> u64 {
    DEFAULT_PART_SIZE
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            connect_timeout_ms: default_timeout_ms(),
            socket_timeout_ms: default_timeout_ms(),
            max_idle_connections: default_max_idle_connections(),
            idle_timeout_ms: default_idle_timeout_ms(),
            user_agent: default_user_agent(),
            region: None,
            part_size: default_part_size(),
            retry_delay_ms: 0,
            api_endpoint: Endpoint::api(),
            upload_endpoint: Endpoint::upload(),
        }
    }
}

impl ClientConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ClientConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates the TOML file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Writes the configuration to `path` as TOML.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_retries == 0 {
            return Err(ConfigError::Invalid("max_retries must be at least 1".into()));
        }
        if self.part_size == 0 {
            return Err(ConfigError::Invalid("part_size must be positive".into()));
        }
        if self.api_endpoint.host.is_empty() || self.upload_endpoint.host.is_empty() {
            return Err(ConfigError::Invalid("endpoint host is empty".into()));
        }
        Ok(())
    }
}
