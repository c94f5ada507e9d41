//! Configuration for the confab client.
//!
//! The endpoint is an explicit value handed to the engine at construction
//! time; resolving it from the environment is the binary's job, never the
//! engine's.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base address of the answering service.
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Path of the ask endpoint on the backend (deployments vary between
    /// `/ask` and `/api/ask`).
    #[serde(default = "default_ask_path")]
    pub ask_path: String,

    /// Upper bound on how long one request may stay outstanding.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_backend_url() -> String {
    "http://localhost:5001".into()
}

fn default_ask_path() -> String {
    "/ask".into()
}

fn default_timeout_seconds() -> u64 {
    30
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Parse)
    }

    /// Save configuration to a JSON file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        std::fs::write(path, content).map_err(ConfigError::Io)
    }

    /// Full URL of the ask endpoint.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}",
            self.backend_url.trim_end_matches('/'),
            self.ask_path.trim_start_matches('/')
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            ask_path: default_ask_path(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Errors that can occur when working with configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading or writing config.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing config JSON.
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),

    /// Error serializing config to JSON.
    #[error("Serialize error: {0}")]
    Serialize(#[source] serde_json::Error),
}
