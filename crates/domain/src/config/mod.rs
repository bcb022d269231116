mod api;
mod chat;
mod logging;
mod storage;

pub use api::*;
pub use chat::*;
pub use logging::*;
pub use storage::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.api.base_url.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "api.base_url".into(),
                message: "base_url must not be empty".into(),
            });
        } else if !self.api.base_url.starts_with("http://")
            && !self.api.base_url.starts_with("https://")
        {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "api.base_url".into(),
                message: "base_url must start with http:// or https://".into(),
            });
        } else if self.api.base_url.starts_with("http://")
            && !is_loopback_url(&self.api.base_url)
        {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "api.base_url".into(),
                message: "bearer tokens will be sent over plain HTTP".into(),
            });
        }

        if self.api.timeout_ms == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "api.timeout_ms".into(),
                message: "timeout must be greater than 0".into(),
            });
        }

        if self.api.stream_timeout_ms < self.api.timeout_ms {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "api.stream_timeout_ms".into(),
                message: "stream timeout is shorter than the request timeout; \
                          long replies may be cut off"
                    .into(),
            });
        }

        if self.chat.max_audio_bytes == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "chat.max_audio_bytes".into(),
                message: "audio size limit must be greater than 0".into(),
            });
        }

        if let Some(model) = &self.chat.model {
            if model.trim().is_empty() {
                errors.push(ConfigError {
                    severity: ConfigSeverity::Warning,
                    field: "chat.model".into(),
                    message: "empty model name; the server default will be used".into(),
                });
            }
        }

        if !self.storage.in_memory && self.storage.resolved_path().is_none() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "storage.path".into(),
                message: "no storage path configured and no home directory found".into(),
            });
        }

        errors
    }
}

fn is_loopback_url(url: &str) -> bool {
    let rest = url
        .trim_start_matches("http://")
        .trim_start_matches("https://");
    rest.starts_with("localhost") || rest.starts_with("127.0.0.1") || rest.starts_with("[::1]")
}
