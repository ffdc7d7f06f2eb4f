//! Configuration module for ShutterSync.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, validation, and defaults. The session section carries a
//! provisioned token and identity; the interactive login flow that produces
//! them is outside this system.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::Identity;

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for ShutterSync.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub sync: SyncConfig,
    pub api: ApiConfig,
    pub logging: LoggingConfig,
    pub session: SessionConfig,
}

/// Folder-watch and queue timing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Folder to watch on startup. `None` until the user selects one.
    pub folder: Option<PathBuf>,
    /// Milliseconds of idle time between the first buffered event and the drain.
    pub drain_idle_ms: u64,
    /// Milliseconds between consecutive items within a drain.
    pub action_delay_ms: u64,
    /// Timeout budget in milliseconds for remote deletions.
    pub delete_timeout_ms: u64,
    /// Path of the upload-ledger file (digest -> upload record).
    pub ledger_file: PathBuf,
}

/// Remote API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the event-photo service.
    pub base_url: String,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

/// Provisioned session settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Bearer token for the API. `None` until provisioned.
    pub token: Option<String>,
    /// Configured identity (user, event, company, permission, frames).
    pub identity: Option<Identity>,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/shuttersync/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("shuttersync")
            .join("config.yaml")
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            folder: None,
            drain_idle_ms: 500,
            action_delay_ms: 1000,
            delete_timeout_ms: 5000,
            ledger_file: dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("~/.local/share"))
                .join("shuttersync")
                .join("uploaded_photos.json"),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.samambaialabs.com.br".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"sync.action_delay_ms"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.sync.delete_timeout_ms == 0 {
            errors.push(ValidationError {
                field: "sync.delete_timeout_ms".into(),
                message: "must be greater than 0".into(),
            });
        }

        if self.api.base_url.is_empty() {
            errors.push(ValidationError {
                field: "api.base_url".into(),
                message: "must not be empty".into(),
            });
        }

        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}', expected one of {:?}",
                    self.logging.level, VALID_LOG_LEVELS
                ),
            });
        }

        if let Some(identity) = &self.session.identity {
            if !identity.is_complete() {
                errors.push(ValidationError {
                    field: "session.identity".into(),
                    message: "user_id, event_id, and company_id must all be set".into(),
                });
            }
        }

        errors
    }
}
