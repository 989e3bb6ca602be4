//! Configuration for gallery-sync.
//!
//! Loaded from a TOML file (default: `config.toml` in the platform config
//! directory). Every key is optional; command-line flags override the file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use sync_client::{ErrorPolicy, SyncConfig, DEFAULT_CONCURRENCY};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Sync pass settings.
    #[serde(default)]
    pub sync: SyncSection,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Sync pass settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSection {
    /// Operations dispatched at once (default: 4).
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// `"abort"` or `"continue"` (default: abort).
    #[serde(default)]
    pub error_policy: ErrorPolicy,
    /// Abandon a pass after this many seconds (default: no limit).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSection {
    /// Filter used when `RUST_LOG` is unset (default: info).
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions
fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            error_policy: ErrorPolicy::default(),
            timeout_secs: None,
        }
    }
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Load an explicitly given file, or the default file if it exists,
    /// or fall back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match default_config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Write this configuration as TOML, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let write_error = |source| ConfigError::WriteError {
            path: path.to_path_buf(),
            source,
        };
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }
        std::fs::write(path, content).map_err(write_error)
    }

    /// Synchronizer settings derived from the file.
    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig::default()
            .with_concurrency(self.sync.concurrency)
            .with_error_policy(self.sync.error_policy)
    }
}

/// Default config file location (`<config dir>/config.toml`).
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("io", "ydun", "gallery-sync")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
    /// Failed to write configuration file.
    #[error("failed to write config file {path}: {source}")]
    WriteError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to render configuration as TOML.
    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
}
