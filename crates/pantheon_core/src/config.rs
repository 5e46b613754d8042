//! Runtime configuration for processes hosting the pantheon store.
//!
//! # Responsibility
//! - Load optional TOML config with per-field defaults.
//! - Apply the `PANTHEON_DB_PATH` environment override.
//!
//! # Invariants
//! - Without a config path, defaults apply.
//! - A config path given explicitly must exist.
//! - `busy_timeout_ms` is in `1..=MAX_BUSY_TIMEOUT_MS`.

use crate::db::{DbOptions, MAX_BUSY_TIMEOUT_MS};
use crate::logging::default_log_level;
use crate::service::resolve::{ResolveOptions, DEFAULT_RESOLVE_DEPTH};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding `db_path`.
pub const DB_PATH_ENV: &str = "PANTHEON_DB_PATH";
const DEFAULT_DB_FILE_NAME: &str = "pantheon.sqlite3";
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config `{}`: {source}", path.display())
            }
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PantheonConfig {
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    #[serde(default = "default_level")]
    pub log_level: String,
    /// Absolute directory for rolling log files; logging is off when unset.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    #[serde(default = "default_depth")]
    pub default_depth: u32,
}

impl Default for PantheonConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            log_level: default_level(),
            log_dir: None,
            busy_timeout_ms: default_busy_timeout_ms(),
            default_depth: default_depth(),
        }
    }
}

impl PantheonConfig {
    /// Parses config text and validates field ranges.
    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Replaces `db_path` with a non-blank override value.
    pub fn with_db_path_override(mut self, value: Option<String>) -> Self {
        if let Some(raw) = value {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                self.db_path = PathBuf::from(trimmed);
            }
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.busy_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "busy_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.busy_timeout_ms > MAX_BUSY_TIMEOUT_MS {
            return Err(ConfigError::Invalid(format!(
                "busy_timeout_ms must not exceed {MAX_BUSY_TIMEOUT_MS}"
            )));
        }
        if self.db_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("db_path cannot be empty".to_string()));
        }
        Ok(())
    }

    pub fn db_options(&self) -> DbOptions {
        DbOptions {
            busy_timeout: Duration::from_millis(self.busy_timeout_ms),
        }
    }

    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions::with_depth(Some(self.default_depth))
    }
}

/// Loads config from an optional file, then applies the env override.
pub fn load_config(path: Option<&Path>) -> Result<PantheonConfig, ConfigError> {
    let config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            PantheonConfig::from_toml_str(&text, path)?
        }
        None => PantheonConfig::default(),
    };
    Ok(config.with_db_path_override(std::env::var(DB_PATH_ENV).ok()))
}

fn default_db_path() -> PathBuf {
    PathBuf::from(DEFAULT_DB_FILE_NAME)
}

fn default_level() -> String {
    default_log_level().to_string()
}

fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

fn default_depth() -> u32 {
    u32::from(DEFAULT_RESOLVE_DEPTH)
}
