//! Logging initialization built on `tracing-subscriber`.
//!
//! The accessor crates only emit `tracing` events and work with no
//! subscriber installed; this module is for binaries and tests that want
//! one. Level and format are explicit configuration, overridable through
//! the `STOREKIT_LOG` environment variable (an `EnvFilter` directive).

use crate::error::{Result, StoreError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Environment variable holding an `EnvFilter` directive override
pub const ENV_LOG: &str = "STOREKIT_LOG";

/// Log verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Get the level name as a filter directive
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(StoreError::config(format!(
                "invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                s
            ))),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output for development
    Pretty,
    /// Structured JSON lines for log shipping
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: LogLevel,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Pretty,
        }
    }
}

impl LogConfig {
    /// Config with the given level and the default format
    pub fn with_level(level: LogLevel) -> Self {
        Self {
            level,
            ..Self::default()
        }
    }

    /// Switch to JSON output
    pub fn json(mut self) -> Self {
        self.format = LogFormat::Json;
        self
    }
}

/// Install a global `tracing` subscriber according to `config`.
///
/// The `STOREKIT_LOG` environment variable, when set, takes precedence over
/// the configured level. Returns an error when a subscriber is already
/// installed.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_env(ENV_LOG)
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    let registry = tracing_subscriber::registry().with(filter);
    let installed = match config.format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .try_init(),
    };

    installed.map_err(|e| StoreError::config(format!("failed to install logger: {}", e)))?;
    tracing::debug!(level = config.level.as_str(), "logging initialized");
    Ok(())
}
