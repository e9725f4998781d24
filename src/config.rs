//! Server configuration
//!
//! Loaded from the environment at startup:
//!
//! | Variable      | Default      | Meaning                            |
//! |---------------|--------------|------------------------------------|
//! | `PORT`        | `4010`       | TCP port to listen on              |
//! | `RATE_LIMIT`  | `60`         | Requests per minute, all clients   |
//! | `REGIONS_CSV` | `cities.csv` | Geography catalog file             |
//! | `LOG_FORMAT`  | `text`       | `text` or `json` log output        |

use std::env;
use std::path::PathBuf;

use crate::core::{GrantError, GrantResult};

pub const DEFAULT_PORT: u16 = 4010;
pub const DEFAULT_RATE_LIMIT: u32 = 60;
pub const DEFAULT_REGIONS_CSV: &str = "cities.csv";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = GrantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(GrantError::InvalidConfig(format!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                other
            ))),
        }
    }
}

/// HTTP server configuration
///
/// ```ignore
/// let config = ServerConfig::from_env()?
///     .with_port(8080)
///     .with_rate_limit(120);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,

    /// Requests allowed per minute across all clients
    pub rate_limit: u32,

    /// Path of the geography catalog CSV
    pub regions_csv: PathBuf,

    /// Log output format
    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            rate_limit: DEFAULT_RATE_LIMIT,
            regions_csv: PathBuf::from(DEFAULT_REGIONS_CSV),
            log_format: LogFormat::Text,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> GrantResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// Absent or blank variables fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> GrantResult<Self> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(port) = var("PORT") {
            config.port = port.trim().parse().map_err(|_| {
                GrantError::InvalidConfig(format!("PORT must be a port number, got '{}'", port))
            })?;
        }
        if let Some(limit) = var("RATE_LIMIT") {
            config.rate_limit = limit.trim().parse().map_err(|_| {
                GrantError::InvalidConfig(format!(
                    "RATE_LIMIT must be a number of requests per minute, got '{}'",
                    limit
                ))
            })?;
            if config.rate_limit == 0 {
                return Err(GrantError::InvalidConfig(
                    "RATE_LIMIT must be at least 1".to_string(),
                ));
            }
        }
        if let Some(path) = var("REGIONS_CSV") {
            config.regions_csv = PathBuf::from(path.trim());
        }
        if let Some(format) = var("LOG_FORMAT") {
            config.log_format = format.parse()?;
        }

        Ok(config)
    }

    /// Set the listening port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the per-minute request limit
    pub fn with_rate_limit(mut self, rate_limit: u32) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    /// Set the catalog path
    pub fn with_regions_csv(mut self, path: impl Into<PathBuf>) -> Self {
        self.regions_csv = path.into();
        self
    }

    /// Set the log format
    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.log_format = format;
        self
    }
}
