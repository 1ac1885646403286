//! Configuration management for the agent console.
//!
//! Loads configuration from environment variables with sensible defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use thiserror::Error;
use travel_desk_api::{ApiConfig, ApiError};

/// Environment variable holding the list page size
pub const PAGE_SIZE_VAR: &str = "TRAVEL_DESK_PAGE_SIZE";

/// Environment variable holding the shutdown timeout in seconds
pub const SHUTDOWN_TIMEOUT_VAR: &str = "TRAVEL_DESK_SHUTDOWN_TIMEOUT";

/// Environment variable holding the log filter
pub const LOG_FILTER_VAR: &str = "RUST_LOG";

/// Page size used when [`PAGE_SIZE_VAR`] is unset
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Log filter used when [`LOG_FILTER_VAR`] is unset
pub const DEFAULT_LOG_FILTER: &str = "travel_desk=info,travel_desk_runtime=debug";

/// Errors while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A numeric variable did not parse or was zero
    #[error("{var} must be a positive integer, got {value:?}")]
    InvalidNumber {
        /// Variable name
        var: &'static str,
        /// Raw value
        value: String,
    },

    /// Backend settings were invalid
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend connection
    pub api: ApiConfig,
    /// Records per list page
    pub page_size: u32,
    /// How long shutdown waits for outstanding requests
    pub shutdown_timeout: Duration,
    /// `tracing-subscriber` filter directive
    pub log_filter: String,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is set to an unusable value.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api = ApiConfig::from_vars(&lookup)?;
        let page_size = positive(&lookup, PAGE_SIZE_VAR)?.unwrap_or(u64::from(DEFAULT_PAGE_SIZE));
        let shutdown_timeout = positive(&lookup, SHUTDOWN_TIMEOUT_VAR)?.unwrap_or(30);

        Ok(Self {
            api,
            page_size: u32::try_from(page_size).map_err(|_| ConfigError::InvalidNumber {
                var: PAGE_SIZE_VAR,
                value: page_size.to_string(),
            })?,
            shutdown_timeout: Duration::from_secs(shutdown_timeout),
            log_filter: lookup(LOG_FILTER_VAR)
                .filter(|filter| !filter.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        })
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            page_size: DEFAULT_PAGE_SIZE,
            shutdown_timeout: Duration::from_secs(30),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

fn positive(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<u64>, ConfigError> {
    let Some(value) = lookup(var) else {
        return Ok(None);
    };

    match value.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(Some(n)),
        _ => Err(ConfigError::InvalidNumber { var, value }),
    }
}
