//! Backend connection settings.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::env;

/// Environment variable holding the backend base URL
pub const API_URL_VAR: &str = "TRAVEL_DESK_API_URL";

/// Environment variable holding a pre-seeded bearer token
pub const AUTH_TOKEN_VAR: &str = "TRAVEL_DESK_AUTH_TOKEN";

/// Base URL used when [`API_URL_VAR`] is unset
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Backend connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Backend base URL, without trailing slash
    pub base_url: String,
    /// Bearer token to start with, if a session already exists
    pub token: Option<String>,
}

impl ApiConfig {
    /// Settings for a backend at `base_url`, without a session
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_url(&base_url.into()),
            token: None,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MissingConfig`] if [`API_URL_VAR`] is set but blank.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MissingConfig`] if the base URL is set but blank.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let base_url = match lookup(API_URL_VAR) {
            Some(url) if url.trim().is_empty() => return Err(ApiError::MissingConfig(API_URL_VAR)),
            Some(url) => normalize_url(&url),
            None => DEFAULT_API_URL.to_string(),
        };

        let token = lookup(AUTH_TOKEN_VAR).filter(|token| !token.trim().is_empty());

        Ok(Self { base_url, token })
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

fn normalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ApiConfig::from_vars(vars(&[])).unwrap();

        assert_eq!(config.base_url, DEFAULT_API_URL);
        assert_eq!(config.token, None);
    }

    #[test]
    fn test_overrides_and_trailing_slash() {
        let config = ApiConfig::from_vars(vars(&[
            (API_URL_VAR, "https://api.example.com/"),
            (AUTH_TOKEN_VAR, "tok-1"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "https://api.example.com");
        assert_eq!(config.token.as_deref(), Some("tok-1"));
    }

    #[test]
    fn test_blank_url_is_missing_config() {
        let result = ApiConfig::from_vars(vars(&[(API_URL_VAR, "  ")]));

        assert_eq!(result.unwrap_err(), ApiError::MissingConfig(API_URL_VAR));
    }

    #[test]
    fn test_blank_token_is_ignored() {
        let config = ApiConfig::from_vars(vars(&[(AUTH_TOKEN_VAR, "")])).unwrap();
        assert_eq!(config.token, None);
    }
}
