//! Error types for the booking backend client

use thiserror::Error;

/// Errors that can occur when talking to the booking backend
///
/// Every variant ends up as a slice-level error string; see
/// [`ApiError::server_message`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Transport failure before a response arrived
    #[error("Request failed: {0}")]
    Network(String),

    /// The backend answered with a non-success status or `success: false`
    #[error("Server error (status {status}): {}", message.as_deref().unwrap_or("no message"))]
    Server {
        /// HTTP status code
        status: u16,
        /// Message from the response body
        message: Option<String>,
    },

    /// Missing or expired bearer token
    #[error("Unauthorized: {}", message.as_deref().unwrap_or("no message"))]
    Unauthorized {
        /// Message from the response body
        message: Option<String>,
    },

    /// Response body did not match the expected shape
    #[error("Response parsing failed: {0}")]
    Decode(String),

    /// Success envelope without the expected `data`
    #[error("Response carried no data")]
    MissingData,

    /// The base URL cannot be extended with a route
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),

    /// A required configuration value is absent or blank
    #[error("Missing {0} configuration")]
    MissingConfig(&'static str),
}

impl ApiError {
    /// The server-provided message, if the backend sent a usable one
    ///
    /// Slices surface this message and fall back to a fixed per-operation
    /// string otherwise.
    #[must_use]
    pub fn server_message(&self) -> Option<String> {
        match self {
            Self::Server { message, .. } | Self::Unauthorized { message } => message
                .as_deref()
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_string),
            Self::Network(_)
            | Self::Decode(_)
            | Self::MissingData
            | Self::InvalidUrl(_)
            | Self::MissingConfig(_) => {
                None
            },
        }
    }

    /// Whether the session should be considered gone
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}
