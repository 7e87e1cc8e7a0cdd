//! Error types for chat model calls

use thiserror::Error;

/// Errors from chat model providers
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The provider returned an error response
    #[error("API error ({error_type}): {message}")]
    Api { error_type: String, message: String },

    /// Required credentials were not configured
    #[error("missing credentials: {0}")]
    MissingCredentials(String),

    /// The provider response did not have the expected shape
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl Error {
    /// Create an API error
    pub fn api(error_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            error_type: error_type.into(),
            message: message.into(),
        }
    }
}

/// Result alias for chat model operations
pub type Result<T> = std::result::Result<T, Error>;
