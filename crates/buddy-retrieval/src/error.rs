//! Error types for retrieval adapters

use thiserror::Error;

/// Errors from the search backend and the product catalog
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The search backend returned an error response
    #[error("API error: {message}")]
    Api { message: String },

    /// The backend response did not have the expected shape
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Reading the catalog file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catalog line did not parse as a product row
    #[error("malformed catalog row at line {line}: {message}")]
    MalformedRow { line: usize, message: String },
}

/// Result alias for retrieval operations
pub type Result<T> = std::result::Result<T, Error>;
