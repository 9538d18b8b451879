//! Error types for backend API calls

use thiserror::Error;

/// Result type for backend API calls
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors that can occur while talking to the review backend
#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport-level failure (connection refused, timeout, TLS, ...)
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response; `message` is the backend's `error` text when present
    #[error("{message}")]
    Status { status: u16, message: String },

    /// 2xx response without the expected `content`
    #[error("{0}")]
    MissingContent(String),

    /// Response body could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// Base URL could not be parsed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Base URL cannot carry API paths
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// Missing or unusable credentials
    #[error("Authentication error: {0}")]
    Auth(String),
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Parse(err.to_string())
    }
}

impl From<ApiError> for pear_core::Error {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Status { status, message } => pear_core::Error::BackendRequest {
                status: Some(status),
                message,
            },
            other => pear_core::Error::BackendRequest {
                status: None,
                message: other.to_string(),
            },
        }
    }
}
