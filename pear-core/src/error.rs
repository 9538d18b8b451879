//! Error types for Pear to Peer

use thiserror::Error;

/// Result type alias for review operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for review operations
#[derive(Error, Debug)]
pub enum Error {
    /// Line number is not a positive integer
    #[error("Invalid line number: {0}")]
    InvalidLine(String),

    /// Comment text is empty after trimming
    #[error("Comment text must not be empty")]
    EmptyComment,

    /// Persisted annotation data could not be decoded
    #[error("Malformed annotation data: {0}")]
    MalformedAnnotationData(String),

    /// LLM response is missing its `hints` object
    #[error("Hint data is missing the `hints` object")]
    MissingHintData,

    /// Operation is not allowed in the session's current mode or status
    #[error("Invalid session state: {0}")]
    InvalidSessionState(String),

    /// Refused to submit a review with zero comments
    #[error("Please add at least one comment before submitting the review.")]
    EmptySubmission,

    /// Line number lies outside the displayed source text
    #[error("Line {line} is out of range (source has {line_count} lines)")]
    LineOutOfRange { line: u32, line_count: usize },

    /// Network failure or non-2xx response from the backend
    #[error("{message}")]
    BackendRequest {
        /// HTTP status, when a response was received
        status: Option<u16>,
        /// Backend-supplied message when available
        message: String,
    },

    /// Session was cancelled before the backend answered
    #[error("Review session was cancelled")]
    Cancelled,

    /// Backend did not answer within the session timeout
    #[error("Backend did not respond within {0:?}")]
    Timeout(std::time::Duration),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Build a backend error without an HTTP status
    pub fn backend(message: impl Into<String>) -> Self {
        Error::BackendRequest {
            status: None,
            message: message.into(),
        }
    }
}
