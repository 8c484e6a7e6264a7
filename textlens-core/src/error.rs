//! Error types for textlens-core

use std::time::Duration;
use thiserror::Error;

/// Main error type for the textlens-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid input from the caller (never retried)
    #[error("invalid input: {0}")]
    Validation(String),

    /// Configuration error (missing credential, malformed config file)
    #[error("configuration error: {0}")]
    Config(String),

    /// The completion service did not respond within the deadline
    #[error("completion service timed out after {0:?}")]
    UpstreamTimeout(Duration),

    /// The completion service responded with a non-success status
    #[error("completion service returned HTTP {status}")]
    UpstreamHttp { status: u16 },

    /// The completion request could not be sent or the reply could not be read
    #[error("completion request failed: {0}")]
    UpstreamTransport(String),

    /// The completion text could not be decoded as an analysis result.
    /// `raw` keeps the full completion text for diagnostics; it is logged,
    /// never surfaced to the end user as-is.
    #[error("malformed completion output: {message}")]
    MalformedOutput { message: String, raw: String },

    /// Record store error (disabled store, missing record)
    #[error("store error: {0}")]
    Store(String),

    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True for errors caused by bad caller input rather than the pipeline.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

/// Result type alias for textlens-core
pub type Result<T> = std::result::Result<T, Error>;
