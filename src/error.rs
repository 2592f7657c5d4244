// src/error.rs

//! Unified error handling for the menu relay.

use thiserror::Error;

/// Result type alias for relay operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Network fetch of the page or document failed
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The downloaded document could not be turned into text
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// Extraction succeeded but nothing usable was left after formatting
    #[error("document contained no usable text")]
    EmptyContent,

    /// Output sink refused or failed to take a chunk
    #[error(transparent)]
    Sink(#[from] SinkError),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Failure while fetching bytes from a URL.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("request to {url} failed: {message}")]
    Network { url: String, message: String },
}

impl FetchError {
    /// Classify a reqwest error for the given URL.
    pub fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Timeout {
                url: url.to_string(),
            };
        }
        match err.status() {
            Some(status) => Self::Status {
                url: url.to_string(),
                status: status.as_u16(),
            },
            None => Self::Network {
                url: url.to_string(),
                message: err.to_string(),
            },
        }
    }
}

/// Failure while converting document bytes to text.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("document is not a PDF (missing %PDF- header)")]
    NotPdf,

    #[error("failed to parse PDF: {0}")]
    Parse(String),

    #[error("text extraction aborted: {0}")]
    Aborted(String),
}

/// Failure while emitting a chunk to the output destination.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("sink I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("sink rejected chunk: {0}")]
    Rejected(String),
}
