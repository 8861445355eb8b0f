//! Kapow error types

use std::time::Duration;

/// Kapow error types
#[derive(Debug, thiserror::Error)]
pub enum KapowError {
    // Remote API/network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("authentication failed")]
    AuthenticationFailed,

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// A raw image object lacked a field required to build a record.
    #[error("missing field '{0}' in image record")]
    MissingField(&'static str),

    #[error("invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: f64, height: f64 },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    // Cache store errors
    #[error("cache store error: {0}")]
    Store(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl KapowError {
    /// Whether a retry of the same request could plausibly succeed.
    ///
    /// Nothing retries automatically; this only shapes log levels and lets
    /// callers decide.
    pub fn is_transient(&self) -> bool {
        match self {
            KapowError::Http(_) | KapowError::RateLimited { .. } => true,
            KapowError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for KapowError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            KapowError::MalformedResponse(err.to_string())
        } else {
            KapowError::Http(err.to_string())
        }
    }
}

/// Result type alias for Kapow operations
pub type Result<T> = std::result::Result<T, KapowError>;
