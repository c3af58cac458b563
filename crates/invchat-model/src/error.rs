//! Error types for the remote model layer.

use thiserror::Error;

/// Errors that can occur while talking to the remote model.
#[derive(Error, Debug)]
pub enum ModelError {
    /// No API key was supplied.
    #[error("API key not found; set {0} in the environment or a .env file")]
    MissingApiKey(String),

    /// Failed to build the HTTP client.
    #[error("failed to create HTTP client: {0}")]
    Client(String),

    /// Transport-level failure (connection refused, DNS, TLS, ...).
    #[error("request failed: {0}")]
    Http(String),

    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The provider answered with a non-success status code.
    #[error("model returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be decoded.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The response decoded fine but carried no text.
    #[error("model returned no text{}", .0.as_deref().map(|r| format!(" (finish reason: {r})")).unwrap_or_default())]
    EmptyResponse(Option<String>),

    /// The image could not be loaded.
    #[error("image error: {0}")]
    Image(String),

    /// I/O error when reading image files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ModelError {
    /// Whether retrying the same request may succeed.
    ///
    /// Timeouts, transport failures, rate limiting (429) and server errors
    /// (5xx) are retryable; everything else fails immediately.
    pub fn is_retryable(&self) -> bool {
        match self {
            ModelError::Timeout | ModelError::Http(_) => true,
            ModelError::Status { status, .. } => *status == 429 || (500..600).contains(status),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ModelError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ModelError::Timeout
        } else if e.is_decode() {
            ModelError::InvalidResponse(e.to_string())
        } else {
            ModelError::Http(e.to_string())
        }
    }
}
