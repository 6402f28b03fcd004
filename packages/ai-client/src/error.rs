//! Error types for the AI client.

use thiserror::Error;

/// Result type for AI client operations.
pub type Result<T> = std::result::Result<T, AiError>;

/// AI client errors.
#[derive(Debug, Error)]
pub enum AiError {
    /// Configuration error (missing API key, unknown provider)
    #[error("configuration error: {0}")]
    Config(String),

    /// Network error (connection failed, timeout)
    #[error("network error: {0}")]
    Network(String),

    /// Provider returned a non-2xx response
    #[error("{provider} API error ({status}): {message}")]
    Api {
        provider: &'static str,
        status: u16,
        message: String,
    },

    /// Response body could not be interpreted
    #[error("parse error: {0}")]
    Parse(String),

    /// Provider answered but produced no structured output
    #[error("empty response from {0}")]
    EmptyResponse(&'static str),
}

impl AiError {
    /// Whether the failure came from a timed-out request.
    pub fn is_timeout(&self) -> bool {
        matches!(self, AiError::Network(msg) if msg.contains("timed out"))
    }
}

impl From<reqwest::Error> for AiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AiError::Network(format!("request timed out: {}", e))
        } else {
            AiError::Network(e.to_string())
        }
    }
}
