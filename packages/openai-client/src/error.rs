//! Error types for OpenAI client.

use thiserror::Error;

/// Result type for OpenAI client operations.
pub type Result<T> = std::result::Result<T, OpenAIError>;

/// OpenAI client errors.
#[derive(Debug, Error)]
pub enum OpenAIError {
    /// Configuration error (missing API key, unbuildable HTTP client)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network error (connection refused, timeout, certificate rejected)
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response from the API
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Parse error (invalid JSON, unexpected response format)
    #[error("Parse error: {0}")]
    Parse(String),

    /// The model answered with no content
    #[error("Empty response from model")]
    EmptyResponse,
}

impl OpenAIError {
    /// Whether repeating the same request could plausibly succeed.
    ///
    /// Configuration problems and 4xx client errors (other than 408/429)
    /// will fail the same way every time.
    pub fn is_retryable(&self) -> bool {
        match self {
            OpenAIError::Config(_) => false,
            OpenAIError::Api { status, .. } => {
                *status == 408 || *status == 429 || *status >= 500
            }
            OpenAIError::Network(_) | OpenAIError::Parse(_) | OpenAIError::EmptyResponse => true,
        }
    }
}
