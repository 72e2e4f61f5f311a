//! Error types for the ScamShield LLM module

use thiserror::Error;

/// Result type alias for LLM operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// LLM module errors
#[derive(Debug, Error)]
pub enum LLMError {
    /// External API call failed
    #[error("External API call failed: {0}")]
    ApiCallFailed(String),

    /// Provider rejected the credentials (HTTP 401/403)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Provider is rate limiting us (HTTP 429)
    #[error("Rate limited by {0}")]
    RateLimited(String),

    /// Request timed out
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Invalid response format
    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for LLMError {
    fn from(s: String) -> Self {
        LLMError::Other(s)
    }
}

impl From<&str> for LLMError {
    fn from(s: &str) -> Self {
        LLMError::Other(s.to_string())
    }
}

impl From<reqwest::Error> for LLMError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LLMError::Timeout(err.to_string())
        } else {
            LLMError::ApiCallFailed(err.to_string())
        }
    }
}

/// Map a non-success HTTP status from `provider` to an error
pub(crate) fn classify_status(provider: &str, status: reqwest::StatusCode, body: &str) -> LLMError {
    match status.as_u16() {
        401 | 403 => LLMError::Unauthorized(format!("{} API error ({}): {}", provider, status, body)),
        429 => {
            tracing::warn!(provider = provider, "LLM provider returned 429, not retrying");
            LLMError::RateLimited(provider.to_string())
        }
        _ => LLMError::ApiCallFailed(format!("{} API error ({}): {}", provider, status, body)),
    }
}
