//! Runtime error types

use shield_core::CoreError;
use shield_llm::LLMError;
use thiserror::Error;

/// Runtime error
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Domain rule violated
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Analyst model call failed
    #[error("LLM error: {0}")]
    Llm(#[from] LLMError),

    /// External intelligence call failed
    #[error("External call failed: {0}")]
    ExternalCallFailed(String),

    /// Source rejected our credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Source has no record for the target
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limited by {0}")]
    RateLimited(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    /// Response did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Every intelligence source failed or none applies
    #[error("No intelligence source produced a result for {0}")]
    NoSources(String),
}

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;
