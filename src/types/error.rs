//! Error types for the vector store.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

/// Error taxonomy for the vector store bridge.
///
/// Every failure surfaces to the immediate caller as one of these variants;
/// the store performs no logging-as-control-flow.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Caller input rejected before any network call (empty text, bad
    /// dimension, non-positive topK).
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Transient embedding-provider failure (network error, 5xx). Retried by
    /// the embedding client up to the configured attempt budget.
    #[error("Transient provider error: {0}")]
    TransientError(String),

    /// Permanent embedding-provider failure (malformed request, auth).
    /// Never retried.
    #[error("Provider error: {0}")]
    ProviderError(String),

    /// Batch embedding returned a different number of vectors than texts.
    #[error("Embedding count mismatch: expected {expected}, got {actual}")]
    CountMismatchError { expected: usize, actual: usize },

    /// Search-engine I/O or protocol failure. Surfaced, not retried here.
    #[error("Engine error: {0}")]
    EngineError(String),

    /// Filter expression shape the translator cannot render.
    #[error("Unsupported filter: {0}")]
    UnsupportedFilterError(String),

    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl StoreError {
    /// Whether the retry policy may re-attempt after this error.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::TransientError(_))
    }
}
