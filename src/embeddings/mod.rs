//! Embedding providers.
//!
//! The store talks to providers through the [`EmbeddingProvider`] trait so
//! tests can substitute in-process fakes. The shipped implementation is the
//! OpenAI embeddings API over reqwest, with an explicit retry policy for
//! transient failures.

mod openai;
mod retry;

pub use openai::OpenAiEmbedder;
pub use retry::{retry_with_policy, RetryPolicy};

use crate::types::Result;
use async_trait::async_trait;

/// Embedding provider trait.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding for a single text.
    ///
    /// # Errors
    ///
    /// `ValidationError` for empty text; `TransientError` after retry
    /// exhaustion; `ProviderError` for non-retryable provider failures.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for a batch of texts in one provider call.
    ///
    /// # Errors
    ///
    /// `CountMismatchError` if the provider returns a different number of
    /// vectors than texts.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embedding dimensionality.
    fn dimensions(&self) -> usize;
}
