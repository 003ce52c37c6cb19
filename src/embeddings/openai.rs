//! OpenAI embedding API client.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::embeddings::{retry_with_policy, EmbeddingProvider, RetryPolicy};
use crate::types::{Result, StoreError};
use async_trait::async_trait;

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/embeddings";
const DEFAULT_MODEL: &str = "text-embedding-3-small";

/// OpenAI API embedding request.
#[derive(Debug, Serialize)]
struct EmbeddingRequest {
    model: String,
    input: serde_json::Value, // String or Vec<String>
}

/// OpenAI API embedding response.
#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// OpenAI embedding provider with retry on transient failures.
pub struct OpenAiEmbedder {
    api_key: String,
    model: String,
    dimensions: usize,
    endpoint: String,
    retry: RetryPolicy,
    client: Client,
}

impl OpenAiEmbedder {
    /// Create a new embedder with the default retry policy.
    ///
    /// Dimensions follow the model: text-embedding-3-large is 3072, the
    /// other published embedding models are 1536.
    pub fn new(api_key: String, model: String) -> Self {
        let dimensions = match model.as_str() {
            "text-embedding-3-large" => 3072,
            _ => 1536,
        };

        Self {
            api_key,
            model,
            dimensions,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            retry: RetryPolicy::default(),
            client: Client::new(),
        }
    }

    /// Create an embedder from `OPENAI_API_KEY` and optional
    /// `SOLRVEC_EMBEDDING_MODEL` environment variables.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            StoreError::ConfigError("OPENAI_API_KEY environment variable not set".to_string())
        })?;
        let model =
            std::env::var("SOLRVEC_EMBEDDING_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Ok(Self::new(api_key, model))
    }

    /// Override the retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Override the API endpoint (testing against a local stub).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// One embeddings API call, no retry. Transport failures and 5xx/429
    /// responses map to `TransientError`, other non-success statuses to
    /// `ProviderError`.
    async fn call_api(&self, input: serde_json::Value) -> Result<Vec<Vec<f32>>> {
        let request = EmbeddingRequest {
            model: self.model.clone(),
            input,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| StoreError::TransientError(format!("embedding request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = format!("embedding API error ({status}): {body}");
            return if status.is_server_error() || status.as_u16() == 429 {
                Err(StoreError::TransientError(message))
            } else {
                Err(StoreError::ProviderError(message))
            };
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| StoreError::ProviderError(format!("malformed embedding response: {e}")))?;

        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(StoreError::ValidationError(
                "cannot embed empty text".to_string(),
            ));
        }

        let vectors =
            retry_with_policy(&self.retry, || self.call_api(serde_json::json!(text))).await?;

        vectors
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::ProviderError("no embedding returned".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let vectors =
            retry_with_policy(&self.retry, || self.call_api(serde_json::json!(texts))).await?;

        if vectors.len() != texts.len() {
            return Err(StoreError::CountMismatchError {
                expected: texts.len(),
                actual: vectors.len(),
            });
        }

        Ok(vectors)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
