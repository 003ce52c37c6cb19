//! Solr HTTP client.

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::solr::{QueryRequest, SearchEngine};
use crate::types::{Result, StoreError};
use async_trait::async_trait;

const DEFAULT_BASE_URL: &str = "http://localhost:8983/solr";

/// Body shape of a Solr select response.
#[derive(Debug, Deserialize)]
struct SelectResponse {
    response: SelectBody,
}

#[derive(Debug, Deserialize)]
struct SelectBody {
    #[serde(default)]
    docs: Vec<Value>,
}

/// Client for one Solr collection.
///
/// `base_url` includes the `/solr` root (e.g. `http://localhost:8983/solr`);
/// update and select endpoints are derived per collection.
pub struct SolrClient {
    base_url: String,
    collection: String,
    client: Client,
}

impl SolrClient {
    pub fn new(base_url: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            collection: collection.into(),
            client: Client::new(),
        }
    }

    /// Create a client from `SOLR_URL` (optional, defaults to the local
    /// instance) and `SOLR_COLLECTION` (required) environment variables.
    pub fn from_env() -> Result<Self> {
        let base_url =
            std::env::var("SOLR_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let collection = std::env::var("SOLR_COLLECTION").map_err(|_| {
            StoreError::ConfigError("SOLR_COLLECTION environment variable not set".to_string())
        })?;
        Ok(Self::new(base_url, collection))
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn update_url(&self) -> String {
        format!("{}/{}/update", self.base_url, self.collection)
    }

    fn select_url(&self) -> String {
        format!("{}/{}/select", self.base_url, self.collection)
    }

    /// POST a JSON body to an update endpoint and check the HTTP status.
    async fn post_update(&self, params: &[(&str, &str)], body: &Value) -> Result<()> {
        let response = self
            .client
            .post(self.update_url())
            .query(params)
            .json(body)
            .send()
            .await
            .map_err(|e| StoreError::EngineError(format!("solr update request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(StoreError::EngineError(format!(
                "solr update error ({status}): {text}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl SearchEngine for SolrClient {
    async fn bulk_write(&self, records: &[Value]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        tracing::debug!(
            collection = %self.collection,
            count = records.len(),
            "writing records to solr"
        );
        self.post_update(&[], &Value::Array(records.to_vec())).await
    }

    async fn commit(&self) -> Result<()> {
        self.post_update(&[("commit", "true")], &serde_json::json!({}))
            .await
    }

    async fn delete_by_id(&self, ids: &[String]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        tracing::debug!(
            collection = %self.collection,
            count = ids.len(),
            "deleting records from solr"
        );
        self.post_update(&[], &serde_json::json!({ "delete": ids }))
            .await
    }

    async fn query(&self, request: &QueryRequest) -> Result<Vec<Value>> {
        // Solr JSON Request API; the vector literal rides in the body.
        let body = serde_json::json!({
            "query": request.query,
            "filter": request.filters,
            "fields": request.fields,
            "limit": request.rows,
        });

        let response = self
            .client
            .post(self.select_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::EngineError(format!("solr query request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(StoreError::EngineError(format!(
                "solr query error ({status}): {text}"
            )));
        }

        let parsed: SelectResponse = response
            .json()
            .await
            .map_err(|e| StoreError::EngineError(format!("malformed solr response: {e}")))?;

        Ok(parsed.response.docs)
    }
}
