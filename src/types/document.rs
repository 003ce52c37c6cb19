//! Document and search-query data structures.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::filter::FilterExpression;

/// Metadata key under which a precomputed embedding may travel with a
/// document into `add`. The codec moves it into the engine's vector field
/// and never writes it as a prefixed metadata field.
pub const EMBEDDING_KEY: &str = "embedding";

/// Metadata key under which the engine's pseudo-score is attached to
/// decoded search results.
pub const SCORE_KEY: &str = "score";

/// A document as seen by callers: text content plus free-form metadata.
///
/// Documents exist in this form only until `add` encodes them; inside the
/// engine they live as flat records. Updates are modeled as re-add with the
/// same id (the engine upserts by id).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique id within the collection. Generated at add-time if empty.
    #[serde(default)]
    pub id: String,

    /// Text content to embed and store.
    pub text: String,

    /// Caller-supplied metadata. May transiently carry the computed
    /// embedding under [`EMBEDDING_KEY`].
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Document {
    /// Create a document with a generated id and empty metadata.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            metadata: HashMap::new(),
        }
    }

    /// Create a document with an explicit id.
    pub fn with_id(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            metadata: HashMap::new(),
        }
    }

    /// Attach a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Embedding vector carried in metadata, if present and non-empty.
    pub fn embedding(&self) -> Option<Vec<f32>> {
        let values = self.metadata.get(EMBEDDING_KEY)?.as_array()?;
        if values.is_empty() {
            return None;
        }
        let mut vector = Vec::with_capacity(values.len());
        for v in values {
            vector.push(v.as_f64()? as f32);
        }
        Some(vector)
    }

    /// Store an embedding vector into metadata under [`EMBEDDING_KEY`].
    pub fn set_embedding(&mut self, vector: &[f32]) {
        self.metadata.insert(
            EMBEDDING_KEY.to_string(),
            serde_json::Value::Array(
                vector
                    .iter()
                    .map(|v| serde_json::json!(*v as f64))
                    .collect(),
            ),
        );
    }

    /// Pseudo-score attached by `similarity_search`, if any.
    pub fn score(&self) -> Option<f64> {
        self.metadata.get(SCORE_KEY)?.as_f64()
    }
}

/// Parameters for a similarity search.
///
/// `similarity_threshold` is disabled when negative (the default); a
/// non-negative threshold drops results scoring below it after decode.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    /// Natural-language query text to embed. Must be non-empty.
    pub query_text: String,

    /// Maximum number of nearest neighbors to request. Must be positive.
    pub top_k: usize,

    /// Optional metadata filter, applied server-side as a filter query.
    pub filter: Option<FilterExpression>,

    /// Minimum score for a result to survive; negative disables.
    pub similarity_threshold: f64,
}

impl SearchQuery {
    pub const DEFAULT_TOP_K: usize = 4;

    /// Query with default topK and threshold filtering disabled.
    pub fn new(query_text: impl Into<String>) -> Self {
        Self {
            query_text: query_text.into(),
            top_k: Self::DEFAULT_TOP_K,
            filter: None,
            similarity_threshold: -1.0,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_filter(mut self, filter: FilterExpression) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold;
        self
    }
}

/// Outcome of an `add` batch, reported only after the engine acknowledged
/// the bulk write and commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOutcome {
    /// Documents the engine acknowledged.
    pub indexed: usize,

    /// Documents dropped during preparation (codec or validation failure).
    pub failed: usize,

    /// Ids of the documents that were written, in input order.
    pub ids: Vec<String>,
}
