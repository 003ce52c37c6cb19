//! Vector store engine.
//!
//! Orchestrates embedding acquisition, record encoding, and KNN querying
//! against the search engine. Entirely synchronous per call: the only
//! suspension points are the two network collaborators, so concurrent use
//! just needs each invocation on its own task.

use std::fmt::Write as _;
use std::sync::Arc;

use crate::codec::DocumentCodec;
use crate::config::StoreOptions;
use crate::embeddings::EmbeddingProvider;
use crate::filter;
use crate::solr::{QueryRequest, SearchEngine};
use crate::types::{AddOutcome, Document, Result, SearchQuery, StoreError, SCORE_KEY};

/// Semantic document store over an embedding provider and a KNN-capable
/// search engine.
pub struct VectorStore {
    provider: Arc<dyn EmbeddingProvider>,
    engine: Arc<dyn SearchEngine>,
    codec: DocumentCodec,
}

impl VectorStore {
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        engine: Arc<dyn SearchEngine>,
        options: StoreOptions,
    ) -> Self {
        Self {
            provider,
            engine,
            codec: DocumentCodec::new(options),
        }
    }

    pub fn options(&self) -> &StoreOptions {
        self.codec.options()
    }

    /// Index a batch of documents.
    ///
    /// Documents without a usable embedding are embedded in one batch call
    /// and results attached back by position. Missing ids are generated.
    /// Per-document preparation failures are counted as failed and excluded
    /// from the write; a failure of the bulk write or commit fails the whole
    /// operation, and nothing is counted as indexed until the engine has
    /// acknowledged both.
    pub async fn add(&self, mut documents: Vec<Document>) -> Result<AddOutcome> {
        if documents.is_empty() {
            return Ok(AddOutcome {
                indexed: 0,
                failed: 0,
                ids: Vec::new(),
            });
        }

        for document in &mut documents {
            if document.id.trim().is_empty() {
                document.id = uuid::Uuid::new_v4().to_string();
            }
        }

        // One batch call for every document lacking a vector.
        let missing: Vec<usize> = documents
            .iter()
            .enumerate()
            .filter(|(_, d)| d.embedding().is_none())
            .map(|(i, _)| i)
            .collect();

        if !missing.is_empty() {
            let texts: Vec<String> = missing.iter().map(|&i| documents[i].text.clone()).collect();
            let vectors = self.provider.embed_batch(&texts).await?;
            if vectors.len() != missing.len() {
                return Err(StoreError::CountMismatchError {
                    expected: missing.len(),
                    actual: vectors.len(),
                });
            }
            for (&index, vector) in missing.iter().zip(vectors.iter()) {
                documents[index].set_embedding(vector);
            }
        }

        let mut records = Vec::with_capacity(documents.len());
        let mut ids = Vec::with_capacity(documents.len());
        let mut failed = 0usize;
        for document in &documents {
            match self.codec.encode(document) {
                Ok(record) => {
                    records.push(record);
                    ids.push(document.id.clone());
                }
                Err(err) => {
                    tracing::warn!(id = %document.id, error = %err, "document preparation failed");
                    failed += 1;
                }
            }
        }

        if records.is_empty() {
            return Ok(AddOutcome {
                indexed: 0,
                failed,
                ids,
            });
        }

        self.engine.bulk_write(&records).await?;
        self.engine.commit().await?;

        // Counted only after the engine acknowledged write and commit.
        let indexed = records.len();
        tracing::info!(indexed, failed, "indexed document batch");
        Ok(AddOutcome {
            indexed,
            failed,
            ids,
        })
    }

    /// Delete documents by id. Idempotent: absent ids are not an error.
    pub async fn delete(&self, ids: &[String]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        self.engine.delete_by_id(ids).await?;
        self.engine.commit().await?;
        tracing::info!(count = ids.len(), "deleted documents");
        Ok(())
    }

    /// Search for documents similar to the query text.
    ///
    /// Results keep the engine's KNN order; when the query carries a
    /// non-negative threshold, documents scoring below it are dropped after
    /// decode (the score field only materializes at query execution time).
    pub async fn similarity_search(&self, query: &SearchQuery) -> Result<Vec<Document>> {
        if query.query_text.trim().is_empty() {
            return Err(StoreError::ValidationError(
                "query text must not be empty".to_string(),
            ));
        }
        if query.top_k == 0 {
            return Err(StoreError::ValidationError(
                "topK must be positive".to_string(),
            ));
        }

        let options = self.codec.options();
        let filters = match &query.filter {
            Some(expr) => vec![filter::translate(expr, options.metadata_prefix())?],
            None => Vec::new(),
        };

        let vector = self.provider.embed(&query.query_text).await?;
        let request = QueryRequest {
            query: knn_clause(options.vector_field(), query.top_k, &vector),
            filters,
            fields: vec![
                options.id_field().to_string(),
                options.text_field().to_string(),
                SCORE_KEY.to_string(),
                format!("{}*", options.metadata_prefix()),
            ],
            rows: query.top_k,
        };

        let rows = self.engine.query(&request).await?;
        let mut results = Vec::with_capacity(rows.len());
        for row in &rows {
            if let Some(document) = self.codec.decode(row, query.similarity_threshold)? {
                results.push(document);
            }
        }
        tracing::debug!(
            requested = query.top_k,
            returned = rows.len(),
            kept = results.len(),
            "similarity search complete"
        );
        Ok(results)
    }
}

/// Build the engine's KNN clause: `{!knn f=<field> topK=<k>}[v0, v1, ...]`.
fn knn_clause(vector_field: &str, top_k: usize, vector: &[f32]) -> String {
    format!(
        "{{!knn f={vector_field} topK={top_k}}}{}",
        vector_literal(vector)
    )
}

/// Render a vector as `[v0, v1, ..., vn]`.
///
/// Each value uses Rust's default f32 Display (shortest round-trip decimal).
/// This is the single formatting routine for query vectors; the engine's
/// literal parser is sensitive to drift.
fn vector_literal(vector: &[f32]) -> String {
    let mut literal = String::with_capacity(vector.len() * 10 + 2);
    literal.push('[');
    for (i, value) in vector.iter().enumerate() {
        if i > 0 {
            literal.push_str(", ");
        }
        let _ = write!(literal, "{value}");
    }
    literal.push(']');
    literal
}
