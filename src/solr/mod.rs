//! Search-engine boundary.
//!
//! The store drives the engine through the [`SearchEngine`] trait; the
//! shipped implementation is [`SolrClient`], speaking Solr's JSON update and
//! JSON request APIs over reqwest.

mod client;

pub use client::SolrClient;

use crate::types::Result;
use async_trait::async_trait;

/// A KNN query against the engine.
///
/// Always issued as a body-bearing POST: the serialized query vector can
/// exceed practical URL length limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    /// Main query string (the KNN clause).
    pub query: String,

    /// Additional filter clauses, applied conjunctively.
    pub filters: Vec<String>,

    /// Field names to return; supports trailing-wildcard patterns.
    pub fields: Vec<String>,

    /// Maximum number of rows to return.
    pub rows: usize,
}

/// Search-engine operations for one named collection.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Write a batch of records. Existing ids are upserted.
    async fn bulk_write(&self, records: &[serde_json::Value]) -> Result<()>;

    /// Make previously written records visible to queries.
    async fn commit(&self) -> Result<()>;

    /// Delete records by id. Absent ids are not an error.
    async fn delete_by_id(&self, ids: &[String]) -> Result<()>;

    /// Execute a query, returning raw result rows.
    async fn query(&self, request: &QueryRequest) -> Result<Vec<serde_json::Value>>;
}
