//! solrvec - vector store over Apache Solr's KNN search
//!
//! Bridges a text-embedding provider and Solr's approximate
//! nearest-neighbor capability:
//! - Batched document indexing with embedding acquisition and retry
//! - KNN query construction and post-query similarity filtering
//! - Metadata field prefixing and filter-expression translation
//!
//! The [`VectorStore`] orchestrates an [`EmbeddingProvider`] and a
//! [`SearchEngine`]; both are traits so callers can substitute providers or
//! test against in-process fakes.

pub mod codec;
pub mod config;
pub mod embeddings;
pub mod filter;
pub mod solr;
pub mod store;
pub mod types;

pub use codec::DocumentCodec;
pub use config::{FieldType, StoreOptions};
pub use embeddings::{EmbeddingProvider, OpenAiEmbedder, RetryPolicy};
pub use filter::FilterExpression;
pub use solr::{QueryRequest, SearchEngine, SolrClient};
pub use store::VectorStore;
pub use types::{AddOutcome, Document, Result, SearchQuery, StoreError};
