//! Core types: documents, search queries, and the error taxonomy.

pub mod document;
pub mod error;

pub use document::{AddOutcome, Document, SearchQuery, EMBEDDING_KEY, SCORE_KEY};
pub use error::{Result, StoreError};
