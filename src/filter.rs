//! Metadata filter expressions and Solr filter-query translation.
//!
//! Callers supply an explicit tagged-variant tree; there is no runtime
//! inspection of opaque filter objects. The translator currently renders
//! only a bare equality at the root — composite shapes are representable
//! but rejected with `UnsupportedFilterError`.

use crate::types::{Result, StoreError};

/// Filter expression tree over metadata fields.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpression {
    /// `key = value`, rendered as a Solr field query.
    Equality { key: String, value: String },
    And(Vec<FilterExpression>),
    Or(Vec<FilterExpression>),
    Not(Box<FilterExpression>),
}

impl FilterExpression {
    /// Convenience constructor for the only translatable shape.
    pub fn equality(key: impl Into<String>, value: impl Into<String>) -> Self {
        FilterExpression::Equality {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Render a filter expression as a Solr filter-query string.
///
/// The key is prefixed with `metadata_prefix` unless it already carries it,
/// so callers may pass either the raw metadata key or the stored field name.
/// Leading and trailing quote characters are stripped from the value.
pub fn translate(expr: &FilterExpression, metadata_prefix: &str) -> Result<String> {
    match expr {
        FilterExpression::Equality { key, value } => {
            let field = if key.starts_with(metadata_prefix) {
                key.clone()
            } else {
                format!("{metadata_prefix}{key}")
            };
            let value = value.trim_matches(|c| c == '"' || c == '\'');
            Ok(format!("{field}:{value}"))
        }
        FilterExpression::And(_) | FilterExpression::Or(_) | FilterExpression::Not(_) => {
            Err(StoreError::UnsupportedFilterError(format!(
                "only a bare equality filter is supported, got {expr:?}"
            )))
        }
    }
}
