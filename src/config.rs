//! Store configuration.
//!
//! `StoreOptions` is a single immutable value: every field is defaulted
//! independently at construction (blank names and non-positive dimensions
//! fall back to the default) and never mutated afterwards.

use std::collections::HashMap;

/// Numeric type declared for a metadata field, applied when decoding
/// engine records back into documents. Multi-valued engine fields collapse
/// to their first element before coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// 32-bit integer; wider engine integers are narrowed.
    Int,
    /// 64-bit integer.
    Long,
    /// 64-bit float.
    Double,
}

impl FieldType {
    /// Coerce a decoded JSON value to this type. Values that cannot be
    /// represented pass through unchanged.
    pub fn coerce(self, value: serde_json::Value) -> serde_json::Value {
        match self {
            FieldType::Int => match value.as_i64() {
                Some(n) => serde_json::json!(n as i32),
                None => value,
            },
            FieldType::Long => match value.as_i64() {
                Some(n) => serde_json::json!(n),
                None => value,
            },
            FieldType::Double => match value.as_f64() {
                Some(f) => serde_json::json!(f),
                None => value,
            },
        }
    }
}

/// Field naming and dimensionality for one engine collection.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    id_field: String,
    text_field: String,
    vector_field: String,
    metadata_prefix: String,
    vector_dimension: usize,
    field_types: HashMap<String, FieldType>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreOptions {
    pub const DEFAULT_ID_FIELD: &'static str = "id";
    pub const DEFAULT_TEXT_FIELD: &'static str = "content";
    pub const DEFAULT_VECTOR_FIELD: &'static str = "vector";
    pub const DEFAULT_METADATA_PREFIX: &'static str = "metadata_";
    pub const DEFAULT_VECTOR_DIMENSION: usize = 1536;

    /// Options with every field at its default. The `year` field keeps its
    /// historical 32-bit narrowing via the default type map.
    pub fn new() -> Self {
        let mut field_types = HashMap::new();
        field_types.insert("year".to_string(), FieldType::Int);

        Self {
            id_field: Self::DEFAULT_ID_FIELD.to_string(),
            text_field: Self::DEFAULT_TEXT_FIELD.to_string(),
            vector_field: Self::DEFAULT_VECTOR_FIELD.to_string(),
            metadata_prefix: Self::DEFAULT_METADATA_PREFIX.to_string(),
            vector_dimension: Self::DEFAULT_VECTOR_DIMENSION,
            field_types,
        }
    }

    /// Override the id field name. Blank input keeps the default.
    pub fn with_id_field(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !name.trim().is_empty() {
            self.id_field = name;
        }
        self
    }

    /// Override the text field name. Blank input keeps the default.
    pub fn with_text_field(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !name.trim().is_empty() {
            self.text_field = name;
        }
        self
    }

    /// Override the vector field name. Blank input keeps the default.
    pub fn with_vector_field(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !name.trim().is_empty() {
            self.vector_field = name;
        }
        self
    }

    /// Override the metadata prefix. Blank input keeps the default.
    pub fn with_metadata_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        if !prefix.trim().is_empty() {
            self.metadata_prefix = prefix;
        }
        self
    }

    /// Override the vector dimension. Non-positive input keeps the default.
    pub fn with_vector_dimension(mut self, dimension: usize) -> Self {
        if dimension > 0 {
            self.vector_dimension = dimension;
        }
        self
    }

    /// Declare the numeric type of a metadata field for decode coercion.
    pub fn with_field_type(mut self, field: impl Into<String>, field_type: FieldType) -> Self {
        self.field_types.insert(field.into(), field_type);
        self
    }

    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    pub fn text_field(&self) -> &str {
        &self.text_field
    }

    pub fn vector_field(&self) -> &str {
        &self.vector_field
    }

    pub fn metadata_prefix(&self) -> &str {
        &self.metadata_prefix
    }

    pub fn vector_dimension(&self) -> usize {
        self.vector_dimension
    }

    /// Declared type for a metadata field, if any.
    pub fn field_type(&self, field: &str) -> Option<FieldType> {
        self.field_types.get(field).copied()
    }
}
