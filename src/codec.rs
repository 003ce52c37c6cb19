//! Document codec: converts between [`Document`] and the engine's flat
//! record representation.
//!
//! Encoding maps id/text directly, moves a metadata-carried embedding into
//! the vector field, and writes remaining metadata entries under
//! `<metadata_prefix><key>`. Decoding reverses this, collapsing Solr's
//! multi-valued fields to their first element and applying the declared
//! per-field numeric coercions.

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::config::StoreOptions;
use crate::types::{Document, Result, StoreError, EMBEDDING_KEY, SCORE_KEY};

/// Codec for one collection's field layout.
#[derive(Debug, Clone)]
pub struct DocumentCodec {
    options: StoreOptions,
}

impl DocumentCodec {
    pub fn new(options: StoreOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Encode a document into an engine record.
    ///
    /// A missing id is generated. A metadata-carried embedding is validated
    /// against the configured dimension and emitted as the vector field.
    /// Metadata keys colliding with the reserved id/text/vector field names
    /// are skipped.
    ///
    /// # Errors
    ///
    /// `ValidationError` if the embedding length does not match the
    /// configured vector dimension.
    pub fn encode(&self, document: &Document) -> Result<Value> {
        let mut record = Map::new();

        let id = if document.id.trim().is_empty() {
            Uuid::new_v4().to_string()
        } else {
            document.id.clone()
        };
        record.insert(self.options.id_field().to_string(), Value::String(id));
        record.insert(
            self.options.text_field().to_string(),
            Value::String(document.text.clone()),
        );

        if let Some(vector) = document.embedding() {
            let expected = self.options.vector_dimension();
            if vector.len() != expected {
                return Err(StoreError::ValidationError(format!(
                    "embedding length {} does not match configured dimension {expected}",
                    vector.len()
                )));
            }
            record.insert(
                self.options.vector_field().to_string(),
                Value::Array(vector.iter().map(|v| serde_json::json!(*v as f64)).collect()),
            );
        }

        let reserved = [
            self.options.id_field(),
            self.options.text_field(),
            self.options.vector_field(),
        ];
        for (key, value) in &document.metadata {
            if key == EMBEDDING_KEY {
                continue;
            }
            if reserved.contains(&key.as_str()) {
                tracing::debug!(key = %key, "skipping metadata key colliding with a reserved field");
                continue;
            }
            record.insert(
                format!("{}{}", self.options.metadata_prefix(), key),
                value.clone(),
            );
        }

        Ok(Value::Object(record))
    }

    /// Decode an engine record into a document, or drop it.
    ///
    /// If the record carries a score and `similarity_threshold` is
    /// non-negative, a score below the threshold yields `Ok(None)` — the
    /// record is filtered, not an error. A surviving score is attached to
    /// metadata under `score`.
    pub fn decode(&self, record: &Value, similarity_threshold: f64) -> Result<Option<Document>> {
        let fields = record.as_object().ok_or_else(|| {
            StoreError::EngineError("engine row is not a JSON object".to_string())
        })?;

        let id = fields
            .get(self.options.id_field())
            .and_then(first_value)
            .and_then(scalar_to_string)
            .ok_or_else(|| {
                StoreError::EngineError(format!(
                    "engine row missing id field '{}'",
                    self.options.id_field()
                ))
            })?;

        let text = fields
            .get(self.options.text_field())
            .and_then(first_value)
            .and_then(scalar_to_string)
            .unwrap_or_default();

        let score = fields.get(SCORE_KEY).and_then(Value::as_f64);
        if let Some(score) = score {
            if similarity_threshold >= 0.0 && score < similarity_threshold {
                return Ok(None);
            }
        }

        let mut document = Document::with_id(id, text);

        if let Some(values) = fields.get(self.options.vector_field()).and_then(Value::as_array) {
            let vector: Vec<f32> = values
                .iter()
                .filter_map(|v| v.as_f64().map(|f| f as f32))
                .collect();
            if !vector.is_empty() {
                document.set_embedding(&vector);
            }
        }

        let prefix = self.options.metadata_prefix();
        for (field, value) in fields {
            let Some(key) = field.strip_prefix(prefix) else {
                continue;
            };
            let Some(value) = first_value(value) else {
                continue;
            };
            let value = match self.options.field_type(key) {
                Some(field_type) => field_type.coerce(value.clone()),
                None => value.clone(),
            };
            document.metadata.insert(key.to_string(), value);
        }

        if let Some(score) = score {
            document
                .metadata
                .insert(SCORE_KEY.to_string(), serde_json::json!(score));
        }

        Ok(Some(document))
    }
}

/// First element of a multi-valued field, or the value itself.
fn first_value(value: &Value) -> Option<&Value> {
    match value {
        Value::Array(items) => items.first(),
        other => Some(other),
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FieldType;
    use serde_json::json;

    fn codec() -> DocumentCodec {
        DocumentCodec::new(StoreOptions::new().with_vector_dimension(3))
    }

    #[test]
    fn test_encode_decode_lossless() {
        let codec = codec();
        let mut doc = Document::with_id("doc-1", "rust is fast")
            .with_metadata("category", json!("AI"))
            .with_metadata("author", json!("lin"));
        doc.set_embedding(&[0.1, 0.2, 0.3]);

        let record = codec.encode(&doc).unwrap();
        assert_eq!(record["id"], json!("doc-1"));
        assert_eq!(record["content"], json!("rust is fast"));
        assert_eq!(record["metadata_category"], json!("AI"));
        assert_eq!(record["vector"].as_array().unwrap().len(), 3);

        let decoded = codec.decode(&record, -1.0).unwrap().unwrap();
        assert_eq!(decoded.id, doc.id);
        assert_eq!(decoded.text, doc.text);
        assert_eq!(decoded.embedding().unwrap().len(), 3);
        assert_eq!(decoded.metadata.get("category"), Some(&json!("AI")));
        assert_eq!(decoded.metadata.get("author"), Some(&json!("lin")));
    }

    #[test]
    fn test_encode_generates_missing_id() {
        let codec = codec();
        let doc = Document {
            id: String::new(),
            text: "no id".to_string(),
            metadata: Default::default(),
        };

        let record = codec.encode(&doc).unwrap();
        assert!(!record["id"].as_str().unwrap().is_empty());
    }

    #[test]
    fn test_encode_rejects_wrong_dimension() {
        let codec = codec();
        let mut doc = Document::with_id("doc-1", "text");
        doc.set_embedding(&[0.1, 0.2]);

        let err = codec.encode(&doc).unwrap_err();
        assert!(matches!(err, StoreError::ValidationError(_)));
    }

    #[test]
    fn test_encode_skips_reserved_collisions() {
        let codec = codec();
        let doc = Document::with_id("doc-1", "text")
            .with_metadata("id", json!("sneaky"))
            .with_metadata("content", json!("sneaky"))
            .with_metadata("vector", json!([1.0]))
            .with_metadata("category", json!("kept"));

        let record = codec.encode(&doc).unwrap();
        let fields = record.as_object().unwrap();
        assert_eq!(fields["id"], json!("doc-1"));
        assert!(!fields.contains_key("metadata_id"));
        assert!(!fields.contains_key("metadata_content"));
        assert!(!fields.contains_key("metadata_vector"));
        assert_eq!(fields["metadata_category"], json!("kept"));
    }

    #[test]
    fn test_decode_multivalued_takes_first() {
        let codec = codec();
        let record = json!({
            "id": ["doc-1", "doc-1-dup"],
            "content": ["first text", "second text"],
            "metadata_category": ["AI", "ML"]
        });

        let doc = codec.decode(&record, -1.0).unwrap().unwrap();
        assert_eq!(doc.id, "doc-1");
        assert_eq!(doc.text, "first text");
        assert_eq!(doc.metadata.get("category"), Some(&json!("AI")));
    }

    #[test]
    fn test_decode_threshold_drops_low_scores() {
        let codec = codec();
        let record = json!({"id": "doc-1", "content": "text", "score": 0.4});

        assert!(codec.decode(&record, 0.5).unwrap().is_none());
        let kept = codec.decode(&record, 0.3).unwrap().unwrap();
        assert_eq!(kept.score(), Some(0.4));
        // Negative threshold disables filtering.
        assert!(codec.decode(&record, -1.0).unwrap().is_some());
    }

    #[test]
    fn test_decode_without_score_survives_threshold() {
        // Score only materializes at query time; records without one pass.
        let codec = codec();
        let record = json!({"id": "doc-1", "content": "text"});
        assert!(codec.decode(&record, 0.9).unwrap().is_some());
    }

    #[test]
    fn test_decode_declared_field_narrowing() {
        let codec = DocumentCodec::new(
            StoreOptions::new().with_field_type("year", FieldType::Int),
        );
        let record = json!({"id": "doc-1", "content": "text", "metadata_year": [2024i64]});

        let doc = codec.decode(&record, -1.0).unwrap().unwrap();
        assert_eq!(doc.metadata.get("year"), Some(&json!(2024)));
    }

    #[test]
    fn test_decode_missing_id_is_engine_error() {
        let codec = codec();
        let record = json!({"content": "text"});
        assert!(matches!(
            codec.decode(&record, -1.0),
            Err(StoreError::EngineError(_))
        ));
    }
}
