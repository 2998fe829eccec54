//! Document decoder implementation.

use serde_json::Value;
use tracing::debug;

use crate::errors::PipelineError;
use corpus_indexer_shared::Document;

/// Decoder that turns `(id, payload)` pairs into documents.
///
/// Directory records are decoded up front with [`DocumentDecoder::decode`].
/// Feed records go through [`DocumentDecoder::passthrough`] and are decoded
/// by the index engine when the batch is applied.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentDecoder;

impl DocumentDecoder {
    /// Create a new decoder.
    pub fn new() -> Self {
        Self
    }

    /// Parse the payload as JSON of any shape.
    ///
    /// # Returns
    ///
    /// * `Ok(Document)` - Document holding the decoded value
    /// * `Err(PipelineError::DecodeError)` - If the payload is not valid JSON
    pub fn decode(&self, id: &str, raw: &[u8]) -> Result<Document, PipelineError> {
        let fields: Value = serde_json::from_slice(raw)
            .map_err(|e| PipelineError::decode(format!("Document '{}': {}", id, e)))?;

        debug!(id = %id, "Decoded document");
        Ok(Document::from_fields(id, fields))
    }

    /// Wrap the payload without decoding it.
    pub fn passthrough(&self, id: &str, raw: Vec<u8>) -> Document {
        Document::from_raw(id, raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corpus_indexer_shared::DocumentBody;
    use serde_json::json;

    #[test]
    fn test_decode_accepts_any_json_shape() {
        let decoder = DocumentDecoder::new();

        let doc = decoder
            .decode("21st_amendment", br#"{"name": "21st Amendment", "abv": 5.4}"#)
            .unwrap();
        assert_eq!(doc.id, "21st_amendment");
        assert_eq!(doc.fields(), Some(&json!({"name": "21st Amendment", "abv": 5.4})));

        let list = decoder.decode("list", b"[1, 2, 3]").unwrap();
        assert_eq!(list.fields(), Some(&json!([1, 2, 3])));
    }

    #[test]
    fn test_decode_is_deterministic() {
        let decoder = DocumentDecoder::new();
        let raw = br#"{"brewery": {"name": "Sierra Nevada", "city": "Chico"}, "tags": ["ale"]}"#;

        assert_eq!(
            decoder.decode("sierra", raw).unwrap(),
            decoder.decode("sierra", raw).unwrap()
        );
    }

    #[test]
    fn test_decode_rejects_malformed_payload() {
        let err = DocumentDecoder::new()
            .decode("broken", b"{\"name\": ")
            .unwrap_err();

        assert!(matches!(err, PipelineError::DecodeError(_)));
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn test_passthrough_keeps_bytes() {
        let doc = DocumentDecoder::new().passthrough("k1", b"not even json".to_vec());

        assert_eq!(doc.body, DocumentBody::Raw(b"not even json".to_vec()));
        assert!(doc.fields().is_none());
    }
}
