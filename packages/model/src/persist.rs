//! # Persistence Boundary
//!
//! Documents are exchanged as a plain nested value: an array of nodes where
//! every node is either a leaf `{"text": string}` or an element
//! `{"children": [...]}` with at least one child.
//!
//! Hosts must never crash on stored content, so the lenient entry points
//! replace anything that fails validation with
//! [`Document::invalid_content`].

use serde_json::Value;
use tracing::warn;

use crate::{Document, Mark, ModelError, ModelResult};

/// Whether `value` is a valid stored document
pub fn is_valid_value(value: &Value) -> bool {
    match value {
        Value::Array(nodes) => !nodes.is_empty() && nodes.iter().all(is_valid_node),
        _ => false,
    }
}

/// Whether `value` is a valid stored node
pub fn is_valid_node(value: &Value) -> bool {
    let Value::Object(fields) = value else {
        return false;
    };

    if let Some(text) = fields.get("text") {
        let marks_are_flags = Mark::ALL
            .iter()
            .all(|mark| fields.get(mark.name()).map_or(true, Value::is_boolean));
        return text.is_string() && marks_are_flags;
    }

    match fields.get("children") {
        Some(Value::Array(children)) => !children.is_empty() && children.iter().all(is_valid_node),
        _ => false,
    }
}

impl Document {
    /// Strict conversion from a stored value
    pub fn parse_value(value: Value) -> ModelResult<Document> {
        if !is_valid_value(&value) {
            return Err(ModelError::InvalidValue(
                "expected a non-empty array of leaves and non-empty elements".to_string(),
            ));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Lenient conversion; invalid values become the sentinel document
    pub fn from_value(value: Value) -> Document {
        match Document::parse_value(value) {
            Ok(document) => document,
            Err(err) => {
                warn!(error = %err, "Replacing invalid stored document with sentinel");
                Document::invalid_content()
            }
        }
    }

    /// Lenient conversion from JSON text
    pub fn from_json(source: &str) -> Document {
        match serde_json::from_str::<Value>(source) {
            Ok(value) => Document::from_value(value),
            Err(err) => {
                warn!(error = %err, "Stored document is not JSON");
                Document::invalid_content()
            }
        }
    }

    pub fn to_value(&self) -> ModelResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn to_json_pretty(&self) -> ModelResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ElementType, Path};
    use serde_json::json;

    #[test]
    fn test_valid_value() {
        let value = json!([
            { "type": "paragraph", "children": [{ "text": "hello" }] },
            { "type": "image-block", "children": [
                { "type": "image", "objectKey": "k1", "children": [{ "text": "" }] },
                { "type": "caption", "children": [{ "text": "" }] }
            ]}
        ]);
        assert!(is_valid_value(&value));

        let doc = Document::from_value(value);
        assert!(!doc.is_invalid_sentinel());
        assert_eq!(doc.type_at(&Path::from([1, 0])), Some(&ElementType::Image));
    }

    #[test]
    fn test_empty_element_is_invalid() {
        let value = json!([{ "type": "paragraph", "children": [] }]);
        assert!(!is_valid_value(&value));
        assert!(Document::from_value(value).is_invalid_sentinel());
    }

    #[test]
    fn test_non_string_text_is_invalid() {
        assert!(!is_valid_node(&json!({ "text": 4 })));
        assert!(!is_valid_value(&json!({ "text": "not an array" })));
    }

    #[test]
    fn test_malformed_mark_becomes_sentinel() {
        let value = json!([{ "type": "paragraph", "children": [{ "text": "hello", "bold": "yes" }] }]);
        assert!(!is_valid_value(&value));
        assert!(Document::from_value(value).is_invalid_sentinel());
    }

    #[test]
    fn test_garbage_json_becomes_sentinel() {
        assert!(Document::from_json("{not json").is_invalid_sentinel());
        assert!(Document::from_json("[]").is_invalid_sentinel());
    }

    #[test]
    fn test_round_trip_value() {
        let doc = Document::default();
        let value = doc.to_value().unwrap();
        assert_eq!(value, json!([{ "type": "paragraph", "children": [{ "text": "" }] }]));
        assert_eq!(Document::parse_value(value).unwrap(), doc);
    }
}
