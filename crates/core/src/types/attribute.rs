//! Variant attribute values.

use serde::{Deserialize, Serialize};

/// A single attribute value on a product variant (e.g. size, color, capacity).
///
/// Attributes are an open string-keyed map; values are limited to strings,
/// numbers, and booleans. Stored as JSONB in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    String(String),
    Number(f64),
    Boolean(bool),
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_untagged_serialization() {
        assert_eq!(
            serde_json::to_string(&AttributeValue::from("XL")).unwrap(),
            "\"XL\""
        );
        assert_eq!(
            serde_json::to_string(&AttributeValue::from(42.0)).unwrap(),
            "42.0"
        );
        assert_eq!(
            serde_json::to_string(&AttributeValue::from(true)).unwrap(),
            "true"
        );
    }

    #[test]
    fn test_attribute_map_roundtrip() {
        let mut attrs: BTreeMap<String, AttributeValue> = BTreeMap::new();
        attrs.insert("size".into(), "XL".into());
        attrs.insert("waterproof".into(), true.into());

        let json = serde_json::to_string(&attrs).unwrap();
        let parsed: BTreeMap<String, AttributeValue> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, attrs);
    }
}
