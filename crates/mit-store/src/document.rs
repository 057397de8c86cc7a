//! Stored record payloads.

use std::fmt;

use serde_json::Value;

use crate::error::{StoreError, StoreResult};

/// The JSON text of one stored record, returned exactly as it was written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    raw: String,
}

impl Document {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// The stored text, byte for byte.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn into_raw(self) -> String {
        self.raw
    }

    /// Parse the stored text.
    pub fn value(&self) -> StoreResult<Value> {
        mit_json::unmarshal(&self.raw).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// The string at a dotted attribute path, or `None` if absent, not a
    /// string, or the payload is not valid JSON.
    pub fn get_str(&self, path: &str) -> Option<String> {
        let value = self.value().ok()?;
        mit_json::get_str(&value, path).map(str::to_string)
    }

    /// The record's `dn` attribute.
    pub fn dn(&self) -> Option<String> {
        self.get_str("dn")
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_is_preserved() {
        let raw = r#"{ "b" : "c" }"#;
        let doc = Document::new(raw);
        assert_eq!(doc.raw(), raw);
        assert_eq!(doc.to_string(), raw);
        assert_eq!(doc.into_raw(), raw);
    }

    #[test]
    fn field_access() {
        let doc = Document::new(r#"{"dn":"uni/tn-a","name":"a","nested":{"x":"y"}}"#);
        assert_eq!(doc.dn().as_deref(), Some("uni/tn-a"));
        assert_eq!(doc.get_str("nested.x").as_deref(), Some("y"));
        assert_eq!(doc.get_str("missing"), None);
    }

    #[test]
    fn invalid_json_has_no_fields() {
        let doc = Document::new("not json");
        assert!(doc.value().is_err());
        assert_eq!(doc.dn(), None);
    }
}
