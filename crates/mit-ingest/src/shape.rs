//! Payload shape detection.
//!
//! Exports arrive in one of a fixed set of layouts. [`Shape::detect`] decides
//! which one a payload uses, in this order:
//!
//! 1. [`Shape::LineDelimited`] -- one JSON object per line, at least one of
//!    them with an `_id.$oid` identifier.
//! 2. [`Shape::SummaryCount`] -- an `imdata` envelope whose first element is
//!    a `moCount` object.
//! 3. [`Shape::FlatArray`] -- an `imdata` envelope holding an array of MOs.
//! 4. [`Shape::Tree`] -- anything else; the whole payload is one MO tree.

use serde_json::Value;

/// One line of a line-delimited document export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineDocument {
    /// The opaque `_id.$oid` identifier, empty if the line has none.
    pub oid: String,
    /// The line exactly as it appeared in the export.
    pub raw: String,
}

/// The detected layout of one payload, carrying its decoded content.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    LineDelimited(Vec<LineDocument>),
    /// The attributes of the `moCount` object.
    SummaryCount(Value),
    /// The elements of `imdata`.
    FlatArray(Vec<Value>),
    Tree(Value),
}

impl Shape {
    /// Detect the shape of a payload.
    ///
    /// Returns `Ok(None)` for an empty or whitespace-only payload.
    pub fn detect(body: &[u8]) -> Result<Option<Shape>, serde_json::Error> {
        let lines: Vec<&[u8]> = body
            .split(|b| *b == b'\n')
            .map(<[u8]>::trim_ascii)
            .filter(|line| !line.is_empty())
            .collect();
        if lines.is_empty() {
            return Ok(None);
        }

        if let Some(documents) = line_documents(&lines) {
            return Ok(Some(Shape::LineDelimited(documents)));
        }

        let payload: Value = serde_json::from_slice(body)?;
        Ok(Some(Shape::classify(payload)))
    }

    /// Classify an already-decoded JSON payload.
    pub fn classify(mut payload: Value) -> Shape {
        if mit_json::get_path(&payload, "imdata.0.moCount").is_some() {
            let attributes = payload
                .pointer_mut("/imdata/0/moCount/attributes")
                .map(Value::take)
                .unwrap_or(Value::Null);
            return Shape::SummaryCount(attributes);
        }
        if let Some(Value::Array(items)) = payload.get_mut("imdata") {
            return Shape::FlatArray(std::mem::take(items));
        }
        Shape::Tree(payload)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Shape::LineDelimited(_) => "line-delimited",
            Shape::SummaryCount(_) => "summary-count",
            Shape::FlatArray(_) => "flat-array",
            Shape::Tree(_) => "tree",
        }
    }
}

/// Every line as a document, or `None` if some line is not a standalone JSON
/// object or no line carries `_id.$oid`. A line without an identifier gets
/// an empty `oid`.
fn line_documents(lines: &[&[u8]]) -> Option<Vec<LineDocument>> {
    let mut documents = Vec::with_capacity(lines.len());
    for line in lines {
        // Cheap rejection of pretty-printed documents before parsing.
        if !line.starts_with(b"{") || !line.ends_with(b"}") {
            return None;
        }
        let value: Value = serde_json::from_slice(line).ok()?;
        let oid = mit_json::get_str(&value, "_id.$oid")
            .unwrap_or_default()
            .to_string();
        let raw = std::str::from_utf8(line).ok()?.to_string();
        documents.push(LineDocument { oid, raw });
    }
    documents
        .iter()
        .any(|doc| !doc.oid.is_empty())
        .then_some(documents)
}
