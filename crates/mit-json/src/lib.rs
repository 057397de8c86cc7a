//! Path-based JSON helpers.
//!
//! Paths are dot-separated member names (`imdata.0.moCount`); a segment that
//! parses as an integer indexes into an array.
//!
//! The string-level helpers ([`set_path`], [`set_raw`], [`marshal`]) never fail:
//! errors are logged and the best available result is returned. Ingestion code
//! that must stop on bad input works on [`serde_json::Value`] directly instead.
//!
//! The flattener injects each record's `dn` with [`set_path`]; the store
//! marshals `set_many` values with [`marshal`] and decodes documents with
//! [`unmarshal`]. [`set_raw`] and [`set_value`] are exported for callers that
//! patch stored payloads.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::error;

/// Errors from value-level path operations.
#[derive(Debug, thiserror::Error)]
pub enum JsonError {
    /// The path was empty.
    #[error("empty path")]
    EmptyPath,

    /// A path segment traverses a scalar value.
    #[error("cannot descend into non-container at {0:?}")]
    NotAContainer(String),

    /// An array index is past the end of the array.
    #[error("array index {index} out of bounds at {segment:?}")]
    IndexOutOfBounds { segment: String, index: usize },

    /// Parse or serialization failure.
    #[error("json error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Look up the value at a dotted path.
pub fn get_path<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(doc);
    }
    path.split('.').try_fold(doc, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// The string at a dotted path, if the value there is a string.
pub fn get_str<'a>(doc: &'a Value, path: &str) -> Option<&'a str> {
    get_path(doc, path).and_then(Value::as_str)
}

/// Set the value at a dotted path, creating intermediate objects as needed.
///
/// A `null` document is replaced by an object. An index equal to an array's
/// length appends.
pub fn set_value(doc: &mut Value, path: &str, value: Value) -> Result<(), JsonError> {
    if path.is_empty() {
        return Err(JsonError::EmptyPath);
    }
    let segments: Vec<&str> = path.split('.').collect();
    let mut current = doc;
    for (i, segment) in segments.iter().enumerate() {
        let last = i + 1 == segments.len();
        if current.is_null() {
            *current = Value::Object(Map::new());
        }
        current = match current {
            Value::Object(map) => {
                if last {
                    map.insert((*segment).to_string(), value);
                    return Ok(());
                }
                map.entry((*segment).to_string()).or_insert(Value::Null)
            }
            Value::Array(items) => {
                let index = segment
                    .parse::<usize>()
                    .map_err(|_| JsonError::NotAContainer((*segment).to_string()))?;
                if index > items.len() {
                    return Err(JsonError::IndexOutOfBounds {
                        segment: (*segment).to_string(),
                        index,
                    });
                }
                if index == items.len() {
                    items.push(Value::Null);
                }
                if last {
                    items[index] = value;
                    return Ok(());
                }
                &mut items[index]
            }
            _ => return Err(JsonError::NotAContainer((*segment).to_string())),
        };
    }
    Ok(())
}

/// Set a serializable value at `path` in the JSON text `body`.
///
/// On failure the error is logged and `body` is returned unchanged.
pub fn set_path<T: Serialize>(body: &str, path: &str, value: T) -> String {
    let result = serde_json::to_value(value)
        .map_err(JsonError::from)
        .and_then(|value| set_in_text(body, path, value));
    match result {
        Ok(updated) => updated,
        Err(e) => {
            error!(path, error = %e, "cannot set JSON value");
            body.to_string()
        }
    }
}

/// Set raw JSON text at `path` in the JSON text `body`.
///
/// On failure the error is logged and `body` is returned unchanged.
pub fn set_raw(body: &str, path: &str, raw: &str) -> String {
    let result = serde_json::from_str::<Value>(raw)
        .map_err(JsonError::from)
        .and_then(|value| set_in_text(body, path, value));
    match result {
        Ok(updated) => updated,
        Err(e) => {
            error!(path, error = %e, "cannot set raw JSON value");
            body.to_string()
        }
    }
}

fn set_in_text(body: &str, path: &str, value: Value) -> Result<String, JsonError> {
    let mut doc = if body.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(body)?
    };
    set_value(&mut doc, path, value)?;
    Ok(serde_json::to_string(&doc)?)
}

/// Serialize a value to compact JSON text.
///
/// On failure the error is logged and an empty string is returned.
pub fn marshal<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        error!(error = %e, "cannot marshal JSON");
        String::new()
    })
}

/// Deserialize JSON text into a typed value.
pub fn unmarshal<T: DeserializeOwned>(data: &str) -> Result<T, JsonError> {
    Ok(serde_json::from_str(data)?)
}
