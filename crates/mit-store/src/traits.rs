use serde::Serialize;
use serde_json::Value;

use crate::document::Document;
use crate::error::{StoreError, StoreResult};
use crate::pattern::{self, KeyPattern};

/// Ordered key-value index of MIT records.
///
/// Implementations supply the four primitives; the query surface (`get`,
/// `find`, `find_one`, `set_many`, `set_raw`) is built on top of them.
///
/// All implementations must satisfy these invariants:
/// - Writes are upserts. The last write to a key wins.
/// - A batch becomes visible to readers all at once.
/// - `ascend` visits keys in ascending byte order.
pub trait IndexStore: Send + Sync {
    /// Insert or replace one value.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Insert or replace many values as one atomic batch.
    fn set_batch(&self, entries: Vec<(String, String)>) -> StoreResult<()>;

    /// Read the value under an exact key. `Ok(None)` if absent.
    fn read(&self, key: &str) -> StoreResult<Option<String>>;

    /// Visit every `(key, value)` whose key matches the glob `pattern`, in
    /// ascending key order, until `visit` returns `false`.
    fn ascend(&self, pattern: &str, visit: &mut dyn FnMut(&str, &str) -> bool) -> StoreResult<()>;

    /// Serialize each value to JSON and insert all of them as one batch.
    ///
    /// A value that cannot be serialized is logged and stored as an empty
    /// string rather than failing the batch.
    fn set_many<K, V, I>(&self, values: I) -> StoreResult<()>
    where
        Self: Sized,
        K: Into<String>,
        V: Serialize,
        I: IntoIterator<Item = (K, V)>,
    {
        let entries = values
            .into_iter()
            .map(|(k, v)| (k.into(), mit_json::marshal(&v)))
            .collect();
        self.set_batch(entries)
    }

    /// Insert every member of a JSON object as `key -> raw member JSON`.
    fn set_raw(&self, json: &str) -> StoreResult<()>
    where
        Self: Sized,
    {
        let value: Value =
            serde_json::from_str(json).map_err(|e| StoreError::Serialization(e.to_string()))?;
        let Value::Object(members) = value else {
            return Err(StoreError::Serialization(
                "set_raw expects a JSON object".to_string(),
            ));
        };
        let entries = members
            .into_iter()
            .map(|(k, v)| (k, v.to_string()))
            .collect();
        self.set_batch(entries)
    }

    /// Exact lookup. Fails with [`StoreError::NotFound`] when absent.
    fn get(&self, key: impl KeyPattern) -> StoreResult<Document>
    where
        Self: Sized,
    {
        let key = key.into_pattern();
        match self.read(&key)? {
            Some(value) => Ok(Document::new(value)),
            None => Err(StoreError::NotFound(key)),
        }
    }

    /// Every record whose key matches the pattern, in ascending key order.
    ///
    /// An empty result is an error only when the pattern ends in `:*`.
    fn find(&self, pattern: impl KeyPattern) -> StoreResult<Vec<Document>>
    where
        Self: Sized,
    {
        let pattern = pattern::normalize(&pattern.into_pattern());
        let mut found = Vec::new();
        self.ascend(&pattern, &mut |_, value| {
            found.push(Document::new(value));
            true
        })?;
        if found.is_empty() && pattern::is_class_wildcard(&pattern) {
            return Err(StoreError::NotFound(pattern));
        }
        Ok(found)
    }

    /// The first matching record in ascending key order, or `None`.
    ///
    /// Never reports [`StoreError::NotFound`], even for `class:*` patterns.
    fn find_one(&self, pattern: impl KeyPattern) -> StoreResult<Option<Document>>
    where
        Self: Sized,
    {
        let pattern = pattern::normalize(&pattern.into_pattern());
        let mut first = None;
        self.ascend(&pattern, &mut |_, value| {
            first = Some(Document::new(value));
            false
        })?;
        Ok(first)
    }
}
