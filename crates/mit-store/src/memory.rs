use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::pattern;
use crate::traits::IndexStore;

/// In-memory, `BTreeMap`-based index.
///
/// Keys are held in order so class queries are range scans over the literal
/// prefix of the pattern. Readers share the `RwLock`; a batch holds the write
/// lock for its whole duration.
pub struct InMemoryIndex {
    entries: RwLock<BTreeMap<String, String>>,
}

impl InMemoryIndex {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    fn read_lock(&self) -> StoreResult<RwLockReadGuard<'_, BTreeMap<String, String>>> {
        self.entries.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write_lock(&self) -> StoreResult<RwLockWriteGuard<'_, BTreeMap<String, String>>> {
        self.entries.write().map_err(|_| StoreError::LockPoisoned)
    }

    /// Number of records currently stored.
    ///
    /// Counts through a poisoned lock: the map is still whole, only a write
    /// was interrupted.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All keys in ascending order.
    pub fn keys(&self) -> StoreResult<Vec<String>> {
        Ok(self.read_lock()?.keys().cloned().collect())
    }

    /// Record count per class (the part of each key before the first `:`).
    pub fn classes(&self) -> StoreResult<BTreeMap<String, usize>> {
        let map = self.read_lock()?;
        let mut counts = BTreeMap::new();
        for key in map.keys() {
            let class = key.split_once(':').map_or(key.as_str(), |(class, _)| class);
            *counts.entry(class.to_string()).or_insert(0) += 1;
        }
        Ok(counts)
    }

    /// Remove all records.
    pub fn clear(&self) -> StoreResult<()> {
        self.write_lock()?.clear();
        Ok(())
    }
}

impl Default for InMemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexStore for InMemoryIndex {
    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.write_lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn set_batch(&self, entries: Vec<(String, String)>) -> StoreResult<()> {
        let count = entries.len();
        let mut map = self.write_lock()?;
        map.extend(entries);
        debug!(count, "index batch applied");
        Ok(())
    }

    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.read_lock()?.get(key).cloned())
    }

    fn ascend(&self, pattern: &str, visit: &mut dyn FnMut(&str, &str) -> bool) -> StoreResult<()> {
        let map = self.read_lock()?;
        let prefix = pattern::literal_prefix(pattern);
        let range = map.range::<str, _>((Bound::Included(prefix), Bound::Unbounded));
        for (key, value) in range {
            if !key.starts_with(prefix) {
                break;
            }
            if pattern::matches(pattern, key) && !visit(key, value) {
                break;
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryIndex")
            .field("record_count", &self.len())
            .finish()
    }
}
