/// Errors from index store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No record under the key, or a `class:*` query matched nothing.
    #[error("not found: {0}")]
    NotFound(String),

    /// A value could not be decoded or encoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A writer panicked while holding the lock; the index is unusable.
    #[error("index lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    /// Returns `true` for [`StoreError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
