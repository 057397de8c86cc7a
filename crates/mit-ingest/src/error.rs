//! Error types for the ingest crate.

use std::path::PathBuf;

/// Errors from listing a source's entries.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Walking the export directory failed.
    #[error("cannot walk export directory: {0}")]
    Walk(#[from] walkdir::Error),

    /// The export path is not a directory.
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
}

/// Errors that abort a load.
///
/// A class with no RN template is not an error: its nodes are dropped.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The source could not list its entries.
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// An entry's bytes could not be read.
    #[error("cannot read entry {class:?}: {source}")]
    SourceRead {
        class: String,
        #[source]
        source: std::io::Error,
    },

    /// An entry's content is not valid JSON.
    #[error("malformed JSON in entry {class:?}: {source}")]
    Parse {
        class: String,
        #[source]
        source: serde_json::Error,
    },

    /// The index rejected a write.
    #[error("store error: {0}")]
    Store(#[from] mit_store::StoreError),
}

/// Convenience alias for ingest results.
pub type IngestResult<T> = Result<T, IngestError>;
