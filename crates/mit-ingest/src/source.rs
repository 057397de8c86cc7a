//! Export sources.
//!
//! A [`Source`] lists [`Entry`] values: a class hint plus a lazy reader for
//! the entry's bytes. Two providers exist:
//!
//! - [`FolderSource`] -- a directory tree of `<class>.json` files, e.g. an
//!   extracted collection archive
//! - [`MemSource`] -- an explicit in-memory list, for passing collection
//!   results straight through without touching disk

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use walkdir::WalkDir;

use crate::error::SourceError;

type Reader = Arc<dyn Fn() -> io::Result<Vec<u8>> + Send + Sync>;

/// One ingestible unit of an export.
#[derive(Clone)]
pub struct Entry {
    /// The class hint, taken from the file stem for folder sources.
    pub class: String,
    reader: Reader,
}

impl Entry {
    /// An entry whose bytes are produced by `reader` on demand.
    pub fn new<F>(class: impl Into<String>, reader: F) -> Self
    where
        F: Fn() -> io::Result<Vec<u8>> + Send + Sync + 'static,
    {
        Self {
            class: class.into(),
            reader: Arc::new(reader),
        }
    }

    /// An entry backed by bytes already in memory.
    pub fn from_bytes(class: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let bytes: Vec<u8> = bytes.into();
        let bytes: Arc<[u8]> = bytes.into();
        Self::new(class, move || Ok(bytes.to_vec()))
    }

    /// An entry read from `path` when consumed.
    pub fn from_path(class: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self::new(class, move || std::fs::read(&path))
    }

    /// Read the entry's bytes.
    pub fn read(&self) -> io::Result<Vec<u8>> {
        (self.reader)()
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry").field("class", &self.class).finish()
    }
}

/// A supplier of export entries.
pub trait Source {
    /// List the entries to ingest, in ingestion order.
    fn entries(&self) -> Result<Vec<Entry>, SourceError>;
}

/// In-memory source.
#[derive(Clone, Debug, Default)]
pub struct MemSource {
    entries: Vec<Entry>,
}

impl MemSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn push(&mut self, entry: Entry) -> &mut Self {
        self.entries.push(entry);
        self
    }

    /// Builder form of [`MemSource::push`] for in-memory bytes.
    pub fn with(mut self, class: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.entries.push(Entry::from_bytes(class, bytes));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Source for MemSource {
    fn entries(&self) -> Result<Vec<Entry>, SourceError> {
        Ok(self.entries.clone())
    }
}

/// Directory-backed source.
///
/// Every `*.json` file below the root becomes one entry whose class is the
/// file name without the extension. Other files are ignored. Entries are
/// listed in file-name order, directories depth first.
#[derive(Clone, Debug)]
pub struct FolderSource {
    path: PathBuf,
}

impl FolderSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Source for FolderSource {
    fn entries(&self) -> Result<Vec<Entry>, SourceError> {
        if !self.path.is_dir() {
            return Err(SourceError::NotADirectory(self.path.clone()));
        }
        let mut entries = Vec::new();
        for dir_entry in WalkDir::new(&self.path).sort_by_file_name() {
            let dir_entry = dir_entry?;
            if dir_entry.file_type().is_dir() {
                continue;
            }
            let Some(class) = dir_entry
                .file_name()
                .to_str()
                .and_then(|name| name.strip_suffix(".json"))
            else {
                continue;
            };
            entries.push(Entry::from_path(class, dir_entry.path()));
        }
        Ok(entries)
    }
}
