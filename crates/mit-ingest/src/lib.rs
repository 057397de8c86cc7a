//! Ingestion engine for the MIT index.
//!
//! Turns MIT exports into `class:dn` records:
//!
//! 1. A [`Source`] lists entries (one per exported class).
//! 2. [`Shape::detect`] decides each payload's layout.
//! 3. Tree-shaped payloads go through the [`Flattener`], which resolves
//!    missing DNs with per-class RN templates ([`TemplateTable`]).
//! 4. Records land in an [`mit_store::IndexStore`].
//!
//! # Example
//!
//! ```
//! use mit_ingest::{load, MemSource};
//! use mit_store::IndexStore;
//!
//! let src = MemSource::new().with(
//!     "fvTenant",
//!     r#"{"fvTenant":{"attributes":{"name":"a"},"children":[{"fvAp":{"attributes":{"name":"A1"}}}]}}"#,
//! );
//! let index = load(&src).unwrap();
//! assert!(index.get("fvTenant:tn-a").is_ok());
//! assert!(index.get("fvAp:tn-a/ap-A1").is_ok());
//! ```

pub mod error;
pub mod flatten;
pub mod loader;
pub mod shape;
pub mod source;
pub mod template;

pub use error::{IngestError, IngestResult, SourceError};
pub use flatten::Flattener;
pub use loader::{load, load_documents, load_with, LoadStats, Loader};
pub use shape::{LineDocument, Shape};
pub use source::{Entry, FolderSource, MemSource, Source};
pub use template::{embedded, render, resolve_dn, TemplateTable};
