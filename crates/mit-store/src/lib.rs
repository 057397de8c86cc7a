//! Key-value index for flattened MIT records.
//!
//! Every record is stored under its `class:dn` key with its attributes as
//! JSON text. Keys are kept in ascending order so that class lookups
//! (`fvTenant:*`) are range scans.
//!
//! # Storage Backends
//!
//! All backends implement the [`IndexStore`] trait:
//!
//! - [`InMemoryIndex`] -- `BTreeMap`-based store behind a `RwLock`
//!
//! # Design Rules
//!
//! 1. Last write wins. A write to an existing key replaces it without merging.
//! 2. A batch is applied under one write lock; readers see all of it or none.
//! 3. Queries never mutate.
//! 4. `find` on a `class:*` pattern with no matches is an error; every other
//!    empty query is not.
//! 5. Nothing is persisted. An index lives as long as its owner.

pub mod document;
pub mod error;
pub mod memory;
pub mod pattern;
pub mod traits;

pub use document::Document;
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryIndex;
pub use pattern::KeyPattern;
pub use traits::IndexStore;
