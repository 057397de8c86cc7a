//! Foundation types for the MIT index.
//!
//! The Management Information Tree (MIT) is a forest of typed objects. Every
//! object has a class name and a hierarchical distinguished name (DN). The
//! index flattens that forest into one keyspace of `class:dn` keys.
//!
//! # Key Types
//!
//! - [`Dn`] -- A distinguished name as an ordered list of segments
//! - [`record_key`] -- Canonical `class:dn` key formatting
//! - [`explicit_dn`] -- The non-empty `dn` an object already carries

pub mod dn;
pub mod record;

pub use dn::{Dn, DN_SEPARATOR};
pub use record::{explicit_dn, record_key, KEY_SEPARATOR};
