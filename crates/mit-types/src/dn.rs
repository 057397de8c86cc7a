//! Distinguished names.
//!
//! A DN is a `/`-joined path such as `uni/tn-common/ap-web`. Each segment is
//! the relative name (RN) contributed by one level of the tree.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Separator between DN segments.
pub const DN_SEPARATOR: char = '/';

/// A distinguished name held as its ordered segments.
///
/// Synthesis only ever appends: [`Dn::child`] returns a new DN with one more
/// segment and leaves the parent untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dn {
    segments: Vec<String>,
}

impl Dn {
    /// The empty DN, used as the parent of a tree root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Split an explicit DN string on `/`, keeping every segment verbatim.
    pub fn parse(dn: &str) -> Self {
        Self {
            segments: dn.split(DN_SEPARATOR).map(str::to_string).collect(),
        }
    }

    /// A new DN extending this one by a single relative name.
    pub fn child(&self, rn: impl Into<String>) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend(self.segments.iter().cloned());
        segments.push(rn.into());
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The last segment, if any.
    pub fn rn(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Number of segments (tree depth).
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for Dn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{DN_SEPARATOR}")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl From<&str> for Dn {
    fn from(dn: &str) -> Self {
        Self::parse(dn)
    }
}
