//! Tag model and lookup tables.
//!
//! Tiles reference their key/value attributes by small integer index. Indices
//! below [`ATTRIB_OFFSET`] address the fixed dictionary in [`dictionary`],
//! indices at or above it address the per-tile strings declared at the start
//! of the payload.
//!
//! The decoder resolves the tile's tag-pair array once into a [`TagSet`], and
//! every element then picks its tags from that set by position.

mod dictionary;
mod set;

pub use dictionary::{
    resolve_key, resolve_value, static_key, static_value, ATTRIB_OFFSET, KEYS, MAX_KEY, MAX_VALUE,
    VALUES,
};
pub use set::TagSet;

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

/// A key/value attribute attached to a way or point.
///
/// Both strings are reference counted so cloning a tag into many elements of
/// one tile is cheap.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Tag {
    key: Arc<str>,
    value: Arc<str>,
}

impl Tag {
    /// Create a tag from shared strings.
    pub fn new(key: Arc<str>, value: Arc<str>) -> Self {
        Self { key, value }
    }

    /// The attribute key, e.g. `highway`.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The attribute value, e.g. `residential`.
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl From<(&str, &str)> for Tag {
    fn from((key, value): (&str, &str)) -> Self {
        Self::new(Arc::from(key), Arc::from(value))
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}
