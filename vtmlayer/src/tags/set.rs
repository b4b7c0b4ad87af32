//! Per-tile resolved tag table.

use std::sync::Arc;

use super::dictionary::{resolve_key, resolve_value};
use super::Tag;
use crate::decoder::DecodeError;

/// Ordered tags of one tile, referenced by position from its elements.
///
/// The set is cleared at the start of every tile and filled from the tile's
/// tag-pair array. Storage is kept across tiles.
#[derive(Debug, Default)]
pub struct TagSet {
    tags: Vec<Tag>,
}

impl TagSet {
    /// Create an empty set with room for `capacity` tags.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tags: Vec::with_capacity(capacity),
        }
    }

    /// Remove all tags, keeping the allocation.
    pub fn clear(&mut self) {
        self.tags.clear();
    }

    /// Number of resolved tags.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Whether no tags have been resolved yet.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Tag at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&Tag> {
        self.tags.get(index)
    }

    /// Append an already resolved tag.
    pub fn push(&mut self, tag: Tag) {
        self.tags.push(tag);
    }

    /// Resolve a flat `[key, value, key, value, ...]` index array and append
    /// the resulting tags.
    ///
    /// Indices below the attribute offset address the fixed dictionary, the
    /// rest address `tile_keys` / `tile_values`. A trailing unpaired index is
    /// ignored.
    pub fn resolve_pairs(
        &mut self,
        pairs: &[u32],
        tile_keys: &[Arc<str>],
        tile_values: &[Arc<str>],
    ) -> Result<(), DecodeError> {
        for pair in pairs.chunks_exact(2) {
            let key = resolve_key(pair[0], tile_keys)
                .ok_or(DecodeError::TagIndexOutOfRange { index: pair[0] })?;
            let value = resolve_value(pair[1], tile_values)
                .ok_or(DecodeError::TagIndexOutOfRange { index: pair[1] })?;
            self.tags.push(Tag::new(key, value));
        }
        Ok(())
    }

    /// Pick the tags an element references by position in this set.
    pub fn select(&self, indices: &[u32]) -> Result<Vec<Tag>, DecodeError> {
        indices
            .iter()
            .map(|&index| {
                self.tags
                    .get(index as usize)
                    .cloned()
                    .ok_or(DecodeError::TagIndexOutOfRange { index })
            })
            .collect()
    }
}
