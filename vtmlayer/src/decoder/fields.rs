//! Field numbers of the tile schema.
//!
//! Each field starts with a varint `(field << 3) | wire_type`. The decoder
//! only looks at the field number; the schema fixes every field's encoding.

/// Tile format version this decoder understands.
pub const TILE_VERSION: u32 = 4;

pub const TAG_TILE_VERSION: u32 = 1;
pub const TAG_TILE_NUM_TAGS: u32 = 11;
pub const TAG_TILE_NUM_KEYS: u32 = 12;
pub const TAG_TILE_NUM_VALUES: u32 = 13;
pub const TAG_TILE_TAG_KEYS: u32 = 14;
pub const TAG_TILE_TAG_VALUES: u32 = 15;
pub const TAG_TILE_TAGS: u32 = 16;
pub const TAG_TILE_LINE: u32 = 21;
pub const TAG_TILE_POLY: u32 = 22;
pub const TAG_TILE_POINT: u32 = 23;

pub const TAG_ELEM_NUM_INDICES: u32 = 1;
pub const TAG_ELEM_NUM_TAGS: u32 = 2;
pub const TAG_ELEM_TAGS: u32 = 11;
pub const TAG_ELEM_INDEX: u32 = 12;
pub const TAG_ELEM_COORDS: u32 = 13;
pub const TAG_ELEM_LAYER: u32 = 21;

pub const WIRE_VARINT: u32 = 0;
pub const WIRE_LENGTH_DELIMITED: u32 = 2;

/// Build a field key.
#[inline]
pub const fn field_key(tag: u32, wire_type: u32) -> u32 {
    (tag << 3) | wire_type
}
