//! Payload encoder for synthetic tiles.
//!
//! Writes the same field layout [`TileDecoder`](super::TileDecoder) reads.
//! Used by tests and by tooling that needs a tile without a server.
//!
//! ```
//! use vtmlayer::decoder::{ElementBuilder, PayloadBuilder, TileDecoder};
//! use vtmlayer::tile::Tile;
//!
//! let payload = PayloadBuilder::new()
//!     .version(4)
//!     .tile_keys(&["colour"])
//!     .tile_values(&["red"])
//!     .tag_pairs(&[(256, 256)])
//!     .element(ElementBuilder::point().tags(&[0]).position(2048, 1024))
//!     .build();
//!
//! let tile = Tile::new(14, 8803, 5374);
//! let decoded = TileDecoder::new()
//!     .decode(payload.as_slice(), payload.len(), &tile)
//!     .unwrap();
//! assert_eq!(decoded.pois().len(), 1);
//! ```

use super::fields::*;
use super::varint::{encode_varint32, zigzag_encode};
use crate::geometry::ElementKind;

fn write_varint_field(buf: &mut Vec<u8>, tag: u32, value: u32) {
    encode_varint32(field_key(tag, WIRE_VARINT), buf);
    encode_varint32(value, buf);
}

fn write_bytes_field(buf: &mut Vec<u8>, tag: u32, bytes: &[u8]) {
    encode_varint32(field_key(tag, WIRE_LENGTH_DELIMITED), buf);
    encode_varint32(bytes.len() as u32, buf);
    buf.extend_from_slice(bytes);
}

fn write_array_field(buf: &mut Vec<u8>, tag: u32, values: impl IntoIterator<Item = u32>) {
    let mut body = Vec::new();
    for value in values {
        encode_varint32(value, &mut body);
    }
    write_bytes_field(buf, tag, &body);
}

/// Builder for a whole tile payload.
#[derive(Debug, Clone, Default)]
pub struct PayloadBuilder {
    buf: Vec<u8>,
}

impl PayloadBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Format version field.
    pub fn version(mut self, version: u32) -> Self {
        write_varint_field(&mut self.buf, TAG_TILE_VERSION, version);
        self
    }

    /// Declare and write the per-tile key strings.
    ///
    /// The first key is addressed as `ATTRIB_OFFSET`, the next as
    /// `ATTRIB_OFFSET + 1` and so on.
    pub fn tile_keys(mut self, keys: &[&str]) -> Self {
        write_varint_field(&mut self.buf, TAG_TILE_NUM_KEYS, keys.len() as u32);
        for key in keys {
            write_bytes_field(&mut self.buf, TAG_TILE_TAG_KEYS, key.as_bytes());
        }
        self
    }

    /// Declare and write the per-tile value strings.
    pub fn tile_values(mut self, values: &[&str]) -> Self {
        write_varint_field(&mut self.buf, TAG_TILE_NUM_VALUES, values.len() as u32);
        for value in values {
            write_bytes_field(&mut self.buf, TAG_TILE_TAG_VALUES, value.as_bytes());
        }
        self
    }

    /// Declare the tile's tag set as `(key index, value index)` pairs.
    pub fn tag_pairs(mut self, pairs: &[(u32, u32)]) -> Self {
        write_varint_field(&mut self.buf, TAG_TILE_NUM_TAGS, pairs.len() as u32);
        write_array_field(
            &mut self.buf,
            TAG_TILE_TAGS,
            pairs.iter().flat_map(|&(k, v)| [k, v]),
        );
        self
    }

    /// Append a geometry element.
    pub fn element(mut self, element: ElementBuilder) -> Self {
        let tag = match element.kind {
            ElementKind::Line => TAG_TILE_LINE,
            ElementKind::Polygon => TAG_TILE_POLY,
            ElementKind::Point => TAG_TILE_POINT,
        };
        write_bytes_field(&mut self.buf, tag, &element.buf);
        self
    }

    /// Explicit zero terminator.
    pub fn terminator(mut self) -> Self {
        self.buf.push(0);
        self
    }

    /// Arbitrary varint field, for payloads the schema does not describe.
    pub fn raw_varint_field(mut self, tag: u32, value: u32) -> Self {
        write_varint_field(&mut self.buf, tag, value);
        self
    }

    /// Arbitrary string field written without its count.
    pub fn raw_string_field(mut self, tag: u32, value: &str) -> Self {
        write_bytes_field(&mut self.buf, tag, value.as_bytes());
        self
    }

    /// Finished payload bytes.
    pub fn build(self) -> Vec<u8> {
        self.buf
    }
}

/// Builder for one line, polygon or point element.
#[derive(Debug, Clone)]
pub struct ElementBuilder {
    kind: ElementKind,
    buf: Vec<u8>,
}

impl ElementBuilder {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            buf: Vec::new(),
        }
    }

    pub fn line() -> Self {
        Self::new(ElementKind::Line)
    }

    pub fn polygon() -> Self {
        Self::new(ElementKind::Polygon)
    }

    pub fn point() -> Self {
        Self::new(ElementKind::Point)
    }

    /// Reference tags by position in the tile's tag set.
    pub fn tags(mut self, indices: &[u32]) -> Self {
        write_varint_field(&mut self.buf, TAG_ELEM_NUM_TAGS, indices.len() as u32);
        write_array_field(&mut self.buf, TAG_ELEM_TAGS, indices.iter().copied());
        self
    }

    /// Per-ring vertex counts; zero entries separate polygon ring groups.
    pub fn rings(mut self, counts: &[u32]) -> Self {
        write_varint_field(&mut self.buf, TAG_ELEM_NUM_INDICES, counts.len() as u32);
        write_array_field(&mut self.buf, TAG_ELEM_INDEX, counts.iter().copied());
        self
    }

    /// Line or polygon vertices in tile units, written as running deltas.
    pub fn coordinates(mut self, points: &[(i32, i32)]) -> Self {
        let (mut last_x, mut last_y) = (0i32, 0i32);
        let deltas = points.iter().flat_map(|&(x, y)| {
            let dx = x.wrapping_sub(last_x);
            let dy = y.wrapping_sub(last_y);
            last_x = x;
            last_y = y;
            [zigzag_encode(dx), zigzag_encode(dy)]
        });
        let deltas: Vec<u32> = deltas.collect();
        write_array_field(&mut self.buf, TAG_ELEM_COORDS, deltas);
        self
    }

    /// Point position in tile units.
    pub fn position(self, x: i32, y: i32) -> Self {
        self.positions(&[(x, y)])
    }

    /// Several absolute point positions in one coordinate field.
    pub fn positions(mut self, points: &[(i32, i32)]) -> Self {
        write_array_field(
            &mut self.buf,
            TAG_ELEM_COORDS,
            points
                .iter()
                .flat_map(|&(x, y)| [zigzag_encode(x), zigzag_encode(y)]),
        );
        self
    }

    /// Layer override.
    pub fn layer(mut self, layer: u32) -> Self {
        write_varint_field(&mut self.buf, TAG_ELEM_LAYER, layer);
        self
    }

    /// Arbitrary varint sub-field.
    pub fn raw_varint_field(mut self, tag: u32, value: u32) -> Self {
        write_varint_field(&mut self.buf, tag, value);
        self
    }

    /// Arbitrary length-prefixed varint array sub-field, values written as
    /// given.
    pub fn raw_array_field(mut self, tag: u32, values: &[u32]) -> Self {
        write_array_field(&mut self.buf, tag, values.iter().copied());
        self
    }
}
