//! Tile payload decoder.
//!
//! A payload is a flat run of fields. Header fields declare the format
//! version and the per-tile key/value strings, then the tag-pair array
//! builds the tile's [`TagSet`]. Line, polygon and point elements follow;
//! each is a length-prefixed group of sub-fields.
//!
//! # Coordinates
//!
//! Line and polygon coordinates are zigzag-coded deltas, x then y, for all
//! rings of the element in one stream. The running position carries over
//! from ring to ring and from one ring group to the next; it is never reset
//! inside an element.

use std::io::Read;
use std::sync::Arc;

use tracing::debug;

use super::error::DecodeError;
use super::fields::*;
use super::stream::StreamDecoder;
use super::varint::zigzag_decode;
use crate::coord::GeoPoint;
use crate::geometry::{
    DecodedTile, ElementKind, PointOfInterest, Way, DEFAULT_LAYER, MAX_LAYER,
};
use crate::tags::{Tag, TagSet};
use crate::tile::Tile;

/// Rings of one way: outer ring first, then holes.
type RingGroup = Vec<Vec<GeoPoint>>;

/// Decodes tile payloads into [`DecodedTile`]s.
///
/// One decoder is meant to be reused for many tiles on the same thread; the
/// read buffer, scratch arrays and tag table keep their allocations between
/// calls.
#[derive(Debug, Default)]
pub struct TileDecoder {
    buffer: Vec<u8>,
    scratch: Vec<u32>,
    tags: TagSet,
}

/// Per-tile decode state.
struct TileState {
    tile: Tile,
    num_tags: usize,
    num_keys: Option<usize>,
    num_values: Option<usize>,
    keys: Vec<Arc<str>>,
    values: Vec<Arc<str>>,
    ways: Vec<Way>,
    pois: Vec<PointOfInterest>,
}

impl TileState {
    fn new(tile: Tile) -> Self {
        Self {
            tile,
            num_tags: 0,
            num_keys: None,
            num_values: None,
            keys: Vec::new(),
            values: Vec::new(),
            ways: Vec::new(),
            pois: Vec::new(),
        }
    }

    fn finish(self) -> DecodedTile {
        DecodedTile::new(self.tile, self.ways, self.pois)
    }
}

/// Upper bound for preallocating tables sized by counts read from the wire.
const MAX_PREALLOC: usize = 1024;

/// Resize `scratch` to hold an array of up to `wanted` values.
///
/// An array can never hold more values than the content has bytes, so
/// `limit` caps the allocation without changing which arrays are accepted.
fn scratch_slots(scratch: &mut Vec<u32>, wanted: usize, limit: usize) -> &mut [u32] {
    let slots = wanted.min(limit);
    if scratch.len() < slots {
        scratch.resize(slots, 0);
    }
    &mut scratch[..slots]
}

impl TileDecoder {
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            scratch: Vec::with_capacity(100),
            tags: TagSet::with_capacity(100),
        }
    }

    /// Decode one tile from `source`, reading exactly `content_length` bytes
    /// at most.
    ///
    /// Any structural problem aborts the whole tile; nothing partial is
    /// returned.
    pub fn decode<R: Read>(
        &mut self,
        source: R,
        content_length: usize,
        tile: &Tile,
    ) -> Result<DecodedTile, DecodeError> {
        debug!(tile = %tile, bytes = content_length, "Decoding tile");

        let buffer = std::mem::take(&mut self.buffer);
        let mut stream = StreamDecoder::with_buffer(source, content_length, buffer);
        self.tags.clear();

        let mut state = TileState::new(*tile);
        let result = self.decode_fields(&mut stream, &mut state);
        self.buffer = stream.into_buffer();

        match result {
            Ok(()) => {
                debug!(
                    tile = %tile,
                    ways = state.ways.len(),
                    pois = state.pois.len(),
                    "Decoded tile"
                );
                Ok(state.finish())
            }
            Err(e) => {
                debug!(tile = %tile, error = %e, "Tile decode failed");
                Err(e)
            }
        }
    }

    fn decode_fields<R: Read>(
        &mut self,
        stream: &mut StreamDecoder<R>,
        state: &mut TileState,
    ) -> Result<(), DecodeError> {
        // Running out of content and an explicit zero key both end the tile,
        // they are separate conditions.
        while stream.has_data()? {
            let key = stream.decode_varint32()?;
            if key == 0 {
                break;
            }

            match key >> 3 {
                TAG_TILE_LINE => self.decode_element(stream, state, ElementKind::Line)?,
                TAG_TILE_POLY => self.decode_element(stream, state, ElementKind::Polygon)?,
                TAG_TILE_POINT => self.decode_element(stream, state, ElementKind::Point)?,

                TAG_TILE_TAG_KEYS => {
                    if state.num_keys.map_or(true, |n| state.keys.len() >= n) {
                        return Err(DecodeError::DictionaryOverflow {
                            table: "key",
                            declared: state.num_keys,
                        });
                    }
                    state.keys.push(Arc::from(stream.decode_string()?));
                }

                TAG_TILE_TAG_VALUES => {
                    if state.num_values.map_or(true, |n| state.values.len() >= n) {
                        return Err(DecodeError::DictionaryOverflow {
                            table: "value",
                            declared: state.num_values,
                        });
                    }
                    state.values.push(Arc::from(stream.decode_string()?));
                }

                TAG_TILE_NUM_TAGS => {
                    state.num_tags = stream.decode_varint32()? as usize;
                }

                TAG_TILE_NUM_KEYS => {
                    let n = stream.decode_varint32()? as usize;
                    state.num_keys = Some(n);
                    state.keys = Vec::with_capacity(n.min(MAX_PREALLOC));
                }

                TAG_TILE_NUM_VALUES => {
                    let n = stream.decode_varint32()? as usize;
                    state.num_values = Some(n);
                    state.values = Vec::with_capacity(n.min(MAX_PREALLOC));
                }

                TAG_TILE_TAGS => {
                    let wanted = state.num_tags.saturating_mul(2);
                    let slots =
                        scratch_slots(&mut self.scratch, wanted, stream.content_length());
                    let count = stream.decode_varint_array(slots)?;
                    self.tags
                        .resolve_pairs(&slots[..count], &state.keys, &state.values)?;
                }

                TAG_TILE_VERSION => {
                    let version = stream.decode_varint32()?;
                    if version != TILE_VERSION {
                        return Err(DecodeError::VersionMismatch {
                            expected: TILE_VERSION,
                            found: version,
                        });
                    }
                }

                tag => return Err(DecodeError::UnknownField { tag }),
            }
        }

        Ok(())
    }

    fn decode_element<R: Read>(
        &mut self,
        stream: &mut StreamDecoder<R>,
        state: &mut TileState,
        kind: ElementKind,
    ) -> Result<(), DecodeError> {
        let length = stream.decode_varint32()? as usize;
        let end = stream.position() + length;
        let limit = stream.content_length();

        let mut num_indices: usize = 1;
        let mut num_tags: usize = 1;
        let mut ring_counts: Option<Vec<u32>> = None;
        let mut tags: Option<Vec<Tag>> = None;
        let mut layer = DEFAULT_LAYER;
        let mut groups: Option<Vec<RingGroup>> = None;
        let mut position: Option<GeoPoint> = None;
        let mut coord_count: usize = usize::from(kind == ElementKind::Point);

        while stream.position() < end {
            let key = stream.decode_varint32()?;
            if key == 0 {
                break;
            }

            match key >> 3 {
                TAG_ELEM_TAGS => {
                    let slots = scratch_slots(&mut self.scratch, num_tags, limit);
                    let count = stream.decode_varint_array(slots)?;
                    tags = Some(self.tags.select(&slots[..count])?);
                }

                TAG_ELEM_NUM_INDICES => {
                    num_indices = stream.decode_varint32()? as usize;
                }

                TAG_ELEM_NUM_TAGS => {
                    num_tags = stream.decode_varint32()? as usize;
                }

                TAG_ELEM_INDEX => {
                    let slots = scratch_slots(&mut self.scratch, num_indices, limit);
                    let count = stream.decode_varint_array(slots)?;
                    let counts = slots[..count].to_vec();
                    coord_count += counts.iter().map(|&c| c as usize).sum::<usize>();
                    ring_counts = Some(counts);
                }

                TAG_ELEM_COORDS => {
                    if coord_count == 0 {
                        debug!(tile = %state.tile, "Element declares no coordinates");
                    }
                    match kind {
                        ElementKind::Point => {
                            position = decode_point(stream)?;
                        }
                        ElementKind::Line | ElementKind::Polygon => {
                            let counts = ring_counts.as_deref().ok_or(DecodeError::MissingIndex)?;
                            groups = Some(decode_interleaved_points(
                                stream,
                                counts,
                                kind == ElementKind::Polygon,
                            )?);
                        }
                    }
                }

                TAG_ELEM_LAYER => {
                    let value = stream.decode_varint32()?;
                    if value > u32::from(MAX_LAYER) {
                        return Err(DecodeError::InvalidLayer(value));
                    }
                    layer = value as u8;
                }

                field => {
                    debug!(tile = %state.tile, field, "Skipping unknown element field");
                }
            }
        }

        if stream.position() > end {
            return Err(DecodeError::ElementOverrun {
                end,
                position: stream.position(),
            });
        }

        let tags = tags.ok_or(DecodeError::MissingTags)?;
        if num_indices == 0 {
            return Err(DecodeError::NoRings);
        }

        match kind {
            ElementKind::Point => {
                if let Some(position) = position {
                    state.pois.push(PointOfInterest {
                        layer,
                        tags,
                        position,
                    });
                }
            }
            ElementKind::Line | ElementKind::Polygon => {
                let groups = groups.ok_or(DecodeError::NoRings)?;
                for rings in groups {
                    state.ways.push(Way {
                        kind,
                        layer,
                        tags: tags.clone(),
                        rings,
                    });
                }
            }
        }

        Ok(())
    }
}

/// Decode a point element's coordinate payload.
///
/// Each pair is an absolute zigzag-coded position; when several pairs are
/// present the last one wins. A dangling x without its y is an error.
fn decode_point<R: Read>(
    stream: &mut StreamDecoder<R>,
) -> Result<Option<GeoPoint>, DecodeError> {
    let mut position = None;
    let mut pending_x: Option<i32> = None;
    let mut decoded = 0;

    let span = stream.decode_varint_span(|value| {
        match pending_x.take() {
            None => pending_x = Some(zigzag_decode(value)),
            Some(x) => {
                position = Some(GeoPoint::from_tile_units(x, zigzag_decode(value)));
                decoded += 1;
            }
        }
        Ok(true)
    })?;

    if !span.is_exact() {
        return Err(DecodeError::CoordinateLengthMismatch {
            declared: span.declared,
            consumed: span.consumed,
        });
    }
    if pending_x.is_some() {
        return Err(DecodeError::CoordinateCountMismatch {
            expected: decoded + 1,
            decoded,
        });
    }

    Ok(position)
}

/// Split per-ring vertex counts into ring groups and return each ring's
/// target length.
///
/// Zero entries are skipped. Every non-zero line count is its own group of
/// one ring. For polygons a run of consecutive non-zero counts forms one
/// group (outer ring plus holes) and every ring gets one extra slot for the
/// closing point.
pub(crate) fn ring_layout(counts: &[u32], polygon: bool) -> Vec<Vec<usize>> {
    let mut layout = Vec::new();
    let mut i = 0;

    while i < counts.len() {
        if counts[i] == 0 {
            i += 1;
            continue;
        }

        if !polygon {
            layout.push(vec![counts[i] as usize]);
            i += 1;
            continue;
        }

        let start = i;
        while i < counts.len() && counts[i] > 0 {
            i += 1;
        }
        layout.push(counts[start..i].iter().map(|&c| c as usize + 1).collect());
    }

    layout
}

/// Decode the interleaved coordinate payload of a line or polygon element.
fn decode_interleaved_points<R: Read>(
    stream: &mut StreamDecoder<R>,
    counts: &[u32],
    polygon: bool,
) -> Result<Vec<RingGroup>, DecodeError> {
    let layout = ring_layout(counts, polygon);
    if layout.is_empty() {
        return Err(DecodeError::NoRings);
    }

    let expected: usize = counts.iter().map(|&c| c as usize).sum();
    let mut groups: Vec<RingGroup> = layout
        .iter()
        .map(|sizes| sizes.iter().map(|_| Vec::new()).collect())
        .collect();

    let (mut group, mut ring) = (0usize, 0usize);
    let (mut x, mut y) = (0i32, 0i32);
    let mut even = true;
    let mut decoded = 0usize;
    let mut complete = false;

    let span = stream.decode_varint_span(|value| {
        let delta = zigzag_decode(value);
        if even {
            x = x.wrapping_add(delta);
            even = false;
            return Ok(true);
        }
        y = y.wrapping_add(delta);
        even = true;

        let size = layout[group][ring];
        let points = &mut groups[group][ring];
        points.push(GeoPoint::from_tile_units(x, y));
        decoded += 1;

        if polygon && points.len() == size - 1 {
            let first = points[0];
            points.push(first);
        }
        if points.len() < size {
            return Ok(true);
        }

        ring += 1;
        if ring < layout[group].len() {
            return Ok(true);
        }

        ring = 0;
        group += 1;
        if group < layout.len() {
            return Ok(true);
        }

        complete = true;
        Ok(false)
    })?;

    if !span.is_exact() {
        return Err(DecodeError::CoordinateLengthMismatch {
            declared: span.declared,
            consumed: span.consumed,
        });
    }
    if !complete {
        return Err(DecodeError::CoordinateCountMismatch { expected, decoded });
    }

    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::builder::{ElementBuilder, PayloadBuilder};
    use crate::decoder::fields::TAG_ELEM_COORDS;
    use crate::tags::{ATTRIB_OFFSET, KEYS, VALUES};
    use std::io::Cursor;

    fn tile() -> Tile {
        Tile::new(14, 8803, 5374)
    }

    fn key(name: &str) -> u32 {
        KEYS.iter().position(|k| *k == name).unwrap() as u32
    }

    fn value(name: &str) -> u32 {
        VALUES.iter().position(|v| *v == name).unwrap() as u32
    }

    fn decode(payload: &[u8]) -> Result<DecodedTile, DecodeError> {
        TileDecoder::new().decode(Cursor::new(payload), payload.len(), &tile())
    }

    fn header() -> PayloadBuilder {
        PayloadBuilder::new()
            .version(TILE_VERSION)
            .tag_pairs(&[(key("building"), value("yes"))])
    }

    fn pt(x: i32, y: i32) -> GeoPoint {
        GeoPoint::from_tile_units(x, y)
    }

    #[test]
    fn test_ring_layout_lines() {
        assert_eq!(ring_layout(&[3, 0, 2], false), vec![vec![3], vec![2]]);
    }

    #[test]
    fn test_ring_layout_polygons_group_runs() {
        assert_eq!(
            ring_layout(&[4, 3, 0, 5], true),
            vec![vec![5, 4], vec![6]]
        );
        assert_eq!(ring_layout(&[3, 0, 2], true), vec![vec![4], vec![3]]);
        assert!(ring_layout(&[0, 0], true).is_empty());
    }

    #[test]
    fn test_empty_payload_is_empty_tile() {
        let decoded = decode(&[]).unwrap();
        assert!(decoded.is_empty());
        assert_eq!(decoded.tile(), tile());
    }

    #[test]
    fn test_version_mismatch() {
        let payload = PayloadBuilder::new().version(3).build();
        assert!(matches!(
            decode(&payload),
            Err(DecodeError::VersionMismatch {
                expected: 4,
                found: 3
            })
        ));
    }

    #[test]
    fn test_unknown_field_aborts_tile() {
        let payload = PayloadBuilder::new()
            .version(TILE_VERSION)
            .raw_varint_field(7, 1)
            .build();
        assert!(matches!(
            decode(&payload),
            Err(DecodeError::UnknownField { tag: 7 })
        ));
    }

    #[test]
    fn test_zero_key_terminates_before_trailing_bytes() {
        let mut payload = PayloadBuilder::new().version(TILE_VERSION).terminator().build();
        // Would be an unknown field if the loop kept going
        payload.extend_from_slice(&[7 << 3, 1]);

        assert!(decode(&payload).unwrap().is_empty());
    }

    #[test]
    fn test_key_string_before_count_is_rejected() {
        let payload = PayloadBuilder::new()
            .raw_string_field(TAG_TILE_TAG_KEYS, "colour")
            .build();
        assert!(matches!(
            decode(&payload),
            Err(DecodeError::DictionaryOverflow {
                table: "key",
                declared: None
            })
        ));
    }

    #[test]
    fn test_value_string_beyond_count_is_rejected() {
        let payload = PayloadBuilder::new()
            .raw_varint_field(TAG_TILE_NUM_VALUES, 1)
            .raw_string_field(TAG_TILE_TAG_VALUES, "red")
            .raw_string_field(TAG_TILE_TAG_VALUES, "blue")
            .build();
        assert!(matches!(
            decode(&payload),
            Err(DecodeError::DictionaryOverflow {
                table: "value",
                declared: Some(1)
            })
        ));
    }

    #[test]
    fn test_tile_tags_resolve_static_and_dynamic() {
        let payload = PayloadBuilder::new()
            .version(TILE_VERSION)
            .tile_keys(&["colour"])
            .tile_values(&["red"])
            .tag_pairs(&[(key("highway"), value("primary")), (ATTRIB_OFFSET, ATTRIB_OFFSET)])
            .element(
                ElementBuilder::point()
                    .tags(&[0, 1])
                    .position(10, 20),
            )
            .build();

        let decoded = decode(&payload).unwrap();
        let poi = &decoded.pois()[0];
        assert_eq!(
            poi.tags,
            vec![Tag::from(("highway", "primary")), Tag::from(("colour", "red"))]
        );
    }

    #[test]
    fn test_tile_tag_index_out_of_range() {
        let payload = PayloadBuilder::new()
            .version(TILE_VERSION)
            .tag_pairs(&[(ATTRIB_OFFSET, 0)])
            .build();
        assert!(matches!(
            decode(&payload),
            Err(DecodeError::TagIndexOutOfRange { index }) if index == ATTRIB_OFFSET
        ));
    }

    #[test]
    fn test_point_element() {
        let payload = header()
            .element(ElementBuilder::point().tags(&[0]).position(2048, -4096))
            .build();

        let decoded = decode(&payload).unwrap();
        assert!(decoded.ways().is_empty());
        assert_eq!(decoded.pois().len(), 1);

        let poi = &decoded.pois()[0];
        assert_eq!(poi.layer, DEFAULT_LAYER);
        assert_eq!(poi.position, GeoPoint::new(-1.0, 0.5));
        assert_eq!(poi.tags, vec![Tag::from(("building", "yes"))]);
    }

    #[test]
    fn test_point_last_position_wins() {
        let payload = header()
            .element(
                ElementBuilder::point()
                    .tags(&[0])
                    .positions(&[(4096, 4096), (-2048, 1024)]),
            )
            .build();

        let decoded = decode(&payload).unwrap();
        assert_eq!(decoded.pois()[0].position, GeoPoint::new(0.25, -0.5));
    }

    #[test]
    fn test_point_without_coordinates_is_dropped() {
        let payload = header().element(ElementBuilder::point().tags(&[0])).build();
        assert!(decode(&payload).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_element_field_is_skipped() {
        let payload = header()
            .element(
                // Only the key is skipped; its value then reads as another
                // unknown key
                ElementBuilder::point()
                    .raw_varint_field(5, 7 << 3)
                    .tags(&[0])
                    .position(1, 1),
            )
            .build();

        assert_eq!(decode(&payload).unwrap().pois().len(), 1);
    }

    #[test]
    fn test_point_with_dangling_x_fails() {
        let payload = header()
            .element(
                ElementBuilder::point()
                    .tags(&[0])
                    .raw_array_field(TAG_ELEM_COORDS, &[2, 2, 4]),
            )
            .build();

        assert!(matches!(
            decode(&payload),
            Err(DecodeError::CoordinateCountMismatch {
                expected: 2,
                decoded: 1
            })
        ));
    }

    #[test]
    fn test_field_reading_past_element_end_fails() {
        let element = || ElementBuilder::point().tags(&[0]).position(1, 1);
        let prefix_len = header().build().len();
        let mut payload = header().element(element()).build();

        // Point key takes two bytes, then the one-byte element length
        let length_at = prefix_len + 2;
        let declared = payload[length_at] as usize;
        assert_eq!(payload.len(), length_at + 1 + declared);
        payload[length_at] -= 1;

        match decode(&payload) {
            Err(DecodeError::ElementOverrun { end, position }) => {
                assert_eq!(end, length_at + declared);
                assert_eq!(position, end + 1);
            }
            other => panic!("expected ElementOverrun, got {:?}", other),
        }
    }

    #[test]
    fn test_line_coordinates_without_index_fail() {
        let payload = header()
            .element(
                ElementBuilder::line()
                    .tags(&[0])
                    .coordinates(&[(0, 0), (10, 10)]),
            )
            .build();

        assert!(matches!(decode(&payload), Err(DecodeError::MissingIndex)));
    }

    #[test]
    fn test_line_element_with_layer() {
        let payload = header()
            .element(
                ElementBuilder::line()
                    .tags(&[0])
                    .rings(&[3])
                    .coordinates(&[(0, 0), (4096, 0), (4096, 4096)])
                    .layer(7),
            )
            .build();

        let decoded = decode(&payload).unwrap();
        let way = &decoded.ways()[0];
        assert_eq!(way.kind, ElementKind::Line);
        assert_eq!(way.layer, 7);
        assert_eq!(way.rings, vec![vec![pt(0, 0), pt(4096, 0), pt(4096, 4096)]]);
    }

    #[test]
    fn test_line_rings_become_separate_ways() {
        let payload = header()
            .element(
                ElementBuilder::line()
                    .tags(&[0])
                    .rings(&[2, 0, 2])
                    .coordinates(&[(10, 10), (20, 10), (30, 30), (40, 30)]),
            )
            .build();

        let decoded = decode(&payload).unwrap();
        assert_eq!(decoded.ways().len(), 2);
        assert_eq!(decoded.ways()[0].rings, vec![vec![pt(10, 10), pt(20, 10)]]);
        assert_eq!(decoded.ways()[1].rings, vec![vec![pt(30, 30), pt(40, 30)]]);
    }

    #[test]
    fn test_polygon_rings_are_closed() {
        let first = [(0, 0), (100, 0), (100, 100)];
        let second = [(200, 200), (300, 200)];
        let coords: Vec<(i32, i32)> = first.iter().chain(second.iter()).copied().collect();

        let payload = header()
            .element(
                ElementBuilder::polygon()
                    .tags(&[0])
                    .rings(&[3, 0, 2])
                    .coordinates(&coords),
            )
            .build();

        let decoded = decode(&payload).unwrap();
        assert_eq!(decoded.ways().len(), 2);

        let outer = &decoded.ways()[0].rings;
        assert_eq!(
            outer,
            &vec![vec![pt(0, 0), pt(100, 0), pt(100, 100), pt(0, 0)]]
        );
        let second_ring = &decoded.ways()[1].rings;
        assert_eq!(
            second_ring,
            &vec![vec![pt(200, 200), pt(300, 200), pt(200, 200)]]
        );
    }

    #[test]
    fn test_polygon_with_hole_shares_running_position() {
        // The hole's first delta is relative to the outer ring's last point
        let outer = [(0, 0), (1000, 0), (1000, 1000), (0, 1000)];
        let hole = [(100, 100), (200, 100), (200, 200)];
        let coords: Vec<(i32, i32)> = outer.iter().chain(hole.iter()).copied().collect();

        let payload = header()
            .element(
                ElementBuilder::polygon()
                    .tags(&[0])
                    .rings(&[4, 3])
                    .coordinates(&coords),
            )
            .build();

        let decoded = decode(&payload).unwrap();
        assert_eq!(decoded.ways().len(), 1);

        let rings = &decoded.ways()[0].rings;
        assert_eq!(rings.len(), 2);
        assert_eq!(rings[0].len(), 5);
        assert_eq!(rings[1], vec![pt(100, 100), pt(200, 100), pt(200, 200), pt(100, 100)]);
    }

    #[test]
    fn test_coordinate_bytes_beyond_rings_fail() {
        let payload = header()
            .element(
                ElementBuilder::line()
                    .tags(&[0])
                    .rings(&[2])
                    .coordinates(&[(1, 1), (2, 2), (3, 3)]),
            )
            .build();

        assert!(matches!(
            decode(&payload),
            Err(DecodeError::CoordinateLengthMismatch { .. })
        ));
    }

    #[test]
    fn test_too_few_coordinates_fail() {
        let payload = header()
            .element(
                ElementBuilder::line()
                    .tags(&[0])
                    .rings(&[3])
                    .coordinates(&[(1, 1), (2, 2)]),
            )
            .build();

        assert!(matches!(
            decode(&payload),
            Err(DecodeError::CoordinateCountMismatch {
                expected: 3,
                decoded: 2
            })
        ));
    }

    #[test]
    fn test_element_without_tags_fails() {
        let payload = header()
            .element(ElementBuilder::point().position(1, 1))
            .build();

        assert!(matches!(decode(&payload), Err(DecodeError::MissingTags)));
    }

    #[test]
    fn test_element_with_only_zero_rings_fails() {
        let payload = header()
            .element(
                ElementBuilder::line()
                    .tags(&[0])
                    .rings(&[0, 0])
                    .coordinates(&[]),
            )
            .build();

        assert!(matches!(decode(&payload), Err(DecodeError::NoRings)));
    }

    #[test]
    fn test_element_tag_outside_tile_set_fails() {
        let payload = header()
            .element(ElementBuilder::point().tags(&[1]).position(1, 1))
            .build();

        assert!(matches!(
            decode(&payload),
            Err(DecodeError::TagIndexOutOfRange { index: 1 })
        ));
    }

    #[test]
    fn test_invalid_layer_fails() {
        let payload = header()
            .element(ElementBuilder::point().tags(&[0]).position(1, 1).layer(11))
            .build();

        assert!(matches!(decode(&payload), Err(DecodeError::InvalidLayer(11))));
    }

    #[test]
    fn test_one_corrupt_element_invalidates_tile() {
        let payload = header()
            .element(ElementBuilder::point().tags(&[0]).position(1, 1))
            .element(ElementBuilder::point().position(2, 2))
            .build();

        assert!(decode(&payload).is_err());
    }

    #[test]
    fn test_decoder_is_reusable_after_failure() {
        let mut decoder = TileDecoder::new();

        let bad = PayloadBuilder::new().version(2).build();
        assert!(decoder
            .decode(Cursor::new(&bad), bad.len(), &tile())
            .is_err());

        let good = header()
            .element(ElementBuilder::point().tags(&[0]).position(8, 8))
            .build();
        let decoded = decoder.decode(Cursor::new(&good), good.len(), &tile()).unwrap();
        assert_eq!(decoded.pois().len(), 1);
    }

    #[test]
    fn test_tag_set_is_reset_between_tiles() {
        let mut decoder = TileDecoder::new();

        let first = header().build();
        decoder.decode(Cursor::new(&first), first.len(), &tile()).unwrap();

        // No tag pairs this time, so index 0 no longer resolves
        let second = PayloadBuilder::new()
            .version(TILE_VERSION)
            .element(ElementBuilder::point().tags(&[0]).position(1, 1))
            .build();
        assert!(matches!(
            decoder.decode(Cursor::new(&second), second.len(), &tile()),
            Err(DecodeError::TagIndexOutOfRange { index: 0 })
        ));
    }
}
