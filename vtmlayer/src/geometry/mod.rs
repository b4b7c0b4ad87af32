//! Decoded tile geometry.
//!
//! Lines and polygons become [`Way`]s, points become [`PointOfInterest`]s.
//! A [`DecodedTile`] bundles both for one tile and is immutable once built.

use serde::Serialize;

use crate::coord::GeoPoint;
use crate::tags::Tag;
use crate::tile::Tile;

/// Layer used when an element does not override it.
pub const DEFAULT_LAYER: u8 = 5;

/// Highest layer an element may declare.
pub const MAX_LAYER: u8 = 10;

/// Kind of geometry element in a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// Open polyline, one ring per way.
    Line,
    /// Closed polygon, an outer ring plus optional holes per way.
    Polygon,
    /// Single position.
    Point,
}

/// A line or polygon with its resolved attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Way {
    pub kind: ElementKind,
    pub layer: u8,
    pub tags: Vec<Tag>,
    /// For polygons every ring ends with a copy of its first point.
    pub rings: Vec<Vec<GeoPoint>>,
}

/// A point element with its resolved attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointOfInterest {
    pub layer: u8,
    pub tags: Vec<Tag>,
    pub position: GeoPoint,
}

/// Everything decoded from one tile payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedTile {
    tile: Tile,
    ways: Vec<Way>,
    pois: Vec<PointOfInterest>,
}

impl DecodedTile {
    pub fn new(tile: Tile, ways: Vec<Way>, pois: Vec<PointOfInterest>) -> Self {
        Self { tile, ways, pois }
    }

    /// The tile this content belongs to.
    pub fn tile(&self) -> Tile {
        self.tile
    }

    /// Lines and polygons, in payload order.
    pub fn ways(&self) -> &[Way] {
        &self.ways
    }

    /// Points, in payload order.
    pub fn pois(&self) -> &[PointOfInterest] {
        &self.pois
    }

    /// True when the tile carried no geometry at all.
    pub fn is_empty(&self) -> bool {
        self.ways.is_empty() && self.pois.is_empty()
    }

    /// Split into ways and points.
    pub fn into_parts(self) -> (Vec<Way>, Vec<PointOfInterest>) {
        (self.ways, self.pois)
    }
}
