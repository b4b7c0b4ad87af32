//! Geometry coordinate types.
//!
//! Tile payloads carry coordinates as integers in tile-local units. Every
//! unit is 1/4096 of the reference tile size, so dividing by
//! [`COORD_SCALE`] yields the point handed to the renderer.

use serde::Serialize;

/// Reference tile size the integer coordinates are scaled to.
pub const COORD_SCALE: f64 = 4096.0;

/// A decoded point.
///
/// `lat` comes from the payload's y value and `lon` from its x value, both
/// already divided by [`COORD_SCALE`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    /// Create a point from already scaled values.
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Create a point from integer tile units.
    #[inline]
    pub fn from_tile_units(x: i32, y: i32) -> Self {
        Self {
            lat: f64::from(y) / COORD_SCALE,
            lon: f64::from(x) / COORD_SCALE,
        }
    }
}
