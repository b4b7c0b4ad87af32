//! Tile request value type.

use std::fmt;

use serde::Serialize;

/// A tile to request from the server.
///
/// The x/y values are unsigned indices in the slippy-map grid at the given
/// zoom level:
/// - `tile_x` increases eastward
/// - `tile_y` increases southward
///
/// # Example
///
/// ```
/// use vtmlayer::tile::Tile;
///
/// let tile = Tile::new(14, 8803, 5374);
/// assert_eq!(tile.zoom_level(), 14);
/// assert_eq!(tile.tile_x(), 8803);
/// assert_eq!(tile.tile_y(), 5374);
/// assert_eq!(tile.to_string(), "14/8803/5374");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Tile {
    /// Zoom level
    zoom_level: u8,
    /// Column (X index, increases eastward)
    tile_x: u32,
    /// Row (Y index, increases southward)
    tile_y: u32,
}

impl Tile {
    /// Create a new tile.
    pub fn new(zoom_level: u8, tile_x: u32, tile_y: u32) -> Self {
        Self {
            zoom_level,
            tile_x,
            tile_y,
        }
    }

    /// Get the zoom level.
    pub fn zoom_level(&self) -> u8 {
        self.zoom_level
    }

    /// Get the tile column.
    pub fn tile_x(&self) -> u32 {
        self.tile_x
    }

    /// Get the tile row.
    pub fn tile_y(&self) -> u32 {
        self.tile_y
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom_level, self.tile_x, self.tile_y)
    }
}
