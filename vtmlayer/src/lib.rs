//! VtmLayer - client for lightweight vector map tile servers
//!
//! Fetches `.vtm` tiles over a single keep-alive connection and decodes them
//! into ways (lines and polygons) and points of interest with resolved
//! OpenStreetMap-style tags.
//!
//! # Example
//!
//! ```no_run
//! use vtmlayer::{ClientConfig, Tile, TileSession};
//!
//! let config = ClientConfig::with_base_url("http://localhost:8080/tiles/");
//! let mut session = TileSession::open(&config)?;
//!
//! let decoded = session.fetch_tile(&Tile::new(14, 8803, 5374))?;
//! println!("{} ways, {} pois", decoded.ways().len(), decoded.pois().len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod coord;
pub mod decoder;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod session;
pub mod tags;
pub mod tile;
pub mod transport;

pub use config::ClientConfig;
pub use error::FetchError;
pub use geometry::DecodedTile;
pub use session::TileSession;
pub use tile::Tile;
