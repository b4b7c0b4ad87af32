//! Tile payload decoding.
//!
//! [`StreamDecoder`] reads varints, varint arrays and strings from a byte
//! source without passing the declared content length. [`TileDecoder`]
//! interprets those primitives as the tile schema and rebuilds ways and
//! points of interest.

mod builder;
mod error;
pub(crate) mod fields;
mod stream;
mod tile;
pub mod varint;

pub use builder::{ElementBuilder, PayloadBuilder};
pub use error::DecodeError;
pub use fields::TILE_VERSION;
pub use stream::{Span, StreamDecoder, DEFAULT_BUFFER_SIZE};
pub use tile::TileDecoder;
