//! Tile addressing.
//!
//! A [`Tile`] identifies one vector tile on the server by zoom level and
//! x/y index in the slippy-map grid.

mod request;

pub use request::Tile;
