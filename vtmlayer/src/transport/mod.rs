//! Tile server transport.
//!
//! A minimal HTTP/1.1 exchange over one keep-alive TCP connection. The
//! request is a fixed template with the tile coordinates filled in; the
//! response is a status line, header lines, an empty line, a 4-byte
//! big-endian content length and the payload.

mod connection;
mod connector;
mod error;
mod reader;
mod server;

pub use connection::{
    ConnectionManager, ResponseHeader, ReusePolicy, DEFAULT_CONNECT_TIMEOUT, HEADER_BUFFER_SIZE,
    STATUS_OK,
};
pub use connector::{Connector, TcpConnector, TileStream};
pub use error::{ConfigError, ConnectError, ProtocolError};
pub use reader::{ResponseReader, READ_BUFFER_SIZE};
pub use server::{RequestBuffer, ServerConfig, DEFAULT_PORT, TILE_EXTENSION};

#[cfg(test)]
pub(crate) use connector::tests::MockConnector;
