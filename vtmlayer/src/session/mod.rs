//! Tile fetching session.
//!
//! A [`TileSession`] pairs one [`ConnectionManager`] with one
//! [`TileDecoder`] and runs request, header parse and decode for each tile
//! in turn. Sessions are not shared between threads; run one per worker.

use std::io;

use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::decoder::TileDecoder;
use crate::error::FetchError;
use crate::geometry::DecodedTile;
use crate::tile::Tile;
use crate::transport::{
    ConfigError, ConnectError, ConnectionManager, Connector, ProtocolError, ResponseHeader,
    TcpConnector,
};

/// One connection plus one decoder.
pub struct TileSession<C: Connector = TcpConnector> {
    connection: ConnectionManager<C>,
    decoder: TileDecoder,
}

impl TileSession<TcpConnector> {
    /// Create a TCP session for `config`. Nothing is connected yet.
    pub fn open(config: &ClientConfig) -> Result<Self, ConfigError> {
        Self::with_connector(TcpConnector, config)
    }
}

impl<C: Connector> TileSession<C> {
    pub fn with_connector(connector: C, config: &ClientConfig) -> Result<Self, ConfigError> {
        let connection = ConnectionManager::new(connector, config.server()?)
            .with_policy(config.reuse_policy())
            .with_connect_timeout(config.connect_timeout);

        Ok(Self {
            connection,
            decoder: TileDecoder::new(),
        })
    }

    pub fn connection(&self) -> &ConnectionManager<C> {
        &self.connection
    }

    /// Fetch and decode one tile.
    ///
    /// Every failure is confined to this tile. Transport failures drop the
    /// connection so the next call starts on a fresh one; a payload that
    /// arrived whole but failed to decode leaves it open.
    pub fn fetch_tile(&mut self, tile: &Tile) -> Result<DecodedTile, FetchError> {
        let result = self.try_fetch(tile);

        if let Err(e) = &result {
            warn!(tile = %tile, error = %e, "Tile fetch failed");
            if e.is_transport() {
                self.connection.close();
            }
        }
        result
    }

    fn try_fetch(&mut self, tile: &Tile) -> Result<DecodedTile, FetchError> {
        self.connection.send_tile_request(tile)?;

        let length = match self.connection.read_response_header()? {
            ResponseHeader::Content { length } => length,
            ResponseHeader::Rejected { status_line } => {
                return Err(ProtocolError::UnexpectedStatus { line: status_line }.into())
            }
        };

        let mut body = self.connection.response_body(length)?;
        let decoded = self.decoder.decode(&mut body, length, tile);

        // Read whatever the decoder left so the next response starts at a
        // clean boundary.
        match io::copy(&mut body, &mut io::sink()) {
            Ok(0) => {}
            Ok(skipped) => debug!(tile = %tile, bytes = skipped, "Skipped unread payload"),
            Err(e) => {
                self.connection.close();
                if decoded.is_ok() {
                    return Err(ConnectError::from_io(e).into());
                }
            }
        }

        decoded.map_err(FetchError::from)
    }

    /// Release the connection. The session can still be used afterwards.
    pub fn close(&mut self) {
        self.connection.close();
    }
}
