//! Transport error types.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

/// Base URL could not be turned into a server configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid server URL: {url}")]
    InvalidUrl { url: String },

    #[error("Unsupported URL scheme '{scheme}' (only http is supported)")]
    UnsupportedScheme { scheme: String },

    #[error("Server URL has no host: {url}")]
    MissingHost { url: String },

    #[error("Invalid port '{port}'")]
    InvalidPort { port: String },
}

/// Failure to establish or use the socket.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("Cannot resolve host '{host}'")]
    Dns { host: String },

    #[error("Connection to {addr} timed out after {timeout:?}")]
    Timeout { addr: SocketAddr, timeout: Duration },

    #[error("Connection reset: {0}")]
    Reset(#[source] io::Error),

    #[error("Socket error: {0}")]
    Io(#[source] io::Error),
}

impl ConnectError {
    /// Classify an I/O error from an established connection.
    pub fn from_io(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::UnexpectedEof => Self::Reset(err),
            _ => Self::Io(err),
        }
    }

    /// Classify an I/O error from a connect attempt to `addr`.
    pub fn from_connect(err: io::Error, addr: SocketAddr, timeout: Duration) -> Self {
        match err.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => Self::Timeout { addr, timeout },
            _ => Self::from_io(err),
        }
    }
}

/// The server's response did not follow the expected framing.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// First line was not the success status line. Soft failure, the tile
    /// simply has no result.
    #[error("Unexpected status line: {line:?}")]
    UnexpectedStatus { line: String },

    #[error("Response header exceeds {limit} bytes")]
    HeaderTooLarge { limit: usize },

    #[error("Connection closed inside response header")]
    TruncatedHeader,

    #[error("Content length needs 4 bytes, only {available} available")]
    ShortContentLength { available: usize },

    #[error("No open connection")]
    NotConnected,
}
