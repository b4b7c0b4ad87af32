//! Keep-alive connection to the tile server.
//!
//! One [`ConnectionManager`] owns at most one socket and runs strictly one
//! request/response exchange at a time. Requests are sent with
//! [`send_tile_request`](ConnectionManager::send_tile_request), the response
//! header is parsed by
//! [`read_response_header`](ConnectionManager::read_response_header) and the
//! payload is then read through
//! [`response_body`](ConnectionManager::response_body).

use std::io::{self, Read, Write};
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::connector::{Connector, TcpConnector, TileStream};
use super::error::{ConfigError, ConnectError, ProtocolError};
use super::reader::ResponseReader;
use super::server::{RequestBuffer, ServerConfig};
use crate::error::FetchError;
use crate::tile::Tile;

/// Status line a successful response starts with.
pub const STATUS_OK: &[u8] = b"HTTP/1.1 200 OK";

/// Largest response header accepted, status line included.
pub const HEADER_BUFFER_SIZE: usize = 1024;

/// Default timeout for establishing a connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// When an open connection may be used for another request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReusePolicy {
    /// Requests sent on one connection before it is replaced.
    pub max_requests: u32,
    /// Longest gap since the previous request before the connection is
    /// considered stale.
    pub idle_timeout: Duration,
}

impl ReusePolicy {
    pub fn new(max_requests: u32, idle_timeout: Duration) -> Self {
        Self {
            max_requests,
            idle_timeout,
        }
    }

    /// Whether a connection that has carried `requests` requests and been
    /// idle for `idle` may carry another one.
    pub fn allows(&self, requests: u32, idle: Duration) -> bool {
        requests < self.max_requests && idle <= self.idle_timeout
    }
}

impl Default for ReusePolicy {
    fn default() -> Self {
        Self::new(100, Duration::from_secs(10))
    }
}

/// Result of parsing a response header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseHeader {
    /// The payload that follows has this many bytes.
    Content { length: usize },
    /// The status line was not [`STATUS_OK`]; nothing else was parsed.
    Rejected { status_line: String },
}

/// One open socket and its usage counters.
struct Connection<S> {
    reader: ResponseReader<S>,
    requests: u32,
    last_request: Instant,
}

impl<S: TileStream> Connection<S> {
    fn new(stream: S) -> Self {
        Self {
            reader: ResponseReader::new(stream),
            requests: 0,
            last_request: Instant::now(),
        }
    }

    /// Throw away anything left over from earlier responses.
    fn discard_pending(&mut self) -> io::Result<usize> {
        let buffered = self.reader.discard_buffered();
        Ok(buffered + self.reader.get_mut().discard_pending()?)
    }

    fn send(&mut self, request: &[u8]) -> io::Result<()> {
        let stream = self.reader.get_mut();
        stream.write_all(request)?;
        stream.flush()?;
        self.requests += 1;
        self.last_request = Instant::now();
        Ok(())
    }
}

/// Manages the connection to one tile server.
pub struct ConnectionManager<C: Connector = TcpConnector> {
    connector: C,
    server: ServerConfig,
    request: RequestBuffer,
    policy: ReusePolicy,
    connect_timeout: Duration,
    addr: Option<SocketAddr>,
    connection: Option<Connection<C::Stream>>,
}

impl ConnectionManager<TcpConnector> {
    /// Parse `base_url` and create a TCP-backed manager with default
    /// timeouts. No connection is opened until the first request.
    pub fn configure(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self::new(TcpConnector, ServerConfig::parse(base_url)?))
    }
}

impl<C: Connector> ConnectionManager<C> {
    pub fn new(connector: C, server: ServerConfig) -> Self {
        let request = RequestBuffer::new(&server);
        Self {
            connector,
            server,
            request,
            policy: ReusePolicy::default(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            addr: None,
            connection: None,
        }
    }

    pub fn with_policy(mut self, policy: ReusePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn server(&self) -> &ServerConfig {
        &self.server
    }

    pub fn policy(&self) -> ReusePolicy {
        self.policy
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Requests sent on the current connection, if one is open.
    pub fn requests_on_connection(&self) -> Option<u32> {
        self.connection.as_ref().map(|c| c.requests)
    }

    /// Send the request for `tile`.
    ///
    /// Opens a connection if there is none, replaces it when the reuse
    /// policy says so, and otherwise discards stray bytes before writing. A
    /// failed write is retried once on a fresh connection.
    pub fn send_tile_request(&mut self, tile: &Tile) -> Result<(), ConnectError> {
        let mut conn = self.reusable_connection()?;

        self.request.fill(tile);
        if let Err(e) = conn.send(self.request.as_bytes()) {
            warn!(tile = %tile, error = %e, "Request write failed, reconnecting");
            drop(conn);
            conn = self.open_connection()?;
            conn.send(self.request.as_bytes())
                .map_err(ConnectError::from_io)?;
        }

        debug!(tile = %tile, requests = conn.requests, "Sent tile request");
        self.connection = Some(conn);
        Ok(())
    }

    fn reusable_connection(&mut self) -> Result<Connection<C::Stream>, ConnectError> {
        if let Some(mut conn) = self.connection.take() {
            let idle = conn.last_request.elapsed();
            if conn.requests >= self.policy.max_requests {
                debug!(requests = conn.requests, "Request budget used up, reconnecting");
            } else if !self.policy.allows(conn.requests, idle) {
                debug!(idle_ms = idle.as_millis() as u64, "Connection idle too long, reconnecting");
            } else {
                match conn.discard_pending() {
                    Ok(0) => return Ok(conn),
                    Ok(bytes) => {
                        debug!(bytes, "Discarded unread response bytes");
                        return Ok(conn);
                    }
                    Err(e) => debug!(error = %e, "Connection unusable, reconnecting"),
                }
            }
        }

        self.open_connection()
    }

    fn open_connection(&mut self) -> Result<Connection<C::Stream>, ConnectError> {
        let addr = match self.addr {
            Some(addr) => addr,
            None => {
                let addr = self
                    .connector
                    .resolve(self.server.host(), self.server.port())?;
                self.addr = Some(addr);
                addr
            }
        };

        let stream = self.connector.connect(addr, self.connect_timeout)?;
        info!(%addr, host = self.server.host(), "Connected to tile server");
        Ok(Connection::new(stream))
    }

    /// Parse the response header of the request just sent.
    ///
    /// On success the reader is positioned at the first payload byte. A
    /// wrong status line is reported as [`ResponseHeader::Rejected`] rather
    /// than an error.
    pub fn read_response_header(&mut self) -> Result<ResponseHeader, FetchError> {
        let conn = self
            .connection
            .as_mut()
            .ok_or(ProtocolError::NotConnected)?;
        let header = parse_response_header(&mut conn.reader)?;

        match &header {
            ResponseHeader::Content { length } => debug!(bytes = length, "Response header ok"),
            ResponseHeader::Rejected { status_line } => {
                warn!(status = %status_line, "Unexpected response status")
            }
        }
        Ok(header)
    }

    /// Reader over the next `content_length` payload bytes.
    pub fn response_body(
        &mut self,
        content_length: usize,
    ) -> Result<io::Take<&mut ResponseReader<C::Stream>>, ProtocolError> {
        let conn = self
            .connection
            .as_mut()
            .ok_or(ProtocolError::NotConnected)?;
        Ok((&mut conn.reader).take(content_length as u64))
    }

    /// Drop the connection. Safe to call when none is open.
    pub fn close(&mut self) {
        if let Some(conn) = self.connection.take() {
            debug!(requests = conn.requests, "Closed connection");
        }
    }
}

/// Index of the next `\n` at or after `from`, reading more as needed.
///
/// Only the first [`HEADER_BUFFER_SIZE`] bytes are searched, however the
/// bytes happen to arrive.
fn find_line_end<S: Read>(reader: &mut ResponseReader<S>, from: usize) -> Result<usize, FetchError> {
    let mut searched = from;
    loop {
        let buffered = reader.buffered();
        let end = buffered.len().min(HEADER_BUFFER_SIZE);
        if let Some(i) = buffered[searched.min(end)..end].iter().position(|&b| b == b'\n') {
            return Ok(searched + i);
        }
        if buffered.len() >= HEADER_BUFFER_SIZE {
            return Err(ProtocolError::HeaderTooLarge {
                limit: HEADER_BUFFER_SIZE,
            }
            .into());
        }
        searched = buffered.len();
        if reader.fill_more().map_err(ConnectError::from_io)? == 0 {
            return Err(ProtocolError::TruncatedHeader.into());
        }
    }
}

/// Parse `status line`, header lines, an empty line and the 4-byte
/// big-endian content length.
///
/// Lines end at `\n`; a trailing `\r` is tolerated. The scan runs from a
/// mark; once the length is known the reader rewinds to the mark and skips
/// exactly past the length word.
pub(crate) fn parse_response_header<S: Read>(
    reader: &mut ResponseReader<S>,
) -> Result<ResponseHeader, FetchError> {
    reader.mark();

    let mut line_start = 0;
    let mut first = true;
    let header_len = loop {
        let line_end = find_line_end(reader, line_start)?;
        let line = &reader.buffered()[line_start..line_end];

        if first {
            if !line.starts_with(STATUS_OK) {
                let status_line = String::from_utf8_lossy(line).trim_end().to_string();
                reader.rewind();
                reader.skip(line_end + 1);
                return Ok(ResponseHeader::Rejected { status_line });
            }
            first = false;
        } else if line.is_empty() || line == b"\r" {
            break line_end + 1;
        }

        line_start = line_end + 1;
    };

    while reader.buffered().len() < header_len + 4 {
        if reader.fill_more().map_err(ConnectError::from_io)? == 0 {
            return Err(ProtocolError::ShortContentLength {
                available: reader.buffered().len() - header_len,
            }
            .into());
        }
    }

    let word = &reader.buffered()[header_len..header_len + 4];
    let length = u32::from_be_bytes([word[0], word[1], word[2], word[3]]) as usize;

    reader.rewind();
    reader.skip(header_len + 4);
    Ok(ResponseHeader::Content { length })
}
