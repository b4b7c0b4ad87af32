//! Server address and request framing.

use std::sync::OnceLock;

use regex::Regex;

use super::error::ConfigError;
use crate::tile::Tile;

/// Port used when the URL names none.
pub const DEFAULT_PORT: u16 = 80;

/// Extension appended to every tile path.
pub const TILE_EXTENSION: &str = ".vtm";

fn url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // scheme://host[:port][/path], no query or fragment
        Regex::new(r"^([A-Za-z][A-Za-z0-9+.\-]*)://([^/:?#]*)(?::([^/?#]*))?(/[^?#]*)?$").unwrap()
    })
}

/// Parsed base URL plus the constant parts of every tile request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    host: String,
    port: u16,
    path: String,
    prefix: Vec<u8>,
    suffix: Vec<u8>,
}

impl ServerConfig {
    /// Parse `scheme://host[:port]/path`.
    ///
    /// Only `http` is accepted. The port defaults to 80 and an absent path
    /// to `/`. The path is used verbatim as the prefix of `z/x/y.vtm`, so it
    /// normally ends with a slash.
    pub fn parse(url: &str) -> Result<Self, ConfigError> {
        let url = url.trim();
        let caps = url_pattern()
            .captures(url)
            .ok_or_else(|| ConfigError::InvalidUrl { url: url.to_string() })?;

        let scheme = &caps[1];
        if !scheme.eq_ignore_ascii_case("http") {
            return Err(ConfigError::UnsupportedScheme {
                scheme: scheme.to_string(),
            });
        }

        let host = &caps[2];
        if host.is_empty() {
            return Err(ConfigError::MissingHost { url: url.to_string() });
        }

        let port = match caps.get(3) {
            Some(port) => port.as_str().parse::<u16>().map_err(|_| ConfigError::InvalidPort {
                port: port.as_str().to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let path = caps.get(4).map_or("/", |m| m.as_str());

        Ok(Self::new(host, port, path))
    }

    fn new(host: &str, port: u16, path: &str) -> Self {
        let prefix = format!("GET {}", path).into_bytes();
        let suffix = format!(
            "{} HTTP/1.1\nHost: {}\nConnection: Keep-Alive\n\n",
            TILE_EXTENSION, host
        )
        .into_bytes();

        Self {
            host: host.to_string(),
            port,
            path: path.to_string(),
            prefix,
            suffix,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// `GET {path}`
    pub fn request_prefix(&self) -> &[u8] {
        &self.prefix
    }

    /// Everything after the tile coordinates.
    pub fn request_suffix(&self) -> &[u8] {
        &self.suffix
    }
}

/// Longest decimal rendering of a `u32`.
const MAX_DIGITS: usize = 10;

/// Preallocated request bytes.
///
/// The prefix is written once; each request only rewrites the coordinates
/// and suffix in place, so building a request never allocates.
#[derive(Debug, Clone)]
pub struct RequestBuffer {
    bytes: Vec<u8>,
    prefix_len: usize,
    suffix: Vec<u8>,
}

impl RequestBuffer {
    pub fn new(server: &ServerConfig) -> Self {
        let prefix = server.request_prefix();
        let suffix = server.request_suffix();

        let mut bytes = Vec::with_capacity(prefix.len() + 3 * MAX_DIGITS + 2 + suffix.len());
        bytes.extend_from_slice(prefix);

        Self {
            bytes,
            prefix_len: prefix.len(),
            suffix: suffix.to_vec(),
        }
    }

    /// Write the request for `tile` and return its bytes.
    pub fn fill(&mut self, tile: &Tile) -> &[u8] {
        self.bytes.truncate(self.prefix_len);
        write_decimal(&mut self.bytes, u32::from(tile.zoom_level()));
        self.bytes.push(b'/');
        write_decimal(&mut self.bytes, tile.tile_x());
        self.bytes.push(b'/');
        write_decimal(&mut self.bytes, tile.tile_y());
        self.bytes.extend_from_slice(&self.suffix);
        &self.bytes
    }

    /// Bytes of the last filled request.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Append `value` as ASCII decimal digits.
fn write_decimal(out: &mut Vec<u8>, mut value: u32) {
    let mut digits = [0u8; MAX_DIGITS];
    let mut start = MAX_DIGITS;
    loop {
        start -= 1;
        digits[start] = b'0' + (value % 10) as u8;
        value /= 10;
        if value == 0 {
            break;
        }
    }
    out.extend_from_slice(&digits[start..]);
}
