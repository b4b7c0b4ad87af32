//! Client configuration.
//!
//! A [`ClientConfig`] names the tile server and the connection policy. It
//! has usable defaults and can be overlaid from `~/.vtmlayer/config.ini`,
//! see [`ClientConfig::load_from`].

mod file;

pub use file::{config_directory, config_file_path, ConfigFileError};

use std::time::Duration;

use crate::transport::{ConfigError, ReusePolicy, ServerConfig};

/// Server used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost/tiles/";

/// Seconds to wait for a connection to open.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Seconds after the last request before a connection counts as stale.
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 10;

/// Requests sent on one connection before it is replaced.
pub const DEFAULT_MAX_REQUESTS: u32 = 100;

/// Settings for one tile session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_requests_per_connection: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            idle_timeout: Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS),
            max_requests_per_connection: DEFAULT_MAX_REQUESTS,
        }
    }
}

impl ClientConfig {
    /// Defaults with a different server.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Connection reuse policy for these settings.
    pub fn reuse_policy(&self) -> ReusePolicy {
        ReusePolicy::new(self.max_requests_per_connection, self.idle_timeout)
    }

    /// Parse the base URL.
    pub fn server(&self) -> Result<ServerConfig, ConfigError> {
        ServerConfig::parse(&self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost/tiles/");
        assert_eq!(config.connect_timeout, Duration::from_secs(30));
        assert_eq!(config.reuse_policy(), ReusePolicy::default());
    }

    #[test]
    fn test_with_base_url_keeps_policy() {
        let config = ClientConfig::with_base_url("http://example.org:8080/vtm/");
        let server = config.server().unwrap();
        assert_eq!(server.port(), 8080);
        assert_eq!(config.max_requests_per_connection, DEFAULT_MAX_REQUESTS);
    }

    #[test]
    fn test_invalid_base_url() {
        let config = ClientConfig::with_base_url("not a url");
        assert!(config.server().is_err());
    }
}
