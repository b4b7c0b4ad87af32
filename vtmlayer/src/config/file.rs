//! Configuration file handling for ~/.vtmlayer/config.ini.
//!
//! ```ini
//! [server]
//! url = http://localhost/tiles/
//!
//! [connection]
//! connect_timeout = 30
//! idle_timeout = 10
//! max_requests = 100
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;
use thiserror::Error;

use super::ClientConfig;
use crate::transport::ServerConfig;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    Read(#[from] ini::Error),

    /// Failed to write config file
    #[error("Failed to write config file: {0}")]
    Write(#[source] std::io::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}

fn invalid(section: &str, key: &str, value: &str, reason: impl Into<String>) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn parse_secs(section: &str, key: &str, value: &str) -> Result<Duration, ConfigFileError> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(invalid(section, key, value, "expected a positive number of seconds")),
    }
}

impl ClientConfig {
    /// Load configuration from the default path (~/.vtmlayer/config.ini).
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        parse_ini(&ini)
    }

    /// Save configuration to a specific path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigFileError::Write)?;
        }

        let mut ini = Ini::new();
        ini.with_section(Some("server")).set("url", self.base_url.as_str());
        ini.with_section(Some("connection"))
            .set("connect_timeout", self.connect_timeout.as_secs().to_string())
            .set("idle_timeout", self.idle_timeout.as_secs().to_string())
            .set("max_requests", self.max_requests_per_connection.to_string());

        ini.write_to_file(path).map_err(ConfigFileError::Write)
    }
}

/// Overlay INI values on the defaults.
fn parse_ini(ini: &Ini) -> Result<ClientConfig, ConfigFileError> {
    let mut config = ClientConfig::default();

    // [server] section
    if let Some(section) = ini.section(Some("server")) {
        if let Some(v) = section.get("url") {
            let v = v.trim();
            ServerConfig::parse(v).map_err(|e| invalid("server", "url", v, e.to_string()))?;
            config.base_url = v.to_string();
        }
    }

    // [connection] section
    if let Some(section) = ini.section(Some("connection")) {
        if let Some(v) = section.get("connect_timeout") {
            config.connect_timeout = parse_secs("connection", "connect_timeout", v)?;
        }
        if let Some(v) = section.get("idle_timeout") {
            config.idle_timeout = parse_secs("connection", "idle_timeout", v)?;
        }
        if let Some(v) = section.get("max_requests") {
            config.max_requests_per_connection = match v.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => return Err(invalid("connection", "max_requests", v, "expected a positive integer")),
            };
        }
    }

    Ok(config)
}

/// Get the path to the config directory (~/.vtmlayer).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".vtmlayer")
}

/// Get the path to the config file (~/.vtmlayer/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("config.ini");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ClientConfig::load_from(&dir.path().join("absent.ini")).unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_load_overrides() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "[server]\nurl = http://tiles.example.org:8080/vtm/\n\n\
             [connection]\nconnect_timeout = 5\nidle_timeout = 2\nmax_requests = 20\n",
        );

        let config = ClientConfig::load_from(&path).unwrap();
        assert_eq!(config.base_url, "http://tiles.example.org:8080/vtm/");
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.idle_timeout, Duration::from_secs(2));
        assert_eq!(config.max_requests_per_connection, 20);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[connection]\nmax_requests = 7\n");

        let config = ClientConfig::load_from(&path).unwrap();
        assert_eq!(config.base_url, super::super::DEFAULT_BASE_URL);
        assert_eq!(config.max_requests_per_connection, 7);
    }

    #[test]
    fn test_invalid_url_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[server]\nurl = https://secure.example.org/\n");

        match ClientConfig::load_from(&path) {
            Err(ConfigFileError::InvalidValue { section, key, .. }) => {
                assert_eq!(section, "server");
                assert_eq!(key, "url");
            }
            other => panic!("expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_timeout_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[connection]\nidle_timeout = soon\n");

        let err = ClientConfig::load_from(&path).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid configuration: connection.idle_timeout = 'soon' - expected a positive number of seconds"
        );
    }

    #[test]
    fn test_zero_max_requests_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[connection]\nmax_requests = 0\n");

        assert!(matches!(
            ClientConfig::load_from(&path),
            Err(ConfigFileError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.ini");

        let config = ClientConfig {
            base_url: "http://10.0.0.2:8000/".to_string(),
            connect_timeout: Duration::from_secs(3),
            idle_timeout: Duration::from_secs(4),
            max_requests_per_connection: 5,
        };
        config.save_to(&path).unwrap();

        assert_eq!(ClientConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_config_file_path() {
        let path = config_file_path();
        assert!(path.ends_with(".vtmlayer/config.ini"));
    }
}
