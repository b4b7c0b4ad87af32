//! CLI error handling with user-friendly messages.
//!
//! Every command returns `Result<(), CliError>`; `main` prints the error and
//! exits with status 1.

use std::fmt;
use std::process;

use vtmlayer::config::ConfigFileError;
use vtmlayer::transport::{ConfigError, ConnectError};
use vtmlayer::{FetchError, Tile};

/// CLI-specific errors.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration could not be read, parsed or written
    Config(String),
    /// A tile fetch failed
    Fetch { tile: Tile, error: FetchError },
    /// Failed to render output
    Output(serde_json::Error),
}

impl CliError {
    /// Print the error to stderr and exit with status 1.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        if let CliError::Fetch {
            error: FetchError::Connect(ConnectError::Dns { .. } | ConnectError::Io(_)),
            ..
        } = self
        {
            eprintln!();
            eprintln!("Check that the tile server is running and that the URL is right:");
            eprintln!("  vtmlayer config show");
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Fetch { tile, error } => write!(f, "Failed to fetch tile {}: {}", tile, error),
            CliError::Output(e) => write!(f, "Failed to write output: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Fetch { error, .. } => Some(error),
            CliError::Output(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Output(e)
    }
}
