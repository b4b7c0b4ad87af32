//! Configuration CLI commands.
//!
//! Provides `config show`, `config path` and `config init`.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use vtmlayer::config::config_file_path;
use vtmlayer::ClientConfig;

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,

    /// Show the configuration file path
    Path,

    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run a config subcommand against `path`, or the default file if unset.
pub fn run(command: ConfigCommands, path: Option<PathBuf>) -> Result<(), CliError> {
    let path = path.unwrap_or_else(config_file_path);
    match command {
        ConfigCommands::Show => run_show(&path),
        ConfigCommands::Path => {
            println!("{}", path.display());
            Ok(())
        }
        ConfigCommands::Init { force } => run_init(&path, force),
    }
}

/// Load the configuration at `path`, falling back to defaults when absent.
pub fn load(path: Option<&Path>) -> Result<ClientConfig, CliError> {
    let config = match path {
        Some(path) => ClientConfig::load_from(path)?,
        None => ClientConfig::load()?,
    };
    Ok(config)
}

fn run_show(path: &Path) -> Result<(), CliError> {
    let config = ClientConfig::load_from(path)?;
    // Fail on a URL the session would reject
    config.server()?;

    println!("Configuration ({})", path.display());
    println!("======================");
    println!();
    println!("[server]");
    println!("  url = {}", config.base_url);
    println!();
    println!("[connection]");
    println!("  connect_timeout = {}s", config.connect_timeout.as_secs());
    println!("  idle_timeout = {}s", config.idle_timeout.as_secs());
    println!("  max_requests = {}", config.max_requests_per_connection);

    Ok(())
}

fn run_init(path: &Path, force: bool) -> Result<(), CliError> {
    if path.exists() && !force {
        return Err(CliError::Config(format!(
            "'{}' already exists. Use --force to overwrite it.",
            path.display()
        )));
    }

    ClientConfig::default().save_to(path)?;
    println!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.ini");

        run_init(&path, false).unwrap();
        assert_eq!(load(Some(&path)).unwrap(), ClientConfig::default());
    }

    #[test]
    fn test_init_refuses_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[server]\nurl = http://example.com/\n").unwrap();

        assert!(matches!(run_init(&path, false), Err(CliError::Config(_))));
        run_init(&path, true).unwrap();
        assert_eq!(load(Some(&path)).unwrap().base_url, "http://localhost/tiles/");
    }

    #[test]
    fn test_show_rejects_bad_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[connection]\nmax_requests = none\n").unwrap();

        assert!(matches!(run_show(&path), Err(CliError::Config(_))));
    }
}
