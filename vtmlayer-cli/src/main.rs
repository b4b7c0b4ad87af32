//! VtmLayer CLI - Command-line interface
//!
//! Fetches and decodes tiles from a vector tile server and manages the
//! client configuration file.

mod commands;
mod error;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use vtmlayer::logging::{default_log_dir, default_log_file, init_logging};
use vtmlayer::Tile;

use commands::config::ConfigCommands;
use commands::fetch::FetchArgs;
use error::CliError;

#[derive(Parser)]
#[command(name = "vtmlayer")]
#[command(version, about = "Client for lightweight vector map tile servers", long_about = None)]
struct Cli {
    /// Configuration file (default: ~/.vtmlayer/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch one tile and print what it contains
    Fetch {
        /// Tile server base URL (overrides the configuration file)
        #[arg(long)]
        url: Option<String>,

        /// Zoom level
        #[arg(long)]
        zoom: u8,

        /// Tile column
        #[arg(long)]
        x: u32,

        /// Tile row
        #[arg(long)]
        y: u32,

        /// Print the decoded tile as JSON
        #[arg(long)]
        json: bool,

        /// Fetch the tile this many times over one connection
        #[arg(long, default_value = "1")]
        repeat: u32,
    },

    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        e.exit();
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Fetch {
            url,
            zoom,
            x,
            y,
            json,
            repeat,
        } => {
            let _logging = init_logging(&default_log_dir(), default_log_file())
                .map_err(|e| CliError::LoggingInit(e.to_string()))?;

            let mut config = commands::config::load(cli.config.as_deref())?;
            if let Some(url) = url {
                config.base_url = url;
            }

            commands::fetch::run(
                &config,
                FetchArgs {
                    tile: Tile::new(zoom, x, y),
                    repeat,
                    json,
                },
            )
        }
        Commands::Config { command } => commands::config::run(command, cli.config),
    }
}
