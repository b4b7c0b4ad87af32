//! `fetch` command: download and decode one tile.

use std::collections::HashMap;

use tracing::info;
use vtmlayer::{ClientConfig, DecodedTile, Tile, TileSession};

use crate::error::CliError;

/// Tags listed in the summary.
const HISTOGRAM_LIMIT: usize = 15;

pub struct FetchArgs {
    pub tile: Tile,
    pub repeat: u32,
    pub json: bool,
}

/// Fetch `args.tile` `args.repeat` times over one session and print the
/// last result.
pub fn run(config: &ClientConfig, args: FetchArgs) -> Result<(), CliError> {
    let mut session = TileSession::open(config)?;
    info!(url = %config.base_url, tile = %args.tile, repeat = args.repeat, "Fetching tile");

    let mut decoded = None;
    for _ in 0..args.repeat.max(1) {
        let result = session
            .fetch_tile(&args.tile)
            .map_err(|error| CliError::Fetch {
                tile: args.tile,
                error,
            })?;
        decoded = Some(result);
    }
    session.close();

    if let Some(decoded) = decoded {
        if args.json {
            println!("{}", serde_json::to_string_pretty(&decoded)?);
        } else {
            print_summary(&decoded);
        }
    }
    Ok(())
}

fn print_summary(decoded: &DecodedTile) {
    let points: usize = decoded
        .ways()
        .iter()
        .flat_map(|way| way.rings.iter())
        .map(Vec::len)
        .sum();

    println!("Tile {}", decoded.tile());
    println!("  Ways:   {} ({} points)", decoded.ways().len(), points);
    println!("  POIs:   {}", decoded.pois().len());

    let histogram = tag_histogram(decoded);
    if histogram.is_empty() {
        return;
    }
    println!();
    println!("Most common tags:");
    for (tag, count) in histogram.iter().take(HISTOGRAM_LIMIT) {
        println!("  {:>6}  {}", count, tag);
    }
    if histogram.len() > HISTOGRAM_LIMIT {
        println!("  ... {} more", histogram.len() - HISTOGRAM_LIMIT);
    }
}

/// Count each `key=value` over ways and POIs, most frequent first.
fn tag_histogram(decoded: &DecodedTile) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let way_tags = decoded.ways().iter().flat_map(|w| w.tags.iter());
    let poi_tags = decoded.pois().iter().flat_map(|p| p.tags.iter());
    for tag in way_tags.chain(poi_tags) {
        *counts.entry(tag.to_string()).or_default() += 1;
    }

    let mut sorted: Vec<_> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted
}
