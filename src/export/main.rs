//! Building export.
//!
//! Geocodes an address and writes the surrounding building polygons to a
//! GeoJSON file for display over satellite imagery.

mod collection;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use geojson::GeoJson;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use footprint::config::{validate_radius, Config};
use footprint::FootprintService;

use crate::collection::{feature_collection, map_center};

#[derive(Parser, Debug)]
#[command(name = "export")]
#[command(about = "Export buildings around an address to GeoJSON")]
struct Args {
    /// Street address to search around
    address: String,

    /// Search radius in metres
    #[arg(long, default_value = "10")]
    radius: f64,

    /// Output GeoJSON file
    #[arg(short, long, default_value = "buildings.geojson")]
    output: PathBuf,

    /// TOML config file (upstream settings)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Maximum log level
    #[arg(long, default_value = "info")]
    log_level: Level,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let radius = validate_radius(args.radius).context("Invalid --radius")?;

    let config = Config::load_or_default(args.config.as_ref())?;
    let service = FootprintService::from_config(&config)?;

    let (reference, records) = service.buildings(&args.address, radius).await?;
    info!("Found coordinates: {}, {}", reference.y(), reference.x());

    let collection = feature_collection(&records);
    let count = collection.features.len();

    fs::write(&args.output, GeoJson::FeatureCollection(collection).to_string())
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    info!(
        "Saved {} building polygons to {}",
        count,
        args.output.display()
    );

    let (lat, lon) = map_center(&records);
    info!("Map centre: {}, {}", lat, lon);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_defaults_to_info() {
        let args = Args::try_parse_from(["export", "Marszałkowska 1, Warszawa"]).unwrap();
        assert_eq!(args.log_level, Level::INFO);

        let args = Args::try_parse_from(["export", "--log-level", "warn", "Marszałkowska 1"]).unwrap();
        assert_eq!(args.log_level, Level::WARN);
    }

    #[test]
    fn test_non_finite_radius_is_rejected() {
        for radius in ["NaN", "inf", "0", "-3"] {
            let flag = format!("--radius={radius}");
            let args = Args::try_parse_from(["export", flag.as_str(), "Marszałkowska 1"]).unwrap();
            assert!(validate_radius(args.radius).is_err(), "accepted {radius}");
        }
    }
}
