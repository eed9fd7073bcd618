#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line climate risk assessments.
//!
//! Runs the same engine as the HTTP server against a local data directory
//! and prints the results as JSON. `serve` starts the HTTP server itself.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use climate_risk_datasets::{DatasetIndexes, DatasetPaths};
use climate_risk_engine::{DEFAULT_ASSET_VALUE, RiskEngine, parse_building_type, parse_hazard};
use climate_risk_resolver::RegionTable;
use climate_risk_server::country::CountryLookup;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "climate_risk", about = "Climate risk assessment tool")]
struct Cli {
    /// Dataset directory. Defaults to `$CLIMATE_DATA_DIR` or `data/climate`.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assess all five hazards at a coordinate
    Assess {
        #[command(flatten)]
        point: PointArgs,
        #[command(flatten)]
        asset: AssetArgs,
    },
    /// Assess a single hazard at a coordinate
    Hazard {
        /// One of hurricane, flood, heat, drought, precipitation
        hazard: String,
        #[command(flatten)]
        point: PointArgs,
        #[command(flatten)]
        asset: AssetArgs,
    },
    /// Assess a country at its population-weighted center
    Country {
        /// Country name, exactly as in the lookup file
        name: String,
        /// Country lookup file. Defaults to `$COUNTRY_LOOKUP_PATH` or the
        /// data directory.
        #[arg(long)]
        lookup: Option<PathBuf>,
        #[command(flatten)]
        asset: AssetArgs,
    },
    /// Show which datasets load
    Health,
    /// List the regional baseline table
    Regions,
    /// Start the HTTP API server
    Serve,
}

#[derive(Args)]
struct PointArgs {
    /// Latitude in degrees
    #[arg(allow_negative_numbers = true)]
    latitude: f64,
    /// Longitude in degrees
    #[arg(allow_negative_numbers = true)]
    longitude: f64,
}

#[derive(Args)]
struct AssetArgs {
    /// Insured asset value
    #[arg(long, default_value_t = DEFAULT_ASSET_VALUE)]
    asset_value: f64,
    /// Building type (`wood_frame`, `concrete`, `residential`, `commercial`,
    /// `industrial`)
    #[arg(long)]
    building_type: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    let paths = cli
        .data_dir
        .map_or_else(DatasetPaths::from_env, DatasetPaths::new);

    match cli.command {
        Commands::Assess { point, asset } => {
            let engine = load_engine(&paths)?;
            let result = engine.assess(
                point.latitude,
                point.longitude,
                asset.asset_value,
                parse_building_type(asset.building_type.as_deref()),
            )?;
            print_json(&result)?;
        }
        Commands::Hazard {
            hazard,
            point,
            asset,
        } => {
            let kind = parse_hazard(&hazard)?;
            let engine = load_engine(&paths)?;
            let result = engine.assess_hazard(
                kind,
                point.latitude,
                point.longitude,
                asset.asset_value,
                parse_building_type(asset.building_type.as_deref()),
            )?;
            print_json(&result)?;
        }
        Commands::Country {
            name,
            lookup,
            asset,
        } => {
            let lookup_path = lookup.unwrap_or_else(|| CountryLookup::path_from_env(&paths));
            let countries = CountryLookup::load(&lookup_path)?;
            let location = countries.resolve(&name)?;
            let engine = load_engine(&paths)?;
            let result = engine.assess_location(
                &location,
                asset.asset_value,
                parse_building_type(asset.building_type.as_deref()),
            )?;
            print_json(&result)?;
        }
        Commands::Health => {
            let datasets = DatasetIndexes::load(&paths)?;
            let status = datasets.status();
            if !status.fully_loaded() {
                log::warn!("Not every dataset loaded from {}", paths.data_dir().display());
            }
            print_json(&status)?;
        }
        Commands::Regions => {
            let regions = RegionTable::embedded()?;
            print_json(regions.regions())?;
        }
        Commands::Serve => {
            let state = climate_risk_server::load_state_from(&paths)?;
            actix_web::rt::System::new().block_on(climate_risk_server::run_server(state))?;
        }
    }

    Ok(())
}

fn load_engine(paths: &DatasetPaths) -> Result<RiskEngine, Box<dyn std::error::Error>> {
    let datasets = DatasetIndexes::load(paths)?;
    let regions = RegionTable::embedded()?;
    Ok(RiskEngine::new(Arc::new(datasets), regions))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
