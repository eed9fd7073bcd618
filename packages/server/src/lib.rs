#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for climate risk assessment.
//!
//! Loads the datasets once at startup into a shared [`RiskEngine`] and
//! serves full, country-level and single-hazard assessments as JSON.
//! Handlers only read shared state, so requests run fully in parallel
//! across the actix workers.

pub mod country;
mod handlers;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::error::InternalError;
use actix_web::{App, HttpResponse, HttpServer, middleware, web};
use climate_risk_datasets::{DatasetError, DatasetIndexes, DatasetPaths};
use climate_risk_engine::RiskEngine;
use climate_risk_resolver::{RegionTable, RegionTableError};
use climate_risk_server_models::ApiError;

use crate::country::{CountryLookup, CountryLookupError};

/// Errors that stop the server from starting.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// A dataset failed to load.
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    /// The regional baseline table is invalid.
    #[error(transparent)]
    Regions(#[from] RegionTableError),

    /// The country lookup exists but could not be loaded.
    #[error(transparent)]
    Country(#[from] CountryLookupError),

    /// Binding or running the HTTP server failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Shared application state.
pub struct AppState {
    /// Assessment engine over the loaded datasets.
    pub engine: RiskEngine,
    /// Country lookup, when one was found.
    pub countries: Option<CountryLookup>,
}

/// Loads the state from the data directory named by `CLIMATE_DATA_DIR`.
///
/// # Errors
///
/// See [`load_state_from`].
pub fn load_state() -> Result<AppState, ServerError> {
    load_state_from(&DatasetPaths::from_env())
}

/// Loads the datasets, the baseline table and the country lookup.
///
/// The country lookup comes from `COUNTRY_LOOKUP_PATH`, or the data
/// directory. A missing country lookup only disables `/assess/country`.
///
/// # Errors
///
/// Returns an error if the data directory is missing or any present file
/// fails to load.
pub fn load_state_from(paths: &DatasetPaths) -> Result<AppState, ServerError> {
    let datasets = DatasetIndexes::load(paths)?;
    let regions = RegionTable::embedded()?;

    let lookup_path = CountryLookup::path_from_env(paths);
    let countries = if lookup_path.is_file() {
        Some(CountryLookup::load(&lookup_path)?)
    } else {
        log::warn!(
            "Country lookup {} not found; country assessments are disabled",
            lookup_path.display()
        );
        None
    };

    let status = datasets.status();
    if !status.any_loaded() {
        log::error!("No datasets loaded; every assessment will report No Data");
    }

    Ok(AppState {
        engine: RiskEngine::new(Arc::new(datasets), regions),
        countries,
    })
}

/// Registers the API routes and the JSON body configuration.
pub fn configure(cfg: &mut web::ServiceConfig) {
    let json_config = web::JsonConfig::default().error_handler(|err, _req| {
        let response =
            HttpResponse::BadRequest().json(ApiError::new(format!("Invalid request body: {err}")));
        InternalError::from_response(err, response).into()
    });

    cfg.app_data(json_config)
        .route("/", web::get().to(handlers::index))
        .route("/health", web::get().to(handlers::health))
        .route("/assess", web::post().to(handlers::assess))
        // Must precede the `{hazard}` route.
        .route("/assess/country", web::post().to(handlers::assess_country))
        .route("/assess/{hazard}", web::post().to(handlers::assess_hazard));
}

/// Runs the HTTP server until it is shut down.
///
/// Binds to `BIND_ADDR` (default `127.0.0.1`) and `PORT` (default `8080`).
///
/// # Errors
///
/// Returns an error if the address cannot be bound.
pub async fn run_server(state: AppState) -> Result<(), ServerError> {
    let state = web::Data::new(state);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await?;

    Ok(())
}
