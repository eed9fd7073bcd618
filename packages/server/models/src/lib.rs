#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the climate risk server.
//!
//! Field names are `snake_case` on the wire. Assessment results themselves
//! are the [`climate_risk_hazard_models`] types, serialized as-is.

use std::collections::BTreeMap;

use climate_risk_datasets::DatasetStatus;
use climate_risk_hazard_models::HazardKind;
use serde::{Deserialize, Serialize};

/// Body of `POST /assess` and `POST /assess/{hazard}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessRequest {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Insured asset value. Defaults to 1,000,000.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_value: Option<f64>,
    /// Building type name. Defaults to `wood_frame`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building_type: Option<String>,
}

/// Body of `POST /assess/country`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryAssessRequest {
    /// Country name as it appears in the lookup table.
    pub country: String,
    /// Insured asset value. Defaults to 1,000,000.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_value: Option<f64>,
    /// Building type name. Defaults to `wood_frame`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building_type: Option<String>,
}

/// Health state reported by `GET /health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// At least one dataset is loaded.
    Healthy,
    /// Nothing is loaded; every assessment would be empty.
    Unhealthy,
}

/// Response of `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiHealth {
    /// Overall state.
    pub status: HealthStatus,
    /// Server version.
    pub version: String,
    /// Per-dataset load status.
    #[serde(flatten)]
    pub datasets: DatasetStatus,
}

/// Worked example shown by the service descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiExample {
    /// Endpoint path.
    pub endpoint: String,
    /// HTTP method.
    pub method: String,
    /// Request body.
    pub body: AssessRequest,
}

/// Response of `GET /`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiServiceInfo {
    /// Service name.
    pub name: String,
    /// Server version.
    pub version: String,
    /// One-line description.
    pub description: String,
    /// Dataset provenance, keyed by dataset.
    pub data_sources: BTreeMap<String, String>,
    /// Endpoint summaries, keyed by path.
    pub endpoints: BTreeMap<String, String>,
    /// Example request.
    pub example: ApiExample,
}

/// Error body returned with every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable message.
    pub error: String,
    /// Known country names, when a country lookup failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_countries: Option<Vec<String>>,
    /// Number of known countries, when a country lookup failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_countries: Option<usize>,
    /// Accepted hazard route names, when the hazard was unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<Vec<String>>,
}

impl ApiError {
    /// Error with only a message.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            available_countries: None,
            total_countries: None,
            available: None,
        }
    }

    /// Unknown-country error listing the known countries.
    #[must_use]
    pub fn unknown_country(error: impl Into<String>, countries: Vec<String>) -> Self {
        Self {
            total_countries: Some(countries.len()),
            available_countries: Some(countries),
            ..Self::new(error)
        }
    }

    /// Unknown-hazard error listing the accepted route names.
    #[must_use]
    pub fn unknown_hazard(error: impl Into<String>) -> Self {
        Self {
            available: Some(
                HazardKind::all()
                    .iter()
                    .map(|kind| kind.route_name().to_string())
                    .collect(),
            ),
            ..Self::new(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assess_request_defaults_are_optional() {
        let req: AssessRequest =
            serde_json::from_str(r#"{"latitude": 25.76, "longitude": -80.19}"#).unwrap();
        assert!(req.asset_value.is_none());
        assert!(req.building_type.is_none());
    }

    #[test]
    fn health_flattens_dataset_status() {
        let health = ApiHealth {
            status: HealthStatus::Healthy,
            version: "0.1.0".to_string(),
            datasets: DatasetStatus {
                climate_indices: Vec::new(),
                hadex3_loaded: 0,
                grid_cells: 0,
                hurricane_data: true,
                hurricane_storms: 12,
                flood_data: false,
                flood_lookup_points: 0,
            },
        };
        let json = serde_json::to_value(&health).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["hurricane_storms"], 12);
        assert_eq!(json["hurricane_data"], true);
    }

    #[test]
    fn error_omits_empty_context() {
        let json = serde_json::to_value(ApiError::new("boom")).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "boom" }));

        let json = serde_json::to_value(ApiError::unknown_hazard("Unknown risk type: x")).unwrap();
        assert_eq!(json["available"].as_array().map(Vec::len), Some(5));

        let err = ApiError::unknown_country("Country not found: X", vec!["A".into(), "B".into()]);
        assert_eq!(err.total_countries, Some(2));
    }
}
