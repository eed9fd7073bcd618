#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Climate risk assessment engine.
//!
//! Given a coordinate, an asset value and a building type, the engine
//! resolves each hazard's data through [`SpatialResolver`], runs the five
//! [`hazards`] models, sums their annual losses and projects the total
//! over the fixed horizon in [`projection`].
//!
//! The engine holds only immutable state and every operation is a pure
//! function of its inputs and that state, so a single [`RiskEngine`] can be
//! shared across threads.

pub mod hazards;
pub mod projection;

use std::sync::Arc;

use climate_risk_datasets::{DatasetIndexes, DatasetStatus};
use climate_risk_hazard_models::{
    AssessmentParameters, AssessmentResult, AssessmentType, BuildingType, HazardAssessment,
    HazardKind, Location, RiskBreakdown,
};
use climate_risk_resolver::{RegionTable, SpatialResolver};

use crate::hazards::percentage;
use crate::projection::{
    CLIMATE_ESCALATION, DISCOUNT_RATE, TIME_HORIZON_YEARS, standard_present_value,
};

/// Asset value used when a caller does not supply one.
pub const DEFAULT_ASSET_VALUE: f64 = 1_000_000.0;

/// Rejected assessment inputs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Latitude outside `[-90, 90]` or not a number.
    #[error("Latitude must be between -90 and 90, got {0}")]
    Latitude(f64),

    /// Longitude outside `[-180, 180]` or not a number.
    #[error("Longitude must be between -180 and 180, got {0}")]
    Longitude(f64),

    /// Asset value not strictly positive or not finite.
    #[error("Asset value must be a positive number, got {0}")]
    AssetValue(f64),

    /// Country name missing from the lookup table.
    #[error("Country not found: {0}")]
    UnknownCountry(String),

    /// Hazard name that is not one of the five hazards.
    #[error("Unknown risk type: {0}")]
    UnknownHazard(String),
}

/// Checks the coordinate and asset value.
///
/// # Errors
///
/// Returns the first failing check.
pub fn validate(latitude: f64, longitude: f64, asset_value: f64) -> Result<(), ValidationError> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(ValidationError::Latitude(latitude));
    }
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(ValidationError::Longitude(longitude));
    }
    if !asset_value.is_finite() || asset_value <= 0.0 {
        return Err(ValidationError::AssetValue(asset_value));
    }
    Ok(())
}

/// Parses a hazard route name (`hurricane`, `flood`, `heat`, `drought`,
/// `precipitation`).
///
/// # Errors
///
/// Returns [`ValidationError::UnknownHazard`] for any other name.
pub fn parse_hazard(name: &str) -> Result<HazardKind, ValidationError> {
    HazardKind::from_route_name(name).ok_or_else(|| ValidationError::UnknownHazard(name.to_string()))
}

/// Parses a building type leniently. Unknown names fall back to the default
/// (wood frame) with a warning.
#[must_use]
pub fn parse_building_type(name: Option<&str>) -> BuildingType {
    let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) else {
        return BuildingType::default();
    };

    name.to_ascii_lowercase().parse().unwrap_or_else(|_| {
        log::warn!(
            "Unknown building type '{name}', using {}",
            BuildingType::default()
        );
        BuildingType::default()
    })
}

/// A coordinate resolved from a country name by an external lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    /// Country name as requested.
    pub country: String,
    /// Name of the population-weighted center.
    pub name: String,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

/// Shared, immutable assessment engine.
#[derive(Debug, Clone)]
pub struct RiskEngine {
    datasets: Arc<DatasetIndexes>,
    regions: Arc<RegionTable>,
}

impl RiskEngine {
    /// Creates an engine over loaded datasets and a baseline table.
    #[must_use]
    pub fn new(datasets: Arc<DatasetIndexes>, regions: RegionTable) -> Self {
        Self {
            datasets,
            regions: Arc::new(regions),
        }
    }

    /// Resolver bound to this engine's datasets.
    #[must_use]
    pub fn resolver(&self) -> SpatialResolver<'_> {
        SpatialResolver::new(&self.datasets, &self.regions)
    }

    /// Dataset load status.
    #[must_use]
    pub fn status(&self) -> DatasetStatus {
        self.datasets.status()
    }

    /// Full five-hazard assessment at a coordinate.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] before touching any dataset if the
    /// coordinate or asset value is invalid.
    pub fn assess(
        &self,
        latitude: f64,
        longitude: f64,
        asset_value: f64,
        building_type: BuildingType,
    ) -> Result<AssessmentResult, ValidationError> {
        validate(latitude, longitude, asset_value)?;

        let resolver = self.resolver();
        let run = |kind| {
            hazards::assess(
                kind,
                &resolver,
                latitude,
                longitude,
                asset_value,
                building_type,
            )
        };

        let risk_breakdown = RiskBreakdown {
            hurricane: run(HazardKind::Hurricane),
            flood: run(HazardKind::Flood),
            heat_stress: run(HazardKind::HeatStress),
            drought: run(HazardKind::Drought),
            extreme_precipitation: run(HazardKind::ExtremePrecipitation),
        };

        let expected_annual_loss = risk_breakdown.total_annual_loss();
        let present_value = standard_present_value(expected_annual_loss);

        log::debug!(
            "Assessed ({latitude}, {longitude}): EAL {expected_annual_loss:.2}, PV {present_value:.2}"
        );

        Ok(AssessmentResult {
            asset_value,
            expected_annual_loss,
            expected_annual_loss_pct: percentage(expected_annual_loss, asset_value),
            present_value_30yr: present_value,
            present_value_30yr_pct: percentage(present_value, asset_value),
            risk_breakdown,
            location: Location {
                latitude,
                longitude,
                name: None,
                description: None,
            },
            parameters: AssessmentParameters {
                building_type,
                time_horizon: TIME_HORIZON_YEARS,
                discount_rate: DISCOUNT_RATE,
                climate_escalation: CLIMATE_ESCALATION,
            },
            country: None,
            assessment_type: None,
        })
    }

    /// Full assessment at a country's population-weighted center. The
    /// country and center name are echoed in the result.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the resolved coordinate or asset
    /// value is invalid.
    pub fn assess_location(
        &self,
        location: &ResolvedLocation,
        asset_value: f64,
        building_type: BuildingType,
    ) -> Result<AssessmentResult, ValidationError> {
        let mut result = self.assess(
            location.latitude,
            location.longitude,
            asset_value,
            building_type,
        )?;

        result.country = Some(location.country.clone());
        result.assessment_type = Some(AssessmentType::PopulationWeighted);
        result.location.name = Some(location.name.clone());
        result.location.description = Some(format!(
            "Population-weighted center of {}",
            location.country
        ));
        Ok(result)
    }

    /// Assessment of a single hazard at a coordinate.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the coordinate or asset value is
    /// invalid.
    pub fn assess_hazard(
        &self,
        kind: HazardKind,
        latitude: f64,
        longitude: f64,
        asset_value: f64,
        building_type: BuildingType,
    ) -> Result<HazardAssessment, ValidationError> {
        validate(latitude, longitude, asset_value)?;
        Ok(hazards::assess(
            kind,
            &self.resolver(),
            latitude,
            longitude,
            asset_value,
            building_type,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_bounds_are_inclusive() {
        assert!(validate(90.0, 180.0, 1.0).is_ok());
        assert!(validate(-90.0, -180.0, 0.01).is_ok());
        assert_eq!(validate(95.0, 0.0, 1.0), Err(ValidationError::Latitude(95.0)));
        assert_eq!(
            validate(0.0, -180.5, 1.0),
            Err(ValidationError::Longitude(-180.5))
        );
        assert_eq!(validate(0.0, 0.0, 0.0), Err(ValidationError::AssetValue(0.0)));
        assert!(validate(f64::NAN, 0.0, 1.0).is_err());
        assert!(validate(0.0, 0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn building_type_parsing_is_lenient() {
        assert_eq!(parse_building_type(None), BuildingType::WoodFrame);
        assert_eq!(parse_building_type(Some("")), BuildingType::WoodFrame);
        assert_eq!(parse_building_type(Some("Concrete")), BuildingType::Concrete);
        assert_eq!(
            parse_building_type(Some(" industrial ")),
            BuildingType::Industrial
        );
        assert_eq!(parse_building_type(Some("igloo")), BuildingType::WoodFrame);
    }

    #[test]
    fn hazard_names_parse_or_fail() {
        assert_eq!(parse_hazard("heat"), Ok(HazardKind::HeatStress));
        assert_eq!(
            parse_hazard("tornado"),
            Err(ValidationError::UnknownHazard("tornado".to_string()))
        );
    }

    #[test]
    fn country_assessment_echoes_location() {
        let engine = RiskEngine::new(
            Arc::new(DatasetIndexes::default()),
            RegionTable::embedded().unwrap(),
        );
        let location = ResolvedLocation {
            country: "France".to_string(),
            name: "Paris region".to_string(),
            latitude: 48.5,
            longitude: 2.5,
        };
        let result = engine
            .assess_location(&location, 500_000.0, BuildingType::Residential)
            .unwrap();
        assert_eq!(result.country.as_deref(), Some("France"));
        assert_eq!(result.assessment_type, Some(AssessmentType::PopulationWeighted));
        assert_eq!(result.location.name.as_deref(), Some("Paris region"));
        assert_eq!(result.parameters.building_type, BuildingType::Residential);
        assert_eq!(result.parameters.time_horizon, 30);
    }
}
