//! Drought loss from consecutive dry days.

use climate_risk_hazard_models::{BuildingType, HazardAssessment};
use climate_risk_resolver::ResolvedSample;

use super::ChronicModel;

/// Scales the raw curve to observed drought loss ratios.
pub const CALIBRATION: f64 = 0.6;

/// Annual damage ratio for a mean of `days` consecutive dry days.
#[must_use]
pub fn damage_ratio(days: f64) -> f64 {
    if days < 30.0 {
        0.0
    } else if days < 60.0 {
        (days - 30.0).mul_add(0.000_03, 0.000_5)
    } else if days < 90.0 {
        (days - 60.0).mul_add(0.000_05, 0.001_5)
    } else {
        (days - 90.0).mul_add(0.000_08, 0.003)
    }
}

const MODEL: ChronicModel = ChronicModel {
    damage_ratio,
    calibration: CALIBRATION,
    describe: |days| format!("Average consecutive dry days: {days:.0}"),
};

/// Drought loss for a resolved `cdd` sample.
#[must_use]
pub fn assess(
    sample: &ResolvedSample,
    asset_value: f64,
    building_type: BuildingType,
) -> HazardAssessment {
    MODEL.assess(sample, asset_value, building_type)
}
