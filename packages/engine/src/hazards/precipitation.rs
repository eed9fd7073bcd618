//! Extreme precipitation loss from annual maximum 5-day totals.

use climate_risk_hazard_models::{BuildingType, HazardAssessment};
use climate_risk_resolver::ResolvedSample;

use super::ChronicModel;

/// Scales the raw curve to observed pluvial loss ratios.
pub const CALIBRATION: f64 = 0.7;

/// Annual damage ratio for a mean 5-day maximum of `mm`.
#[must_use]
pub fn damage_ratio(mm: f64) -> f64 {
    if mm < 50.0 {
        0.0
    } else if mm < 100.0 {
        (mm - 50.0).mul_add(0.000_04, 0.001)
    } else if mm < 200.0 {
        (mm - 100.0).mul_add(0.000_06, 0.003)
    } else {
        (mm - 200.0).mul_add(0.000_08, 0.009)
    }
}

const MODEL: ChronicModel = ChronicModel {
    damage_ratio,
    calibration: CALIBRATION,
    describe: |mm| format!("Average 5-day max precipitation: {mm:.0}mm"),
};

/// Extreme precipitation loss for a resolved `rx5day` sample.
#[must_use]
pub fn assess(
    sample: &ResolvedSample,
    asset_value: f64,
    building_type: BuildingType,
) -> HazardAssessment {
    MODEL.assess(sample, asset_value, building_type)
}

#[cfg(test)]
mod tests {
    use climate_risk_hazard_models::Confidence;

    use super::*;

    #[test]
    fn curve_knots() {
        assert!(damage_ratio(49.0).abs() < f64::EPSILON);
        assert!((damage_ratio(50.0) - 0.001).abs() < 1e-12);
        assert!((damage_ratio(100.0) - 0.003).abs() < 1e-12);
        assert!((damage_ratio(200.0) - 0.009).abs() < 1e-12);
        assert!((damage_ratio(300.0) - 0.017).abs() < 1e-12);
    }

    #[test]
    fn interpolated_sample_is_medium_confidence() {
        let sample = ResolvedSample::Interpolated {
            value: 150.0,
            neighbors: 4,
        };
        let a = assess(&sample, 1_000_000.0, BuildingType::Industrial);
        assert_eq!(a.confidence, Confidence::Medium);
        // 0.006 * 0.7 * 0.85 * 1e6
        assert!((a.annual_loss - 3570.0).abs() < 1e-6);
        assert!(a.details.unwrap().contains("interpolated from 4"));
    }
}
