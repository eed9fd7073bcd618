//! Heat stress loss from annual maximum temperature.

use climate_risk_hazard_models::{BuildingType, HazardAssessment};
use climate_risk_resolver::ResolvedSample;

use super::ChronicModel;

/// Heat damage is chronic rather than acute; halve the raw curve.
pub const CALIBRATION: f64 = 0.5;

/// Annual damage ratio for a mean annual maximum of `celsius`.
#[must_use]
pub fn damage_ratio(celsius: f64) -> f64 {
    if celsius < 30.0 {
        0.0
    } else if celsius < 35.0 {
        (celsius - 30.0).mul_add(0.000_2, 0.001)
    } else if celsius < 40.0 {
        (celsius - 35.0).mul_add(0.000_4, 0.002)
    } else if celsius < 45.0 {
        (celsius - 40.0).mul_add(0.000_8, 0.004)
    } else {
        (celsius - 45.0).mul_add(0.001_2, 0.008)
    }
}

const MODEL: ChronicModel = ChronicModel {
    damage_ratio,
    calibration: CALIBRATION,
    describe: |celsius| format!("Average max temperature: {celsius:.1}°C"),
};

/// Heat stress loss for a resolved `txx` sample.
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
    use climate_risk_resolver::{CellValue, SampleWindow};

    use super::*;

    #[test]
    fn curve_knots() {
        assert!(damage_ratio(-20.0).abs() < f64::EPSILON);
        assert!((damage_ratio(30.0) - 0.001).abs() < 1e-12);
        assert!((damage_ratio(35.0) - 0.002).abs() < 1e-12);
        assert!((damage_ratio(40.0) - 0.004).abs() < 1e-12);
        assert!((damage_ratio(45.0) - 0.008).abs() < 1e-12);
        assert!((damage_ratio(50.0) - 0.014).abs() < 1e-12);
    }

    #[test]
    fn exact_cell_is_medium_confidence() {
        let sample = ResolvedSample::ExactCell(CellValue {
            value: 40.0,
            observations: 30,
            window: SampleWindow::Recent,
        });
        let a = assess(&sample, 2_000_000.0, BuildingType::WoodFrame);
        assert_eq!(a.confidence, Confidence::Medium);
        assert!((a.annual_loss - 4000.0).abs() < 1e-6);
        assert!((a.annual_loss_pct - 0.2).abs() < 1e-9);
        assert!(a.details.unwrap().starts_with("Average max temperature: 40.0°C"));
    }

    #[test]
    fn insufficient_data_is_zero_loss() {
        let a = assess(
            &ResolvedSample::InsufficientData,
            1_000_000.0,
            BuildingType::Commercial,
        );
        assert_eq!(a.confidence, Confidence::InsufficientData);
        assert!(a.annual_loss.abs() < f64::EPSILON);
    }
}
