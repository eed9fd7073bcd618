//! Hurricane wind loss from historical storm exposure.
//!
//! Each damaging storm contributes the damage ratio of its peak effective
//! wind. The mean ratio is multiplied by the storms' annual frequency over
//! the track record and a calibration factor fitted so that a heavily
//! exposed coastal reference site (Miami) lands near a 1.5% annual loss.

use climate_risk_datasets::hurricane::TRACK_RECORD_YEARS;
use climate_risk_hazard_models::{BuildingType, Confidence, HazardAssessment, WindDamageClass};
use climate_risk_resolver::HurricaneSample;

use super::percentage;

/// Scales the raw frequency-severity product to observed loss ratios.
pub const CALIBRATION: f64 = 0.22;

/// Storm count at which the estimate is considered well supported.
pub const HIGH_CONFIDENCE_STORMS: usize = 5;

/// HAZUS-style damage ratio for a sustained wind of `mph`.
#[must_use]
pub fn wind_damage_ratio(mph: f64, class: WindDamageClass) -> f64 {
    if mph < 74.0 {
        return 0.0;
    }
    match class {
        WindDamageClass::WoodFrame => {
            if mph < 95.0 {
                (mph - 74.0).mul_add(0.004_8, 0.05)
            } else if mph < 110.0 {
                (mph - 95.0).mul_add(0.01, 0.15)
            } else if mph < 130.0 {
                (mph - 110.0).mul_add(0.01, 0.30)
            } else if mph < 157.0 {
                (mph - 130.0).mul_add(0.011_1, 0.50)
            } else {
                (mph - 157.0).mul_add(0.005, 0.80).min(1.0)
            }
        }
        WindDamageClass::Concrete => {
            if mph < 95.0 {
                (mph - 74.0).mul_add(0.001_4, 0.02)
            } else if mph < 110.0 {
                (mph - 95.0).mul_add(0.003_3, 0.05)
            } else if mph < 130.0 {
                (mph - 110.0).mul_add(0.005, 0.10)
            } else if mph < 157.0 {
                (mph - 130.0).mul_add(0.007_4, 0.20)
            } else {
                (mph - 157.0).mul_add(0.007_5, 0.40).min(0.70)
            }
        }
    }
}

/// Hurricane loss for a storm exposure sample.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn assess(
    sample: &HurricaneSample,
    asset_value: f64,
    building_type: BuildingType,
) -> HazardAssessment {
    let storms = match sample {
        HurricaneSample::NoData => {
            return HazardAssessment::zero(
                Confidence::NoData,
                Some("Hurricane track data unavailable".to_string()),
            );
        }
        HurricaneSample::Exposure { storms } if storms.is_empty() => {
            return HazardAssessment::zero(
                Confidence::LowRisk,
                Some("No damaging hurricanes in historical record".to_string()),
            );
        }
        HurricaneSample::Exposure { storms } => storms,
    };

    let class = building_type.wind_class();
    let count = storms.len();
    let mean_damage = storms
        .iter()
        .map(|storm| wind_damage_ratio(storm.peak_wind_mph, class))
        .sum::<f64>()
        / count as f64;
    let frequency = count as f64 / f64::from(TRACK_RECORD_YEARS);

    let annual_loss = frequency * mean_damage * asset_value * CALIBRATION;
    let peak = sample.max_wind_mph().unwrap_or_default();

    HazardAssessment {
        annual_loss,
        annual_loss_pct: percentage(annual_loss, asset_value),
        confidence: if count >= HIGH_CONFIDENCE_STORMS {
            Confidence::High
        } else {
            Confidence::Medium
        },
        details: Some(format!(
            "{count} unique storms in {TRACK_RECORD_YEARS} years, peak effective wind {peak:.0} mph"
        )),
    }
}
