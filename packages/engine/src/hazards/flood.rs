//! Flood loss from the 100-year inundation depth.

use climate_risk_hazard_models::{BuildingType, Confidence, FloodDamageClass, HazardAssessment};
use climate_risk_resolver::FloodSample;

use super::percentage;

/// Annual exceedance probability of the 100-year flood.
pub const ANNUAL_PROBABILITY: f64 = 0.01;

/// Conservative scaling of the depth-damage estimate.
pub const CALIBRATION: f64 = 0.8;

const RESIDENTIAL: &[(f64, f64)] = &[
    (0.0, 0.00),
    (0.3, 0.10),
    (1.0, 0.20),
    (2.0, 0.40),
    (3.0, 0.60),
    (4.0, 0.75),
    (5.0, 0.85),
];

const COMMERCIAL: &[(f64, f64)] = &[
    (0.0, 0.00),
    (0.3, 0.15),
    (1.0, 0.35),
    (2.0, 0.55),
    (3.0, 0.70),
    (4.0, 0.80),
    (5.0, 0.90),
];

const INDUSTRIAL: &[(f64, f64)] = &[
    (0.0, 0.00),
    (0.3, 0.08),
    (1.0, 0.18),
    (2.0, 0.35),
    (3.0, 0.50),
    (4.0, 0.65),
    (5.0, 0.75),
];

const fn curve(class: FloodDamageClass) -> &'static [(f64, f64)] {
    match class {
        FloodDamageClass::Residential => RESIDENTIAL,
        FloodDamageClass::Commercial => COMMERCIAL,
        FloodDamageClass::Industrial => INDUSTRIAL,
    }
}

/// HAZUS-style depth-damage ratio, linearly interpolated between knots and
/// capped at the deepest knot.
#[must_use]
pub fn depth_damage_ratio(depth_m: f64, class: FloodDamageClass) -> f64 {
    let knots = curve(class);
    if depth_m <= 0.0 || !depth_m.is_finite() {
        return 0.0;
    }

    for pair in knots.windows(2) {
        let (d1, r1) = pair[0];
        let (d2, r2) = pair[1];
        if depth_m <= d2 {
            let t = (depth_m - d1) / (d2 - d1);
            return t.mul_add(r2 - r1, r1);
        }
    }

    knots.last().map_or(0.0, |(_, ratio)| *ratio)
}

/// Flood loss for a depth sample.
#[must_use]
pub fn assess(
    sample: &FloodSample,
    asset_value: f64,
    building_type: BuildingType,
) -> HazardAssessment {
    let depth_m = match sample {
        FloodSample::NoData => {
            return HazardAssessment::zero(
                Confidence::NoData,
                Some("Flood depth data unavailable".to_string()),
            );
        }
        FloodSample::NoFlooding => {
            return HazardAssessment::zero(
                Confidence::LowRisk,
                Some("No significant flood risk in this location".to_string()),
            );
        }
        FloodSample::Depth { depth_m, .. } => *depth_m,
    };

    let ratio = depth_damage_ratio(depth_m, building_type.flood_class());
    let annual_loss = ANNUAL_PROBABILITY * ratio * asset_value * CALIBRATION;

    HazardAssessment {
        annual_loss,
        annual_loss_pct: percentage(annual_loss, asset_value),
        confidence: Confidence::High,
        details: Some(format!(
            "100-year flood depth: {depth_m:.2}m, damage ratio: {:.1}%",
            ratio * 100.0
        )),
    }
}
