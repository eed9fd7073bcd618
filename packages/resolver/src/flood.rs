//! Nearest-point flood depth sampling.

use climate_risk_datasets::FloodLookup;

/// Radius within which a flood point is considered to describe the query
/// coordinate.
pub const FLOOD_MATCH_RADIUS_KM: f64 = 40.0;

/// Result of the flood depth query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FloodSample {
    /// A nearby point with a positive 100-year depth.
    Depth {
        /// Inundation depth in metres.
        depth_m: f64,
        /// Distance to the matched point.
        distance_km: f64,
    },
    /// No nearby point, or the nearby point records no inundation.
    NoFlooding,
    /// The flood dataset is not loaded.
    NoData,
}

/// Flood depth at `(lat, lon)`. `None` for the lookup means the dataset
/// never loaded.
#[must_use]
pub fn sample(lookup: Option<&FloodLookup>, lat: f64, lon: f64) -> FloodSample {
    let Some(lookup) = lookup else {
        return FloodSample::NoData;
    };

    match lookup.nearest_within(lat, lon, FLOOD_MATCH_RADIUS_KM) {
        Some(m) if m.point.depth_m > 0.0 => FloodSample::Depth {
            depth_m: m.point.depth_m,
            distance_km: m.distance_km,
        },
        _ => FloodSample::NoFlooding,
    }
}
