//! Great-circle distances and R-tree search envelopes.
//!
//! All R-trees in this crate store points as `[longitude, latitude]` in
//! degrees. A radius query is answered in two steps: a coarse degree-space
//! envelope lookup, then an exact haversine filter on the candidates.

use geo::{Distance, Haversine, Point};
use rstar::AABB;

/// Shortest north-south length of one degree of latitude, in kilometres.
/// Using the minimum keeps search envelopes conservative.
const MIN_KM_PER_DEGREE: f64 = 110.5;

/// Great-circle distance between two coordinates, in kilometres.
#[must_use]
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    Haversine.distance(Point::new(lon1, lat1), Point::new(lon2, lat2)) / 1000.0
}

/// Degree-space envelopes covering every point within `radius_km` of
/// `(lat, lon)`.
///
/// Returns two envelopes when the circle crosses the antimeridian, and a
/// full-longitude band when it reaches a pole.
#[must_use]
pub fn search_envelopes(lat: f64, lon: f64, radius_km: f64) -> Vec<AABB<[f64; 2]>> {
    let dlat = radius_km / MIN_KM_PER_DEGREE;
    let min_lat = (lat - dlat).max(-90.0);
    let max_lat = (lat + dlat).min(90.0);

    let widest = lat.abs() + dlat;
    if widest >= 90.0 {
        return vec![AABB::from_corners([-180.0, min_lat], [180.0, max_lat])];
    }

    let dlon = dlat / widest.to_radians().cos();
    if dlon >= 180.0 {
        return vec![AABB::from_corners([-180.0, min_lat], [180.0, max_lat])];
    }

    let min_lon = lon - dlon;
    let max_lon = lon + dlon;
    let mut envelopes = vec![AABB::from_corners(
        [min_lon.max(-180.0), min_lat],
        [max_lon.min(180.0), max_lat],
    )];

    if min_lon < -180.0 {
        envelopes.push(AABB::from_corners([min_lon + 360.0, min_lat], [180.0, max_lat]));
    }
    if max_lon > 180.0 {
        envelopes.push(AABB::from_corners([-180.0, min_lat], [max_lon - 360.0, max_lat]));
    }

    envelopes
}

/// Wraps a longitude into `[-180, 180)`.
#[must_use]
pub fn normalize_longitude(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}
