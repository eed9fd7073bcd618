//! Sparse 100-year flood-depth points.
//!
//! The source is a JSON object whose keys are `"lat,lon"` strings on a
//! half-degree lattice and whose values are inundation depths in metres.

use std::collections::BTreeMap;
use std::path::Path;

use rstar::{AABB, RTree, RTreeObject};

use crate::DatasetError;
use crate::geodesy::{distance_km, normalize_longitude, search_envelopes};

/// A single flood-depth record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloodPoint {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees, in `[-180, 180)`.
    pub longitude: f64,
    /// Inundation depth of the 100-year flood, in metres.
    pub depth_m: f64,
}

impl RTreeObject for FloodPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.longitude, self.latitude])
    }
}

/// The flood point matched to a query coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloodMatch {
    /// The matched point.
    pub point: FloodPoint,
    /// Great-circle distance from the query coordinate.
    pub distance_km: f64,
}

/// Immutable nearest-point lookup over flood depths.
pub struct FloodLookup {
    tree: RTree<FloodPoint>,
}

impl std::fmt::Debug for FloodLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FloodLookup")
            .field("points", &self.tree.size())
            .finish()
    }
}

impl FloodLookup {
    /// Builds the lookup from points. Points with a non-finite position or
    /// depth are discarded.
    #[must_use]
    pub fn new(points: Vec<FloodPoint>) -> Self {
        let points = points
            .into_iter()
            .filter(|p| p.latitude.is_finite() && p.longitude.is_finite() && p.depth_m.is_finite())
            .map(|p| FloodPoint {
                longitude: normalize_longitude(p.longitude),
                ..p
            })
            .collect();

        Self {
            tree: RTree::bulk_load(points),
        }
    }

    /// Loads the `"lat,lon" -> depth` JSON lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a JSON object
    /// of numbers.
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let raw: BTreeMap<String, f64> = serde_json::from_reader(crate::open_source(path)?)
            .map_err(|source| DatasetError::Json {
                path: path.display().to_string(),
                source,
            })?;

        let mut skipped = 0_u64;
        let points: Vec<FloodPoint> = raw
            .iter()
            .filter_map(|(key, depth)| {
                let point = parse_key(key).map(|(latitude, longitude)| FloodPoint {
                    latitude,
                    longitude,
                    depth_m: *depth,
                });
                if point.is_none() {
                    skipped += 1;
                }
                point
            })
            .collect();

        if skipped > 0 {
            log::warn!(
                "Skipped {skipped} malformed flood lookup keys in {}",
                path.display()
            );
        }

        let lookup = Self::new(points);
        log::info!(
            "Loaded {} flood lookup points from {}",
            lookup.len(),
            path.display()
        );
        Ok(lookup)
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Whether the lookup holds no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Nearest point within `radius_km` of `(lat, lon)`, if any. Ties on
    /// distance resolve to the deeper point so the answer does not depend
    /// on tree layout.
    #[must_use]
    pub fn nearest_within(&self, lat: f64, lon: f64, radius_km: f64) -> Option<FloodMatch> {
        search_envelopes(lat, lon, radius_km)
            .iter()
            .flat_map(|envelope| self.tree.locate_in_envelope(envelope))
            .map(|point| FloodMatch {
                point: *point,
                distance_km: distance_km(lat, lon, point.latitude, point.longitude),
            })
            .filter(|m| m.distance_km <= radius_km)
            .min_by(|a, b| {
                a.distance_km
                    .total_cmp(&b.distance_km)
                    .then_with(|| b.point.depth_m.total_cmp(&a.point.depth_m))
            })
    }
}

/// Parses a `"lat,lon"` key.
fn parse_key(key: &str) -> Option<(f64, f64)> {
    let (lat, lon) = key.split_once(',')?;
    let lat: f64 = lat.trim().parse().ok()?;
    let lon: f64 = lon.trim().parse().ok()?;
    ((-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)).then_some((lat, lon))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup() -> FloodLookup {
        FloodLookup::new(vec![
            FloodPoint {
                latitude: 23.5,
                longitude: 90.5,
                depth_m: 2.4,
            },
            FloodPoint {
                latitude: 23.5,
                longitude: 91.0,
                depth_m: 1.1,
            },
        ])
    }

    #[test]
    fn matches_nearest_point_within_radius() {
        let m = lookup().nearest_within(23.6, 90.6, 40.0).unwrap();
        assert!((m.point.depth_m - 2.4).abs() < f64::EPSILON);
        assert!(m.distance_km < 20.0);
    }

    #[test]
    fn nothing_beyond_radius() {
        assert!(lookup().nearest_within(25.76, -80.19, 40.0).is_none());
    }

    #[test]
    fn parses_lookup_keys() {
        assert_eq!(parse_key("25.5,-80.0"), Some((25.5, -80.0)));
        assert_eq!(parse_key(" -0.5 , 179.5 "), Some((-0.5, 179.5)));
        assert_eq!(parse_key("95.0,0.0"), None);
        assert_eq!(parse_key("north,east"), None);
        assert_eq!(parse_key("25.5"), None);
    }

    #[test]
    fn discards_non_finite_points() {
        let lookup = FloodLookup::new(vec![FloodPoint {
            latitude: 0.0,
            longitude: 0.0,
            depth_m: f64::NAN,
        }]);
        assert!(lookup.is_empty());
    }
}
