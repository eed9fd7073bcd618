//! Proximity-weighted historical storm exposure.
//!
//! Track winds decay linearly to zero at [`EXPOSURE_RADIUS_KM`]. A storm
//! counts only if at least one of its samples still carries damaging wind
//! at the query coordinate once decayed.

use std::collections::{BTreeMap, BTreeSet};

use climate_risk_datasets::HurricaneTrackIndex;

/// Radius around the query coordinate that track samples are drawn from.
pub const EXPOSURE_RADIUS_KM: f64 = 100.0;

/// Knots to miles per hour.
pub const KNOTS_TO_MPH: f64 = 1.150_78;

/// Lowest effective wind speed that damages structures (Category 1).
pub const DAMAGING_WIND_MPH: f64 = 74.0;

/// One storm's strongest effect on the query coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct StormExposure {
    /// Source storm identifier.
    pub storm_id: String,
    /// Highest decayed wind among the storm's nearby samples, in mph.
    pub peak_wind_mph: f64,
    /// Closest distance between the coordinate and the storm's track.
    pub closest_approach_km: f64,
}

/// Result of the hurricane exposure query.
#[derive(Debug, Clone, PartialEq)]
pub enum HurricaneSample {
    /// Damaging storms near the coordinate (possibly none).
    Exposure {
        /// One entry per damaging storm, in index order.
        storms: Vec<StormExposure>,
    },
    /// The track dataset is not loaded.
    NoData,
}

impl HurricaneSample {
    /// Number of damaging storms.
    #[must_use]
    pub fn storm_count(&self) -> usize {
        match self {
            Self::Exposure { storms } => storms.len(),
            Self::NoData => 0,
        }
    }

    /// Damaging storms, empty when no data is loaded.
    #[must_use]
    pub fn storms(&self) -> &[StormExposure] {
        match self {
            Self::Exposure { storms } => storms,
            Self::NoData => &[],
        }
    }

    /// Highest peak wind over all damaging storms.
    #[must_use]
    pub fn max_wind_mph(&self) -> Option<f64> {
        self.storms()
            .iter()
            .map(|storm| storm.peak_wind_mph)
            .max_by(f64::total_cmp)
    }
}

/// Wind felt at `distance_km` from a sample of `wind_kt`, in mph.
#[must_use]
pub fn effective_wind_mph(wind_kt: f64, distance_km: f64) -> f64 {
    let decay = (1.0 - distance_km / EXPOSURE_RADIUS_KM).max(0.0);
    wind_kt * decay * KNOTS_TO_MPH
}

/// Damaging storm exposure at `(lat, lon)`. `None` for the track index
/// means the dataset never loaded.
#[must_use]
pub fn exposure(tracks: Option<&HurricaneTrackIndex>, lat: f64, lon: f64) -> HurricaneSample {
    let Some(tracks) = tracks else {
        return HurricaneSample::NoData;
    };

    let mut per_storm: BTreeMap<usize, StormExposure> = BTreeMap::new();
    let mut damaging: BTreeSet<usize> = BTreeSet::new();

    for hit in tracks.samples_within(lat, lon, EXPOSURE_RADIUS_KM) {
        let wind = effective_wind_mph(hit.sample.wind_kt, hit.distance_km);

        let entry = per_storm
            .entry(hit.storm_index)
            .or_insert_with(|| StormExposure {
                storm_id: hit.storm.id.clone(),
                peak_wind_mph: 0.0,
                closest_approach_km: hit.distance_km,
            });
        entry.peak_wind_mph = entry.peak_wind_mph.max(wind);
        entry.closest_approach_km = entry.closest_approach_km.min(hit.distance_km);

        if wind >= DAMAGING_WIND_MPH {
            damaging.insert(hit.storm_index);
        }
    }

    let storms: Vec<StormExposure> = per_storm
        .into_iter()
        .filter(|(idx, _)| damaging.contains(idx))
        .map(|(_, storm)| storm)
        .collect();

    log::debug!(
        "{} damaging storms within {EXPOSURE_RADIUS_KM} km of ({lat}, {lon})",
        storms.len()
    );

    HurricaneSample::Exposure { storms }
}

#[cfg(test)]
mod tests {
    use climate_risk_datasets::{StormRecord, TrackSample};

    use super::*;

    fn sample(latitude: f64, longitude: f64, wind_kt: f64) -> TrackSample {
        TrackSample {
            latitude,
            longitude,
            wind_kt,
            observed_at: None,
        }
    }

    fn tracks() -> HurricaneTrackIndex {
        HurricaneTrackIndex::new(vec![
            StormRecord {
                id: "DIRECT_HIT".to_string(),
                track: vec![sample(25.7, -80.2, 130.0), sample(25.9, -80.6, 110.0)],
            },
            StormRecord {
                id: "GRAZING_WEAK".to_string(),
                track: vec![sample(26.5, -80.2, 70.0)],
            },
            StormRecord {
                id: "OFFSHORE".to_string(),
                track: vec![sample(28.0, -75.0, 150.0)],
            },
        ])
    }

    #[test]
    fn wind_decays_to_zero_at_radius() {
        assert!((effective_wind_mph(100.0, 0.0) - 115.078).abs() < 1e-9);
        assert!((effective_wind_mph(100.0, 50.0) - 57.539).abs() < 1e-9);
        assert!(effective_wind_mph(100.0, 100.0).abs() < f64::EPSILON);
        assert!(effective_wind_mph(100.0, 150.0).abs() < f64::EPSILON);
    }

    #[test]
    fn only_damaging_storms_are_counted() {
        let idx = tracks();
        let sample = exposure(Some(&idx), 25.76, -80.19);
        assert_eq!(sample.storm_count(), 1);

        let storm = &sample.storms()[0];
        assert_eq!(storm.storm_id, "DIRECT_HIT");
        assert!(storm.closest_approach_km < 10.0);
        assert!(storm.peak_wind_mph > 130.0);
        assert_eq!(sample.max_wind_mph(), Some(storm.peak_wind_mph));
    }

    #[test]
    fn far_from_tracks_is_empty_exposure() {
        let idx = tracks();
        let sample = exposure(Some(&idx), -40.0, -130.0);
        assert_eq!(sample, HurricaneSample::Exposure { storms: Vec::new() });
        assert_eq!(sample.max_wind_mph(), None);
    }

    #[test]
    fn missing_dataset_is_no_data() {
        assert_eq!(exposure(None, 25.76, -80.19), HurricaneSample::NoData);
    }
}
