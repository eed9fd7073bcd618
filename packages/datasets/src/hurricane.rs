//! Historical tropical-cyclone tracks (IBTrACS layout).
//!
//! Every track sample is stored in an R-tree keyed by position so that the
//! samples near a query coordinate can be found without scanning the whole
//! record.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{Datelike as _, NaiveDateTime};
use rstar::{AABB, RTree, RTreeObject};
use serde::Deserialize;

use crate::DatasetError;
use crate::geodesy::{distance_km, normalize_longitude, search_envelopes};

/// First storm season in the track record.
pub const FIRST_SEASON: i32 = 1974;

/// Last storm season in the track record.
pub const LAST_SEASON: i32 = 2024;

/// Number of years the track record is treated as covering when turning
/// storm counts into annual frequencies.
pub const TRACK_RECORD_YEARS: u32 = 50;

const ISO_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One position/intensity fix along a storm track.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackSample {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees, in `[-180, 180)`.
    pub longitude: f64,
    /// Maximum sustained wind in knots.
    pub wind_kt: f64,
    /// Observation time, when the source provided a parseable one.
    pub observed_at: Option<NaiveDateTime>,
}

/// A single historical storm and its ordered track.
#[derive(Debug, Clone, PartialEq)]
pub struct StormRecord {
    /// Source storm identifier (IBTrACS `SID`).
    pub id: String,
    /// Track fixes in observation order.
    pub track: Vec<TrackSample>,
}

/// A track sample found near a query coordinate.
#[derive(Debug, Clone, Copy)]
pub struct TrackHit<'a> {
    /// The storm the sample belongs to.
    pub storm: &'a StormRecord,
    /// Position of the storm within the index (stable across queries).
    pub storm_index: usize,
    /// The matching sample.
    pub sample: &'a TrackSample,
    /// Position of the sample along its track.
    pub sample_index: usize,
    /// Great-circle distance from the query coordinate.
    pub distance_km: f64,
}

/// A sample position stored in the R-tree.
struct IndexedSample {
    storm: usize,
    sample: usize,
    position: [f64; 2],
}

impl RTreeObject for IndexedSample {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

/// Immutable index over historical storm tracks.
pub struct HurricaneTrackIndex {
    storms: Vec<StormRecord>,
    tree: RTree<IndexedSample>,
}

impl std::fmt::Debug for HurricaneTrackIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HurricaneTrackIndex")
            .field("storms", &self.storms.len())
            .field("samples", &self.tree.size())
            .finish()
    }
}

impl HurricaneTrackIndex {
    /// Builds the index from storm records.
    #[must_use]
    pub fn new(mut storms: Vec<StormRecord>) -> Self {
        for storm in &mut storms {
            for sample in &mut storm.track {
                sample.longitude = normalize_longitude(sample.longitude);
            }
        }

        let entries = storms
            .iter()
            .enumerate()
            .flat_map(|(storm_idx, storm)| {
                storm
                    .track
                    .iter()
                    .enumerate()
                    .map(move |(sample_idx, s)| IndexedSample {
                        storm: storm_idx,
                        sample: sample_idx,
                        position: [s.longitude, s.latitude],
                    })
            })
            .collect();

        Self {
            storms,
            tree: RTree::bulk_load(entries),
        }
    }

    /// Loads an IBTrACS-style CSV (optionally gzipped).
    ///
    /// Only the `SID`, `ISO_TIME`, `LAT`, `LON` and `USA_WIND` columns are
    /// read. Rows whose position or wind is not numeric (including the
    /// units row that follows the header) are dropped, as are rows dated
    /// outside [`FIRST_SEASON`]..=[`LAST_SEASON`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or is not valid CSV.
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(crate::open_source(path)?);

        let mut order: BTreeMap<String, usize> = BTreeMap::new();
        let mut storms: Vec<StormRecord> = Vec::new();
        let mut dropped = 0_u64;

        for row in reader.deserialize::<TrackRow>() {
            let row = row.map_err(|source| DatasetError::Csv {
                path: path.display().to_string(),
                source,
            })?;

            let Some((sid, sample)) = row.into_sample() else {
                dropped += 1;
                continue;
            };

            if sample
                .observed_at
                .is_some_and(|t| !(FIRST_SEASON..=LAST_SEASON).contains(&t.year()))
            {
                dropped += 1;
                continue;
            }

            let idx = *order.entry(sid.clone()).or_insert_with(|| {
                storms.push(StormRecord {
                    id: sid,
                    track: Vec::new(),
                });
                storms.len() - 1
            });
            storms[idx].track.push(sample);
        }

        if dropped > 0 {
            log::debug!("Dropped {dropped} unusable track rows from {}", path.display());
        }

        let index = Self::new(storms);
        log::info!(
            "Loaded {} storms ({} track samples) from {}",
            index.storm_count(),
            index.sample_count(),
            path.display()
        );
        Ok(index)
    }

    /// Number of storms.
    #[must_use]
    pub fn storm_count(&self) -> usize {
        self.storms.len()
    }

    /// Number of track samples.
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.tree.size()
    }

    /// All storms, in index order.
    #[must_use]
    pub fn storms(&self) -> &[StormRecord] {
        &self.storms
    }

    /// Track samples within `radius_km` of `(lat, lon)`, ordered by storm
    /// then by position along the track.
    #[must_use]
    pub fn samples_within(&self, lat: f64, lon: f64, radius_km: f64) -> Vec<TrackHit<'_>> {
        let mut hits: Vec<TrackHit<'_>> = Vec::new();

        for envelope in search_envelopes(lat, lon, radius_km) {
            for entry in self.tree.locate_in_envelope(&envelope) {
                let storm = &self.storms[entry.storm];
                let sample = &storm.track[entry.sample];
                let distance = distance_km(lat, lon, sample.latitude, sample.longitude);
                if distance <= radius_km {
                    hits.push(TrackHit {
                        storm,
                        storm_index: entry.storm,
                        sample,
                        sample_index: entry.sample,
                        distance_km: distance,
                    });
                }
            }
        }

        // Overlapping antimeridian envelopes can yield the same sample twice.
        hits.sort_by_key(|hit| (hit.storm_index, hit.sample_index));
        hits.dedup_by_key(|hit| (hit.storm_index, hit.sample_index));
        hits
    }
}

/// Raw IBTrACS row. Columns are read as text because the file carries a
/// units row and blank intensities.
#[derive(Debug, Deserialize)]
struct TrackRow {
    #[serde(rename = "SID")]
    sid: String,
    #[serde(rename = "ISO_TIME", default)]
    iso_time: String,
    #[serde(rename = "LAT")]
    lat: String,
    #[serde(rename = "LON")]
    lon: String,
    #[serde(rename = "USA_WIND", default)]
    usa_wind: String,
}

impl TrackRow {
    fn into_sample(self) -> Option<(String, TrackSample)> {
        let sid = self.sid.trim();
        if sid.is_empty() {
            return None;
        }
        let latitude: f64 = self.lat.trim().parse().ok()?;
        let longitude: f64 = self.lon.trim().parse().ok()?;
        let wind_kt: f64 = self.usa_wind.trim().parse().ok()?;

        if !latitude.is_finite() || !longitude.is_finite() || !wind_kt.is_finite() {
            return None;
        }
        if !(-90.0..=90.0).contains(&latitude) || wind_kt < 0.0 {
            return None;
        }

        let observed_at = NaiveDateTime::parse_from_str(self.iso_time.trim(), ISO_TIME_FORMAT).ok();

        Some((
            sid.to_string(),
            TrackSample {
                latitude,
                longitude,
                wind_kt,
                observed_at,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Datelike as _;

    use super::*;

    fn sample(latitude: f64, longitude: f64, wind_kt: f64) -> TrackSample {
        TrackSample {
            latitude,
            longitude,
            wind_kt,
            observed_at: None,
        }
    }

    fn index() -> HurricaneTrackIndex {
        HurricaneTrackIndex::new(vec![
            StormRecord {
                id: "ANDREW".to_string(),
                track: vec![
                    sample(25.0, -78.0, 130.0),
                    sample(25.5, -80.3, 125.0),
                    sample(25.9, -82.0, 100.0),
                ],
            },
            StormRecord {
                id: "FAR_AWAY".to_string(),
                track: vec![sample(15.0, -60.0, 90.0)],
            },
        ])
    }

    #[test]
    fn finds_only_nearby_samples() {
        let idx = index();
        let hits = idx.samples_within(25.76, -80.19, 100.0);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].storm.id, "ANDREW");
        assert!(hits[0].distance_km < 35.0);
    }

    #[test]
    fn wider_radius_returns_track_in_order() {
        let idx = index();
        let hits = idx.samples_within(25.76, -80.19, 300.0);
        let winds: Vec<f64> = hits.iter().map(|h| h.sample.wind_kt).collect();
        assert_eq!(winds, vec![130.0, 125.0, 100.0]);
    }

    #[test]
    fn empty_index_returns_nothing() {
        let idx = HurricaneTrackIndex::new(Vec::new());
        assert!(idx.samples_within(0.0, 0.0, 500.0).is_empty());
        assert_eq!(idx.storm_count(), 0);
    }

    #[test]
    fn track_rows_reject_units_and_blank_wind() {
        let units = TrackRow {
            sid: " ".to_string(),
            iso_time: String::new(),
            lat: "degrees_north".to_string(),
            lon: "degrees_east".to_string(),
            usa_wind: "kts".to_string(),
        };
        assert!(units.into_sample().is_none());

        let blank = TrackRow {
            sid: "1992230N11325".to_string(),
            iso_time: "1992-08-24 09:00:00".to_string(),
            lat: "25.5".to_string(),
            lon: "-80.3".to_string(),
            usa_wind: " ".to_string(),
        };
        assert!(blank.into_sample().is_none());
    }

    #[test]
    fn track_rows_parse_times() {
        let row = TrackRow {
            sid: "1992230N11325".to_string(),
            iso_time: "1992-08-24 09:00:00".to_string(),
            lat: "25.5".to_string(),
            lon: "-80.3".to_string(),
            usa_wind: "150".to_string(),
        };
        let (sid, sample) = row.into_sample().unwrap();
        assert_eq!(sid, "1992230N11325");
        assert_eq!(sample.observed_at.map(|t| t.year()), Some(1992));
        assert!((sample.wind_kt - 150.0).abs() < f64::EPSILON);
    }
}
