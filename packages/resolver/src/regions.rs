//! Static climate-zone baselines.
//!
//! The table is embedded at compile time from `baselines/regions.toml` and
//! scanned in file order; the first region whose box contains a coordinate
//! wins.

use climate_risk_datasets::ClimateIndex;
use serde::{Deserialize, Serialize};

/// Number of regions in the embedded table. Enforced by a test.
#[cfg(test)]
const EXPECTED_REGION_COUNT: usize = 14;

const REGIONS_TOML: &str = include_str!("../baselines/regions.toml");

/// Errors from parsing or validating a baseline table.
#[derive(Debug, thiserror::Error)]
pub enum RegionTableError {
    /// The TOML document could not be parsed.
    #[error("Failed to parse regional baseline table: {0}")]
    Parse(#[from] toml::de::Error),

    /// A region has an empty box or an implausible default.
    #[error("Invalid regional baseline '{name}': {reason}")]
    Invalid {
        /// Region name.
        name: String,
        /// What is wrong with it.
        reason: String,
    },
}

/// A climate zone with default values for the gridded indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionalBaseline {
    /// Display name.
    pub name: String,
    /// Southern edge, inclusive.
    pub lat_min: f64,
    /// Northern edge, inclusive.
    pub lat_max: f64,
    /// Western edge, inclusive.
    pub lon_min: f64,
    /// Eastern edge, inclusive.
    pub lon_max: f64,
    /// Default consecutive dry days.
    pub cdd: f64,
    /// Default annual maximum temperature.
    pub txx: f64,
    /// Default annual maximum 5-day precipitation.
    pub rx5day: f64,
}

impl RegionalBaseline {
    /// Whether the box contains `(lat, lon)`.
    #[must_use]
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.lat_min..=self.lat_max).contains(&lat) && (self.lon_min..=self.lon_max).contains(&lon)
    }

    /// Default value for `index`.
    #[must_use]
    pub const fn value(&self, index: ClimateIndex) -> f64 {
        match index {
            ClimateIndex::Txx => self.txx,
            ClimateIndex::Cdd => self.cdd,
            ClimateIndex::Rx5day => self.rx5day,
        }
    }

    /// Whether the interiors of two boxes intersect. Shared edges do not
    /// count.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.lat_min < other.lat_max
            && other.lat_min < self.lat_max
            && self.lon_min < other.lon_max
            && other.lon_min < self.lon_max
    }

    fn validate(&self) -> Result<(), RegionTableError> {
        let invalid = |reason: String| RegionTableError::Invalid {
            name: self.name.clone(),
            reason,
        };

        if self.name.trim().is_empty() {
            return Err(invalid("empty name".to_string()));
        }
        if !(-90.0..=90.0).contains(&self.lat_min)
            || !(-90.0..=90.0).contains(&self.lat_max)
            || self.lat_min >= self.lat_max
        {
            return Err(invalid(format!(
                "bad latitude range {}..{}",
                self.lat_min, self.lat_max
            )));
        }
        if !(-180.0..=180.0).contains(&self.lon_min)
            || !(-180.0..=180.0).contains(&self.lon_max)
            || self.lon_min >= self.lon_max
        {
            return Err(invalid(format!(
                "bad longitude range {}..{}",
                self.lon_min, self.lon_max
            )));
        }
        for index in ClimateIndex::all() {
            let value = self.value(*index);
            if !index.accepts(value) {
                return Err(invalid(format!(
                    "{index} default {value} is outside the physical range"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct RegionFile {
    region: Vec<RegionalBaseline>,
}

/// Ordered, first-match-wins table of regional baselines.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionTable {
    regions: Vec<RegionalBaseline>,
}

impl RegionTable {
    /// Parses and validates the embedded table.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded TOML is malformed or any region is
    /// invalid.
    pub fn embedded() -> Result<Self, RegionTableError> {
        Self::from_toml_str(REGIONS_TOML)
    }

    /// Parses and validates a table from TOML with one `[[region]]` entry
    /// per zone. Overlapping boxes are allowed but logged.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or any region is invalid.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, RegionTableError> {
        let file: RegionFile = toml::de::from_str(toml_str)?;
        let table = Self::new(file.region)?;

        for (first, second) in table.overlapping_pairs() {
            log::warn!(
                "Regional baselines '{}' and '{}' overlap; '{}' takes precedence",
                first.name,
                second.name,
                first.name
            );
        }

        log::debug!("Loaded {} regional baselines", table.len());
        Ok(table)
    }

    /// Builds a table from already-parsed regions, in lookup order.
    ///
    /// # Errors
    ///
    /// Returns an error if any region is invalid.
    pub fn new(regions: Vec<RegionalBaseline>) -> Result<Self, RegionTableError> {
        for region in &regions {
            region.validate()?;
        }
        Ok(Self { regions })
    }

    /// First region containing `(lat, lon)`.
    #[must_use]
    pub fn lookup(&self, lat: f64, lon: f64) -> Option<&RegionalBaseline> {
        self.regions.iter().find(|region| region.contains(lat, lon))
    }

    /// Regions in lookup order.
    #[must_use]
    pub fn regions(&self) -> &[RegionalBaseline] {
        &self.regions
    }

    /// Number of regions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether the table has no regions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Every pair of regions whose interiors intersect, earlier entry first.
    #[must_use]
    pub fn overlapping_pairs(&self) -> Vec<(&RegionalBaseline, &RegionalBaseline)> {
        let mut pairs = Vec::new();
        for (i, first) in self.regions.iter().enumerate() {
            for second in &self.regions[i + 1..] {
                if first.overlaps(second) {
                    pairs.push((first, second));
                }
            }
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn loads_embedded_table() {
        let table = RegionTable::embedded().unwrap();
        assert_eq!(
            table.len(),
            EXPECTED_REGION_COUNT,
            "Expected {EXPECTED_REGION_COUNT} regional baselines, found {}",
            table.len()
        );
    }

    #[test]
    fn region_names_are_unique() {
        let table = RegionTable::embedded().unwrap();
        let mut seen = BTreeSet::new();
        for region in table.regions() {
            assert!(
                seen.insert(region.name.as_str()),
                "Duplicate region: {}",
                region.name
            );
        }
    }

    #[test]
    fn embedded_regions_do_not_overlap() {
        let table = RegionTable::embedded().unwrap();
        let pairs: Vec<(&str, &str)> = table
            .overlapping_pairs()
            .into_iter()
            .map(|(a, b)| (a.name.as_str(), b.name.as_str()))
            .collect();
        assert!(pairs.is_empty(), "Overlapping regions: {pairs:?}");
    }

    #[test]
    fn lookup_finds_expected_zones() {
        let table = RegionTable::embedded().unwrap();
        let name = |lat, lon| table.lookup(lat, lon).map(|r| r.name.as_str());

        assert_eq!(name(25.76, -80.19), Some("North America (Temperate)"));
        assert_eq!(name(30.0, 10.0), Some("Sahara & North Africa"));
        assert_eq!(name(48.85, 2.35), Some("Europe"));
        assert_eq!(name(-33.87, 151.21), Some("Australia"));
        assert_eq!(name(-15.8, -47.9), Some("South America"));
        assert_eq!(name(-40.0, -130.0), None);
        assert_eq!(name(30.0, -40.0), None);
    }

    #[test]
    fn shared_edge_belongs_to_earlier_region() {
        let table = RegionTable::embedded().unwrap();
        let region = table.lookup(12.0, 20.0).unwrap();
        assert_eq!(region.name, "Sahara & North Africa");
    }

    #[test]
    fn first_match_wins_when_boxes_overlap() {
        let toml_str = r#"
            [[region]]
            name = "Wide"
            lat_min = -10.0
            lat_max = 10.0
            lon_min = -10.0
            lon_max = 10.0
            cdd = 10.0
            txx = 30.0
            rx5day = 50.0

            [[region]]
            name = "Narrow"
            lat_min = -1.0
            lat_max = 1.0
            lon_min = -1.0
            lon_max = 1.0
            cdd = 200.0
            txx = 45.0
            rx5day = 20.0
        "#;
        let table = RegionTable::from_toml_str(toml_str).unwrap();
        assert_eq!(table.overlapping_pairs().len(), 1);
        let region = table.lookup(0.0, 0.0).unwrap();
        assert_eq!(region.name, "Wide");
        assert!((region.value(ClimateIndex::Cdd) - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_inverted_boxes_and_sentinel_defaults() {
        let inverted = RegionalBaseline {
            name: "Upside down".to_string(),
            lat_min: 10.0,
            lat_max: -10.0,
            lon_min: 0.0,
            lon_max: 1.0,
            cdd: 10.0,
            txx: 30.0,
            rx5day: 50.0,
        };
        assert!(matches!(
            RegionTable::new(vec![inverted]),
            Err(RegionTableError::Invalid { .. })
        ));

        let sentinel = RegionalBaseline {
            name: "Flagged".to_string(),
            lat_min: 0.0,
            lat_max: 1.0,
            lon_min: 0.0,
            lon_max: 1.0,
            cdd: -99.9,
            txx: 30.0,
            rx5day: 50.0,
        };
        assert!(RegionTable::new(vec![sentinel]).is_err());
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(
            RegionTable::from_toml_str("[[region]]\nname = 3"),
            Err(RegionTableError::Parse(_))
        ));
    }
}
