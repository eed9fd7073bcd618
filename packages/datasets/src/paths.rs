#![allow(clippy::module_name_repetitions)]
//! Canonical file locations for the climate datasets.
//!
//! Everything lives under one data directory, taken from the
//! `CLIMATE_DATA_DIR` environment variable (default `data/climate`):
//!
//! ```text
//! <data dir>/
//!   hadex3/hadex3_{txx,cdd,rx5day}.csv[.gz]
//!   hurricane/ibtracs.csv[.gz]
//!   flood/flood_lookup.json
//!   country_lookup.json
//! ```

use std::path::{Path, PathBuf};

use crate::grid::ClimateIndex;

/// Environment variable naming the data directory.
pub const DATA_DIR_ENV: &str = "CLIMATE_DATA_DIR";

/// Data directory used when [`DATA_DIR_ENV`] is unset.
pub const DEFAULT_DATA_DIR: &str = "data/climate";

/// Resolved dataset locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetPaths {
    data_dir: PathBuf,
}

impl DatasetPaths {
    /// Paths rooted at `data_dir`.
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Paths rooted at `$CLIMATE_DATA_DIR`, or [`DEFAULT_DATA_DIR`].
    #[must_use]
    pub fn from_env() -> Self {
        let dir = std::env::var(DATA_DIR_ENV).unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());
        Self::new(dir)
    }

    /// The data directory.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Directory holding the climate-extremes grid files.
    #[must_use]
    pub fn hadex3_dir(&self) -> PathBuf {
        self.data_dir.join("hadex3")
    }

    /// Grid file for `index`, preferring the gzipped variant. Returns
    /// `None` if neither exists.
    #[must_use]
    pub fn grid_file(&self, index: ClimateIndex) -> Option<PathBuf> {
        first_existing(&self.hadex3_dir(), &index.file_stem(), &["csv.gz", "csv"])
    }

    /// Hurricane track file, preferring the gzipped variant.
    #[must_use]
    pub fn hurricane_file(&self) -> Option<PathBuf> {
        first_existing(&self.data_dir.join("hurricane"), "ibtracs", &["csv.gz", "csv"])
    }

    /// Flood lookup file, if present.
    #[must_use]
    pub fn flood_file(&self) -> Option<PathBuf> {
        first_existing(&self.data_dir.join("flood"), "flood_lookup", &["json"])
    }

    /// Default location of the country lookup table.
    #[must_use]
    pub fn country_lookup_file(&self) -> PathBuf {
        self.data_dir.join("country_lookup.json")
    }
}

impl Default for DatasetPaths {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_DIR)
    }
}

fn first_existing(dir: &Path, stem: &str, extensions: &[&str]) -> Option<PathBuf> {
    extensions
        .iter()
        .map(|ext| dir.join(format!("{stem}.{ext}")))
        .find(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_files_resolve_to_none() {
        let paths = DatasetPaths::new("/nonexistent/climate");
        assert!(paths.grid_file(ClimateIndex::Txx).is_none());
        assert!(paths.hurricane_file().is_none());
        assert!(paths.flood_file().is_none());
        assert_eq!(
            paths.country_lookup_file(),
            PathBuf::from("/nonexistent/climate/country_lookup.json")
        );
    }
}
