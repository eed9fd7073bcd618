#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! In-memory dataset indexes for climate risk assessment.
//!
//! Loads the three source datasets once at startup and exposes read-only
//! spatial lookups over them:
//!
//! - [`ClimateGridIndex`]: HadEX3-style gridded climate-extremes indices
//!   (annual series 1901-2018 per cell),
//! - [`HurricaneTrackIndex`]: historical storm tracks (1974-2024) in an
//!   R-tree,
//! - [`FloodLookup`]: sparse 100-year flood depths in an R-tree.
//!
//! [`DatasetIndexes`] bundles the three and is shared by reference for the
//! rest of the process lifetime. Nothing here mutates after construction.

pub mod flood;
pub mod geodesy;
pub mod grid;
pub mod hurricane;
pub mod paths;

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use serde::{Deserialize, Serialize};

pub use flood::{FloodLookup, FloodMatch, FloodPoint};
pub use grid::{
    AnnualSeries, CellKey, ClimateGridBuilder, ClimateGridIndex, ClimateIndex, GridCell, GridSpec,
};
pub use hurricane::{HurricaneTrackIndex, StormRecord, TrackHit, TrackSample};
pub use paths::DatasetPaths;

/// Errors from loading the source datasets.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// The configured data directory does not exist.
    #[error("Data directory not found: {0}")]
    DataDirNotFound(String),

    /// A dataset file could not be opened or read.
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// Offending file.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// A CSV dataset could not be parsed.
    #[error("CSV error in {path}: {source}")]
    Csv {
        /// Offending file.
        path: String,
        /// Underlying error.
        source: csv::Error,
    },

    /// A JSON dataset could not be parsed.
    #[error("JSON error in {path}: {source}")]
    Json {
        /// Offending file.
        path: String,
        /// Underlying error.
        source: serde_json::Error,
    },
}

/// Opens a dataset file, transparently decompressing `.gz` files.
///
/// # Errors
///
/// Returns [`DatasetError::Io`] if the file cannot be opened.
pub fn open_source(path: &Path) -> Result<Box<dyn Read>, DatasetError> {
    let file = File::open(path).map_err(|source| DatasetError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let is_gzip = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"));

    if is_gzip {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(BufReader::new(
            file,
        )))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Load status of the datasets, reported by the health endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetStatus {
    /// Climate-extremes layers that loaded.
    pub climate_indices: Vec<ClimateIndex>,
    /// Number of climate-extremes layers that loaded.
    pub hadex3_loaded: usize,
    /// Number of populated grid cells.
    pub grid_cells: usize,
    /// Whether the hurricane track record loaded.
    pub hurricane_data: bool,
    /// Number of storms in the track record.
    pub hurricane_storms: usize,
    /// Whether the flood lookup loaded.
    pub flood_data: bool,
    /// Number of flood lookup points.
    pub flood_lookup_points: usize,
}

impl DatasetStatus {
    /// Whether at least one dataset is usable.
    #[must_use]
    pub const fn any_loaded(&self) -> bool {
        self.hadex3_loaded > 0 || self.hurricane_data || self.flood_data
    }

    /// Whether every dataset is usable.
    #[must_use]
    pub const fn fully_loaded(&self) -> bool {
        self.hadex3_loaded == ClimateIndex::all().len() && self.hurricane_data && self.flood_data
    }
}

/// The three dataset indexes, built once and shared read-only.
#[derive(Debug, Default)]
pub struct DatasetIndexes {
    grid: ClimateGridIndex,
    hurricanes: Option<HurricaneTrackIndex>,
    flood: Option<FloodLookup>,
}

impl DatasetIndexes {
    /// Bundles already-built indexes. `None` marks a dataset that is
    /// unavailable.
    #[must_use]
    pub const fn new(
        grid: ClimateGridIndex,
        hurricanes: Option<HurricaneTrackIndex>,
        flood: Option<FloodLookup>,
    ) -> Self {
        Self {
            grid,
            hurricanes,
            flood,
        }
    }

    /// Loads every dataset found under `paths`.
    ///
    /// Individual missing files are tolerated and logged; they show up as
    /// unloaded in [`DatasetIndexes::status`].
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory does not exist or a dataset
    /// file that is present cannot be read or parsed.
    pub fn load(paths: &DatasetPaths) -> Result<Self, DatasetError> {
        let data_dir = paths.data_dir();
        if !data_dir.is_dir() {
            return Err(DatasetError::DataDirNotFound(data_dir.display().to_string()));
        }

        log::info!("Loading climate datasets from {}", data_dir.display());

        let mut builder = ClimateGridBuilder::new(GridSpec::default());
        for index in ClimateIndex::all() {
            match paths.grid_file(*index) {
                Some(path) => {
                    builder.load_layer(*index, &path)?;
                }
                None => log::warn!(
                    "No {index} grid file in {}; {index} will fall back to regional baselines",
                    paths.hadex3_dir().display()
                ),
            }
        }
        let grid = builder.build();
        log::info!(
            "Climate grid ready: {} layers, {} cells",
            grid.layers().len(),
            grid.cell_count()
        );

        let hurricanes = match paths.hurricane_file() {
            Some(path) => Some(HurricaneTrackIndex::load(&path)?),
            None => {
                log::warn!("No hurricane track file found; hurricane risk will report No Data");
                None
            }
        };

        let flood = match paths.flood_file() {
            Some(path) => Some(FloodLookup::load(&path)?),
            None => {
                log::warn!("No flood lookup file found; flood risk will report No Data");
                None
            }
        };

        Ok(Self::new(grid, hurricanes, flood))
    }

    /// The climate-extremes grid.
    #[must_use]
    pub const fn grid(&self) -> &ClimateGridIndex {
        &self.grid
    }

    /// The storm track record, if it loaded.
    #[must_use]
    pub const fn hurricanes(&self) -> Option<&HurricaneTrackIndex> {
        self.hurricanes.as_ref()
    }

    /// The flood lookup, if it loaded.
    #[must_use]
    pub const fn flood(&self) -> Option<&FloodLookup> {
        self.flood.as_ref()
    }

    /// Load status for health reporting.
    #[must_use]
    pub fn status(&self) -> DatasetStatus {
        let climate_indices = self.grid.layers();
        DatasetStatus {
            hadex3_loaded: climate_indices.len(),
            climate_indices,
            grid_cells: self.grid.cell_count(),
            hurricane_data: self.hurricanes.is_some(),
            hurricane_storms: self
                .hurricanes
                .as_ref()
                .map_or(0, HurricaneTrackIndex::storm_count),
            flood_data: self.flood.is_some(),
            flood_lookup_points: self.flood.as_ref().map_or(0, FloodLookup::len),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_indexes_report_nothing_loaded() {
        let status = DatasetIndexes::default().status();
        assert!(!status.any_loaded());
        assert!(!status.fully_loaded());
        assert_eq!(status.grid_cells, 0);
        assert_eq!(status.flood_lookup_points, 0);
    }

    #[test]
    fn missing_data_dir_is_fatal() {
        let err = DatasetIndexes::load(&DatasetPaths::new("/nonexistent/climate")).unwrap_err();
        assert!(matches!(err, DatasetError::DataDirNotFound(_)));
    }

    #[test]
    fn status_counts_loaded_datasets() {
        let mut builder = ClimateGridBuilder::new(GridSpec::default());
        for index in ClimateIndex::all() {
            builder.insert(*index, 0.0, 0.0, 2000, 10.0);
        }
        let indexes = DatasetIndexes::new(
            builder.build(),
            Some(HurricaneTrackIndex::new(Vec::new())),
            Some(FloodLookup::new(vec![FloodPoint {
                latitude: 1.0,
                longitude: 1.0,
                depth_m: 0.5,
            }])),
        );
        let status = indexes.status();
        assert!(status.fully_loaded());
        assert_eq!(status.hadex3_loaded, 3);
        assert_eq!(status.grid_cells, 1);
        assert_eq!(status.flood_lookup_points, 1);
        assert_eq!(status.hurricane_storms, 0);
    }
}
