//! Fallback chain for the gridded climate-extremes indices.
//!
//! A query walks [`ResolutionTier::all`] in order and stops at the first
//! tier that produces a value. When none does, the terminal sample is
//! [`ResolvedSample::NoData`], or [`ResolvedSample::InsufficientData`] if the
//! index's grid layer never loaded.

use climate_risk_datasets::geodesy::distance_km;
use climate_risk_datasets::{AnnualSeries, ClimateGridIndex, ClimateIndex};
use climate_risk_hazard_models::Confidence;
use strum_macros::{AsRefStr, Display};

use crate::regions::RegionTable;

/// Minimum fraction of valid years for a cell to be usable.
pub const MIN_VALIDITY: f64 = 0.5;

/// Length of the preferred recent window, in years.
pub const RECENT_WINDOW_YEARS: usize = 30;

/// Minimum number of usable neighbors for interpolation.
pub const MIN_QUALIFYING_NEIGHBORS: usize = 3;

/// Which part of a cell's record a value was averaged over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum SampleWindow {
    /// The most recent [`RECENT_WINDOW_YEARS`] years, all valid.
    Recent,
    /// Every valid year of the record.
    FullRecord,
}

/// A cell's representative value for one index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellValue {
    /// Mean of the valid observations in the chosen window.
    pub value: f64,
    /// Number of observations averaged.
    pub observations: usize,
    /// The window averaged over.
    pub window: SampleWindow,
}

/// Representative value of a series, or `None` if fewer than
/// [`MIN_VALIDITY`] of its years are valid.
///
/// The recent window is used only when every one of its years is valid.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn representative_value(series: &AnnualSeries) -> Option<CellValue> {
    if series.is_empty() || series.validity() < MIN_VALIDITY {
        return None;
    }

    let recent: Vec<f64> = series.recent_valid_values(RECENT_WINDOW_YEARS).collect();
    let (values, window) = if recent.len() >= RECENT_WINDOW_YEARS {
        (recent, SampleWindow::Recent)
    } else {
        (series.valid_values().collect(), SampleWindow::FullRecord)
    };

    if values.is_empty() {
        return None;
    }

    let observations = values.len();
    let value = values.iter().sum::<f64>() / observations as f64;
    Some(CellValue {
        value,
        observations,
        window,
    })
}

/// Result of resolving one climate index at one coordinate.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedSample {
    /// The enclosing cell had enough valid years.
    ExactCell(CellValue),
    /// Inverse-distance weighted mean of qualifying neighbor cells.
    Interpolated {
        /// Weighted mean value.
        value: f64,
        /// Number of neighbors that contributed.
        neighbors: usize,
    },
    /// Static default of the enclosing climate zone.
    RegionalBaseline {
        /// Default value.
        value: f64,
        /// Region name.
        region: String,
    },
    /// No tier produced a value.
    NoData,
    /// The index's grid layer is not loaded and no region matched.
    InsufficientData,
}

impl ResolvedSample {
    /// Numeric basis for a loss estimate, if any.
    #[must_use]
    pub const fn value(&self) -> Option<f64> {
        match self {
            Self::ExactCell(cell) => Some(cell.value),
            Self::Interpolated { value, .. } | Self::RegionalBaseline { value, .. } => {
                Some(*value)
            }
            Self::NoData | Self::InsufficientData => None,
        }
    }

    /// Confidence tier of this sample.
    #[must_use]
    pub const fn confidence(&self) -> Confidence {
        match self {
            Self::ExactCell(_) | Self::Interpolated { .. } => Confidence::Medium,
            Self::RegionalBaseline { .. } => Confidence::RegionalBaseline,
            Self::NoData => Confidence::NoData,
            Self::InsufficientData => Confidence::InsufficientData,
        }
    }

    /// Short description of where the value came from.
    #[must_use]
    pub fn source(&self) -> String {
        match self {
            Self::ExactCell(cell) => match cell.window {
                SampleWindow::Recent => {
                    format!("grid cell, most recent {} years", cell.observations)
                }
                SampleWindow::FullRecord => {
                    format!("grid cell, {} valid years", cell.observations)
                }
            },
            Self::Interpolated { neighbors, .. } => {
                format!("interpolated from {neighbors} neighboring cells")
            }
            Self::RegionalBaseline { region, .. } => format!("regional baseline: {region}"),
            Self::NoData => "no grid coverage".to_string(),
            Self::InsufficientData => "dataset unavailable".to_string(),
        }
    }
}

/// One step of the fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ResolutionTier {
    /// The enclosing grid cell.
    ExactCell,
    /// The eight surrounding grid cells.
    Interpolation,
    /// The static climate-zone table.
    RegionalBaseline,
}

impl ResolutionTier {
    /// Tiers in the order they are tried.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::ExactCell, Self::Interpolation, Self::RegionalBaseline]
    }

    /// Attempts this tier, returning `None` if it cannot produce a value.
    #[must_use]
    pub fn attempt(
        self,
        grid: &ClimateGridIndex,
        regions: &RegionTable,
        index: ClimateIndex,
        lat: f64,
        lon: f64,
    ) -> Option<ResolvedSample> {
        match self {
            Self::ExactCell => exact_cell(grid, index, lat, lon),
            Self::Interpolation => interpolate(grid, index, lat, lon),
            Self::RegionalBaseline => regions.lookup(lat, lon).map(|region| {
                ResolvedSample::RegionalBaseline {
                    value: region.value(index),
                    region: region.name.clone(),
                }
            }),
        }
    }
}

/// Resolves `index` at `(lat, lon)` through the full fallback chain.
#[must_use]
pub fn resolve(
    grid: &ClimateGridIndex,
    regions: &RegionTable,
    index: ClimateIndex,
    lat: f64,
    lon: f64,
) -> ResolvedSample {
    for tier in ResolutionTier::all() {
        if let Some(sample) = tier.attempt(grid, regions, index, lat, lon) {
            log::debug!("Resolved {index} at ({lat}, {lon}) via {tier}");
            return sample;
        }
    }

    if grid.has_layer(index) {
        ResolvedSample::NoData
    } else {
        ResolvedSample::InsufficientData
    }
}

fn exact_cell(
    grid: &ClimateGridIndex,
    index: ClimateIndex,
    lat: f64,
    lon: f64,
) -> Option<ResolvedSample> {
    grid.series_at(index, lat, lon)
        .and_then(representative_value)
        .map(ResolvedSample::ExactCell)
}

fn interpolate(
    grid: &ClimateGridIndex,
    index: ClimateIndex,
    lat: f64,
    lon: f64,
) -> Option<ResolvedSample> {
    let spec = grid.spec();
    let center = spec.cell_of(lat, lon);

    let qualifying: Vec<(f64, f64)> = spec
        .neighbors(center)
        .into_iter()
        .filter_map(|key| {
            let cell = grid.series(index, key).and_then(representative_value)?;
            let (cell_lat, cell_lon) = spec.center(key);
            let weight = 1.0 / (distance_km(lat, lon, cell_lat, cell_lon) + 1.0);
            Some((cell.value, weight))
        })
        .collect();

    if qualifying.len() < MIN_QUALIFYING_NEIGHBORS {
        return None;
    }

    let total_weight: f64 = qualifying.iter().map(|(_, w)| w).sum();
    let weighted: f64 = qualifying.iter().map(|(v, w)| v * w).sum();

    Some(ResolvedSample::Interpolated {
        value: weighted / total_weight,
        neighbors: qualifying.len(),
    })
}
