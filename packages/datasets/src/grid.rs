//! Gridded climate-extremes indices (HadEX3 layout).
//!
//! The grid is a regular latitude/longitude lattice. Every populated cell
//! carries one [`AnnualSeries`] per loaded [`ClimateIndex`], with one slot
//! per year from [`FIRST_YEAR`] to [`LAST_YEAR`]. Years that are absent in
//! the source are stored as `NaN`, so validity is always measured against
//! the full record length.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::DatasetError;
use crate::geodesy::normalize_longitude;

/// First year of the climate-extremes record.
pub const FIRST_YEAR: i32 = 1901;

/// Last year of the climate-extremes record.
pub const LAST_YEAR: i32 = 2018;

/// Number of annual slots in every series.
#[allow(clippy::cast_sign_loss)]
pub const RECORD_YEARS: usize = (LAST_YEAR - FIRST_YEAR + 1) as usize;

/// Missing-data flag used by the HadEX3 files.
pub const MISSING_VALUE_FLAG: f64 = -99.9;

/// A gridded climate-extremes index.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ClimateIndex {
    /// Annual maximum of daily maximum temperature (°C).
    Txx,
    /// Maximum number of consecutive dry days (days).
    Cdd,
    /// Annual maximum 5-day precipitation total (mm).
    Rx5day,
}

impl ClimateIndex {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Txx, Self::Cdd, Self::Rx5day]
    }

    /// Inclusive range of physically plausible values. Anything outside,
    /// including the `-99.9` missing flag and fill values, is missing.
    #[must_use]
    pub const fn physical_range(self) -> (f64, f64) {
        match self {
            Self::Txx => (-90.0, 60.0),
            Self::Cdd => (0.0, 400.0),
            Self::Rx5day => (0.0, 1000.0),
        }
    }

    /// Whether `value` is a real observation for this index.
    #[must_use]
    pub fn accepts(self, value: f64) -> bool {
        let (min, max) = self.physical_range();
        value.is_finite() && value >= min && value <= max
    }

    /// File stem of this index's grid file (e.g. `hadex3_txx`).
    #[must_use]
    pub fn file_stem(self) -> String {
        format!("hadex3_{self}")
    }
}

/// An ordered run of annual observations for one index in one cell.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnualSeries {
    index: ClimateIndex,
    values: Vec<f64>,
}

impl AnnualSeries {
    /// Creates a series with every year missing.
    #[must_use]
    pub fn missing(index: ClimateIndex) -> Self {
        Self {
            index,
            values: vec![f64::NAN; RECORD_YEARS],
        }
    }

    /// Creates a series from raw values ordered by year starting at
    /// [`FIRST_YEAR`]. Extra values are dropped; short input leaves the
    /// remaining years missing.
    #[must_use]
    pub fn from_values(index: ClimateIndex, raw: &[f64]) -> Self {
        let mut series = Self::missing(index);
        for (slot, value) in series.values.iter_mut().zip(raw) {
            *slot = *value;
        }
        series
    }

    /// Stores the raw value for `year`. Returns `false` if the year is
    /// outside the record.
    pub fn set(&mut self, year: i32, value: f64) -> bool {
        let Some(slot) = year
            .checked_sub(FIRST_YEAR)
            .and_then(|offset| usize::try_from(offset).ok())
            .and_then(|offset| self.values.get_mut(offset))
        else {
            return false;
        };
        *slot = value;
        true
    }

    /// The index this series belongs to.
    #[must_use]
    pub const fn index(&self) -> ClimateIndex {
        self.index
    }

    /// Total number of annual slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the series has no slots at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw value for `year`, which may be a sentinel.
    #[must_use]
    pub fn raw(&self, year: i32) -> Option<f64> {
        let offset = usize::try_from(year.checked_sub(FIRST_YEAR)?).ok()?;
        self.values.get(offset).copied()
    }

    /// Valid observations, oldest first.
    pub fn valid_values(&self) -> impl Iterator<Item = f64> + '_ {
        let index = self.index;
        self.values.iter().copied().filter(move |v| index.accepts(*v))
    }

    /// Valid observations among the most recent `years` slots.
    pub fn recent_valid_values(&self, years: usize) -> impl Iterator<Item = f64> + '_ {
        let index = self.index;
        let start = self.values.len().saturating_sub(years);
        self.values[start..]
            .iter()
            .copied()
            .filter(move |v| index.accepts(*v))
    }

    /// Number of valid observations.
    #[must_use]
    pub fn valid_count(&self) -> usize {
        self.valid_values().count()
    }

    /// Fraction of slots holding a valid observation, in `[0, 1]`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn validity(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.valid_count() as f64 / self.values.len() as f64
    }
}

/// Row/column address of a grid cell. Row 0 is the southernmost band,
/// column 0 starts at the western origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellKey {
    /// Latitude band.
    pub row: usize,
    /// Longitude band.
    pub col: usize,
}

/// Geometry of a regular latitude/longitude grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    /// Southern edge of row 0.
    pub lat_origin: f64,
    /// Western edge of column 0.
    pub lon_origin: f64,
    /// Height of a latitude band in degrees.
    pub lat_step: f64,
    /// Width of a longitude band in degrees.
    pub lon_step: f64,
    /// Number of latitude bands.
    pub rows: usize,
    /// Number of longitude bands (the grid wraps around in longitude).
    pub cols: usize,
}

impl Default for GridSpec {
    /// The HadEX3 grid: 1.25° latitude by 1.875° longitude.
    fn default() -> Self {
        Self {
            lat_origin: -90.0,
            lon_origin: -180.0,
            lat_step: 1.25,
            lon_step: 1.875,
            rows: 144,
            cols: 192,
        }
    }
}

impl GridSpec {
    /// Cell enclosing `(lat, lon)`. Latitudes are clamped to the grid,
    /// longitudes wrap.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss,
        clippy::cast_possible_wrap
    )]
    pub fn cell_of(&self, lat: f64, lon: f64) -> CellKey {
        let row = ((lat - self.lat_origin) / self.lat_step).floor();
        let row = row.clamp(0.0, (self.rows.saturating_sub(1)) as f64) as usize;

        let col = ((lon - self.lon_origin) / self.lon_step).floor() as i64;
        let col = col.rem_euclid(self.cols.max(1) as i64) as usize;

        CellKey { row, col }
    }

    /// Center `(lat, lon)` of a cell, longitude in `[-180, 180)`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn center(&self, key: CellKey) -> (f64, f64) {
        let lat = (key.row as f64 + 0.5).mul_add(self.lat_step, self.lat_origin);
        let lon = (key.col as f64 + 0.5).mul_add(self.lon_step, self.lon_origin);
        (lat, normalize_longitude(lon))
    }

    /// The up-to-eight cells adjacent to `key` (cardinal and diagonal).
    /// Rows past either pole do not exist; columns wrap.
    #[must_use]
    pub fn neighbors(&self, key: CellKey) -> Vec<CellKey> {
        let mut out = Vec::with_capacity(8);
        for d_row in [-1_isize, 0, 1] {
            for d_col in [-1_i64, 0, 1] {
                if d_row == 0 && d_col == 0 {
                    continue;
                }
                let Some(row) = key.row.checked_add_signed(d_row) else {
                    continue;
                };
                if row >= self.rows {
                    continue;
                }
                let col = wrap_col(key.col, d_col, self.cols);
                let neighbor = CellKey { row, col };
                if neighbor != key && !out.contains(&neighbor) {
                    out.push(neighbor);
                }
            }
        }
        out
    }
}

#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
fn wrap_col(col: usize, delta: i64, cols: usize) -> usize {
    let cols = cols.max(1) as i64;
    (col as i64 + delta).rem_euclid(cols) as usize
}

/// All series recorded for one grid cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridCell {
    series: BTreeMap<ClimateIndex, AnnualSeries>,
}

impl GridCell {
    /// Series for `index`, if this cell has one.
    #[must_use]
    pub fn series(&self, index: ClimateIndex) -> Option<&AnnualSeries> {
        self.series.get(&index)
    }
}

/// Immutable index over the climate-extremes grid.
#[derive(Debug, Clone, Default)]
pub struct ClimateGridIndex {
    spec: GridSpec,
    cells: BTreeMap<CellKey, GridCell>,
    layers: BTreeSet<ClimateIndex>,
}

impl ClimateGridIndex {
    /// Grid geometry.
    #[must_use]
    pub const fn spec(&self) -> &GridSpec {
        &self.spec
    }

    /// Whether the layer for `index` was loaded.
    #[must_use]
    pub fn has_layer(&self, index: ClimateIndex) -> bool {
        self.layers.contains(&index)
    }

    /// Loaded layers, in enum order.
    #[must_use]
    pub fn layers(&self) -> Vec<ClimateIndex> {
        self.layers.iter().copied().collect()
    }

    /// Number of populated cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Cell at `key`, if populated.
    #[must_use]
    pub fn cell(&self, key: CellKey) -> Option<&GridCell> {
        self.cells.get(&key)
    }

    /// Series for `index` at `key`, if populated.
    #[must_use]
    pub fn series(&self, index: ClimateIndex, key: CellKey) -> Option<&AnnualSeries> {
        self.cells.get(&key).and_then(|cell| cell.series(index))
    }

    /// Series for `index` in the cell enclosing `(lat, lon)`.
    #[must_use]
    pub fn series_at(&self, index: ClimateIndex, lat: f64, lon: f64) -> Option<&AnnualSeries> {
        self.series(index, self.spec.cell_of(lat, lon))
    }
}

/// Accumulates grid observations before freezing them into a
/// [`ClimateGridIndex`].
#[derive(Debug, Clone, Default)]
pub struct ClimateGridBuilder {
    index: ClimateGridIndex,
    out_of_record: u64,
}

impl ClimateGridBuilder {
    /// Starts an empty grid with the given geometry.
    #[must_use]
    pub fn new(spec: GridSpec) -> Self {
        Self {
            index: ClimateGridIndex {
                spec,
                ..ClimateGridIndex::default()
            },
            out_of_record: 0,
        }
    }

    /// Records one raw observation for the cell enclosing `(lat, lon)` and
    /// marks the layer as loaded.
    pub fn insert(&mut self, index: ClimateIndex, lat: f64, lon: f64, year: i32, value: f64) {
        let key = self.index.spec.cell_of(lat, lon);
        self.index.layers.insert(index);
        let stored = self
            .index
            .cells
            .entry(key)
            .or_default()
            .series
            .entry(index)
            .or_insert_with(|| AnnualSeries::missing(index))
            .set(year, value);
        if !stored {
            self.out_of_record += 1;
        }
    }

    /// Replaces the whole series for the cell enclosing `(lat, lon)`.
    pub fn insert_series(&mut self, lat: f64, lon: f64, series: AnnualSeries) {
        let key = self.index.spec.cell_of(lat, lon);
        self.index.layers.insert(series.index());
        self.index
            .cells
            .entry(key)
            .or_default()
            .series
            .insert(series.index(), series);
    }

    /// Marks a layer as loaded even if it contributed no cells.
    pub fn mark_loaded(&mut self, index: ClimateIndex) {
        self.index.layers.insert(index);
    }

    /// Loads one index layer from a CSV (optionally gzipped) file with
    /// columns `latitude,longitude,year,value`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or a row cannot be
    /// parsed.
    pub fn load_layer(&mut self, index: ClimateIndex, path: &Path) -> Result<u64, DatasetError> {
        let mut reader = csv::Reader::from_reader(crate::open_source(path)?);
        let mut rows = 0_u64;

        for record in reader.deserialize::<GridRecord>() {
            let record = record.map_err(|source| DatasetError::Csv {
                path: path.display().to_string(),
                source,
            })?;
            self.insert(
                index,
                record.latitude,
                record.longitude,
                record.year,
                record.value,
            );
            rows += 1;
        }

        self.mark_loaded(index);
        log::info!(
            "Loaded {rows} {index} observations from {}",
            path.display()
        );
        Ok(rows)
    }

    /// Freezes the builder.
    #[must_use]
    pub fn build(self) -> ClimateGridIndex {
        if self.out_of_record > 0 {
            log::warn!(
                "Ignored {} grid observations outside {FIRST_YEAR}-{LAST_YEAR}",
                self.out_of_record
            );
        }
        self.index
    }
}

/// One row of a grid layer file.
#[derive(Debug, Deserialize)]
struct GridRecord {
    latitude: f64,
    longitude: f64,
    year: i32,
    value: f64,
}
