#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Spatial resolution of a coordinate against the climate datasets.
//!
//! Each hazard asks the resolver for a sample at the query coordinate:
//!
//! - gridded indices go through the ordered fallback chain in [`climate`]
//!   (exact cell, neighbor interpolation, regional baseline, no data),
//! - hurricanes get proximity-weighted track exposure from [`hurricane`],
//! - floods get the nearest recorded depth from [`flood`].
//!
//! Nothing here fails. Missing coverage is reported through the sample
//! variants and their confidence tiers.

pub mod climate;
pub mod flood;
pub mod hurricane;
pub mod regions;

use climate_risk_datasets::{ClimateIndex, DatasetIndexes};

pub use climate::{CellValue, ResolutionTier, ResolvedSample, SampleWindow};
pub use flood::FloodSample;
pub use hurricane::{HurricaneSample, StormExposure};
pub use regions::{RegionTable, RegionTableError, RegionalBaseline};

/// Resolves coordinates against shared, read-only datasets.
#[derive(Debug, Clone, Copy)]
pub struct SpatialResolver<'a> {
    datasets: &'a DatasetIndexes,
    regions: &'a RegionTable,
}

impl<'a> SpatialResolver<'a> {
    /// Creates a resolver over `datasets`, falling back to `regions`.
    #[must_use]
    pub const fn new(datasets: &'a DatasetIndexes, regions: &'a RegionTable) -> Self {
        Self { datasets, regions }
    }

    /// Resolves a gridded climate index.
    #[must_use]
    pub fn climate(&self, index: ClimateIndex, lat: f64, lon: f64) -> ResolvedSample {
        climate::resolve(self.datasets.grid(), self.regions, index, lat, lon)
    }

    /// Damaging hurricane exposure.
    #[must_use]
    pub fn hurricane(&self, lat: f64, lon: f64) -> HurricaneSample {
        hurricane::exposure(self.datasets.hurricanes(), lat, lon)
    }

    /// 100-year flood depth.
    #[must_use]
    pub fn flood(&self, lat: f64, lon: f64) -> FloodSample {
        flood::sample(self.datasets.flood(), lat, lon)
    }
}
