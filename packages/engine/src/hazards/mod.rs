//! Per-hazard loss models.
//!
//! Every model turns one resolved sample into a [`HazardAssessment`] for a
//! given asset value and building type. Models are plain functions
//! selected by [`HazardKind`]; they never fail and never touch the
//! datasets directly.

pub mod drought;
pub mod flood;
pub mod heat;
pub mod hurricane;
pub mod precipitation;

use climate_risk_datasets::ClimateIndex;
use climate_risk_hazard_models::{BuildingType, HazardAssessment, HazardKind};
use climate_risk_resolver::{ResolvedSample, SpatialResolver};

/// `amount` as a percentage of `asset_value`.
#[must_use]
pub fn percentage(amount: f64, asset_value: f64) -> f64 {
    amount / asset_value * 100.0
}

/// The gridded index driving `kind`, if it is a chronic hazard.
#[must_use]
pub const fn climate_index(kind: HazardKind) -> Option<ClimateIndex> {
    match kind {
        HazardKind::HeatStress => Some(ClimateIndex::Txx),
        HazardKind::Drought => Some(ClimateIndex::Cdd),
        HazardKind::ExtremePrecipitation => Some(ClimateIndex::Rx5day),
        HazardKind::Hurricane | HazardKind::Flood => None,
    }
}

/// Resolves the sample for `kind` at `(lat, lon)` and runs its model.
#[must_use]
pub fn assess(
    kind: HazardKind,
    resolver: &SpatialResolver<'_>,
    lat: f64,
    lon: f64,
    asset_value: f64,
    building_type: BuildingType,
) -> HazardAssessment {
    match climate_index(kind) {
        Some(index) => {
            let sample = resolver.climate(index, lat, lon);
            match index {
                ClimateIndex::Txx => heat::assess(&sample, asset_value, building_type),
                ClimateIndex::Cdd => drought::assess(&sample, asset_value, building_type),
                ClimateIndex::Rx5day => {
                    precipitation::assess(&sample, asset_value, building_type)
                }
            }
        }
        None if kind == HazardKind::Hurricane => {
            hurricane::assess(&resolver.hurricane(lat, lon), asset_value, building_type)
        }
        None => flood::assess(&resolver.flood(lat, lon), asset_value, building_type),
    }
}

/// Parameters of a chronic (gridded-index) hazard model.
pub(crate) struct ChronicModel {
    pub damage_ratio: fn(f64) -> f64,
    pub calibration: f64,
    pub describe: fn(f64) -> String,
}

impl ChronicModel {
    /// Loss for a resolved sample. Samples whose tier forces a zero loss,
    /// or that carry no value, give zero loss with the sample's own tier.
    pub(crate) fn assess(
        &self,
        sample: &ResolvedSample,
        asset_value: f64,
        building_type: BuildingType,
    ) -> HazardAssessment {
        let confidence = sample.confidence();
        let Some(value) = sample.value().filter(|_| !confidence.forces_zero_loss()) else {
            return HazardAssessment::zero(
                confidence,
                Some(format!("No usable observations ({})", sample.source())),
            );
        };

        let ratio = (self.damage_ratio)(value).max(0.0);
        let annual_loss = ratio * self.calibration * building_type.vulnerability() * asset_value;

        HazardAssessment {
            annual_loss,
            annual_loss_pct: percentage(annual_loss, asset_value),
            confidence,
            details: Some(format!("{} ({})", (self.describe)(value), sample.source())),
        }
    }
}

#[cfg(test)]
mod tests {
    use climate_risk_datasets::DatasetIndexes;
    use climate_risk_hazard_models::Confidence;
    use climate_risk_resolver::RegionTable;

    use super::*;

    #[test]
    fn chronic_hazards_map_to_their_index() {
        assert_eq!(climate_index(HazardKind::Drought), Some(ClimateIndex::Cdd));
        assert_eq!(climate_index(HazardKind::HeatStress), Some(ClimateIndex::Txx));
        assert_eq!(
            climate_index(HazardKind::ExtremePrecipitation),
            Some(ClimateIndex::Rx5day)
        );
        assert_eq!(climate_index(HazardKind::Hurricane), None);
        for kind in HazardKind::all() {
            assert_eq!(climate_index(*kind).is_some(), kind.is_gridded());
        }
    }

    #[test]
    fn empty_datasets_give_zero_loss_everywhere_outside_regions() {
        let datasets = DatasetIndexes::default();
        let regions = RegionTable::embedded().unwrap();
        let resolver = SpatialResolver::new(&datasets, &regions);

        for kind in HazardKind::all() {
            let a = assess(*kind, &resolver, 0.0, -150.0, 1_000_000.0, BuildingType::default());
            assert!(a.annual_loss.abs() < f64::EPSILON, "{kind}: {a:?}");
            assert!(matches!(
                a.confidence,
                Confidence::NoData | Confidence::InsufficientData
            ));
        }
    }

    #[test]
    fn chronic_model_gives_zero_loss_for_terminal_tiers() {
        let model = ChronicModel {
            damage_ratio: |_| 0.5,
            calibration: 1.0,
            describe: |v| format!("value {v}"),
        };

        for sample in [ResolvedSample::NoData, ResolvedSample::InsufficientData] {
            let a = model.assess(&sample, 1_000_000.0, BuildingType::default());
            assert!(a.annual_loss.abs() < f64::EPSILON);
            assert!(a.confidence.forces_zero_loss());
            assert_eq!(a.confidence, sample.confidence());
        }

        let baseline = ResolvedSample::RegionalBaseline {
            value: 40.0,
            region: "Test".to_string(),
        };
        let a = model.assess(&baseline, 1_000_000.0, BuildingType::default());
        assert!((a.annual_loss - 500_000.0).abs() < 1e-6);
        assert_eq!(a.confidence, Confidence::RegionalBaseline);
    }

    #[test]
    fn dispatch_resolves_each_chronic_hazard_through_its_index() {
        let datasets = DatasetIndexes::default();
        let regions = RegionTable::embedded().unwrap();
        let resolver = SpatialResolver::new(&datasets, &regions);
        let (lat, lon) = (48.85, 2.35);

        for kind in HazardKind::all().iter().filter(|k| k.is_gridded()) {
            let index = climate_index(*kind).unwrap();
            let model: fn(&ResolvedSample, f64, BuildingType) -> HazardAssessment = match index {
                ClimateIndex::Txx => heat::assess,
                ClimateIndex::Cdd => drought::assess,
                ClimateIndex::Rx5day => precipitation::assess,
            };
            let expected = model(
                &resolver.climate(index, lat, lon),
                1_000_000.0,
                BuildingType::default(),
            );
            let actual = assess(*kind, &resolver, lat, lon, 1_000_000.0, BuildingType::default());
            assert_eq!(actual, expected, "{kind}");
            assert_eq!(actual.confidence, Confidence::RegionalBaseline);
        }
    }

    #[test]
    fn percentage_is_relative_to_asset() {
        assert!((percentage(15_000.0, 1_000_000.0) - 1.5).abs() < 1e-12);
    }
}
