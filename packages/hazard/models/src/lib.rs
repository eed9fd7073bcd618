#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Climate hazard taxonomy, confidence tiers and assessment result types.
//!
//! This crate defines the vocabulary shared by the resolver, the hazard
//! models, the HTTP API and the CLI: which hazards are assessed, how much
//! the data behind each estimate can be trusted, which building classes
//! are supported, and the shape of a finished assessment.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// The five climate hazards assessed for every location.
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
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum HazardKind {
    /// Acute wind damage from tropical cyclones.
    Hurricane,
    /// Riverine/coastal inundation at the 100-year return period.
    Flood,
    /// Chronic damage from extreme maximum temperatures.
    HeatStress,
    /// Chronic damage from long runs of consecutive dry days.
    Drought,
    /// Damage from extreme multi-day rainfall totals.
    ExtremePrecipitation,
}

impl HazardKind {
    /// Returns all variants of this enum, in breakdown order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Hurricane,
            Self::Flood,
            Self::HeatStress,
            Self::Drought,
            Self::ExtremePrecipitation,
        ]
    }

    /// Short route name used by the single-hazard endpoint
    /// (`/assess/{hazard}`).
    #[must_use]
    pub const fn route_name(self) -> &'static str {
        match self {
            Self::Hurricane => "hurricane",
            Self::Flood => "flood",
            Self::HeatStress => "heat",
            Self::Drought => "drought",
            Self::ExtremePrecipitation => "precipitation",
        }
    }

    /// Parses a short route name, also accepting the canonical
    /// `snake_case` name.
    #[must_use]
    pub fn from_route_name(name: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.route_name() == name)
            .or_else(|| name.parse().ok())
    }

    /// Whether the hazard is driven by the gridded climate-extremes
    /// indices (and therefore by the interpolation/baseline fallbacks).
    #[must_use]
    pub const fn is_gridded(self) -> bool {
        matches!(
            self,
            Self::HeatStress | Self::Drought | Self::ExtremePrecipitation
        )
    }
}

/// Provenance/reliability tier of the data behind a hazard estimate.
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
pub enum Confidence {
    /// Direct historical-event data (storm tracks, flood depths).
    #[serde(rename = "High")]
    #[strum(serialize = "High")]
    High,
    /// Gridded or interpolated observations, or a thin event record.
    #[serde(rename = "Medium")]
    #[strum(serialize = "Medium")]
    Medium,
    /// Static climate-zone default.
    #[serde(rename = "Regional Baseline")]
    #[strum(serialize = "Regional Baseline")]
    RegionalBaseline,
    /// Event data is present but nothing damaging is recorded nearby.
    #[serde(rename = "Low Risk")]
    #[strum(serialize = "Low Risk")]
    LowRisk,
    /// No usable observation at or around the location.
    #[serde(rename = "No Data")]
    #[strum(serialize = "No Data")]
    NoData,
    /// The backing dataset could not be consulted at all.
    #[serde(rename = "Insufficient Data")]
    #[strum(serialize = "Insufficient Data")]
    InsufficientData,
}

impl Confidence {
    /// Tiers for which the hazard loss is forced to zero.
    #[must_use]
    pub const fn forces_zero_loss(self) -> bool {
        matches!(self, Self::NoData | Self::InsufficientData)
    }
}

/// Construction class of the insured asset.
#[derive(
    Debug,
    Default,
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
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BuildingType {
    /// Light timber construction (the most wind-vulnerable class).
    #[default]
    WoodFrame,
    /// Reinforced concrete.
    Concrete,
    /// Generic residential occupancy.
    Residential,
    /// Commercial occupancy.
    Commercial,
    /// Industrial occupancy.
    Industrial,
}

/// Which wind damage curve applies to a building.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindDamageClass {
    /// Wood-frame curve.
    WoodFrame,
    /// Concrete curve.
    Concrete,
}

/// Which flood depth-damage curve applies to a building.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloodDamageClass {
    /// Residential curve.
    Residential,
    /// Commercial curve.
    Commercial,
    /// Industrial curve.
    Industrial,
}

impl BuildingType {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::WoodFrame,
            Self::Concrete,
            Self::Residential,
            Self::Commercial,
            Self::Industrial,
        ]
    }

    /// Wind curve for this building type. Only concrete gets the stiffer
    /// curve; everything else is treated as wood frame.
    #[must_use]
    pub const fn wind_class(self) -> WindDamageClass {
        match self {
            Self::Concrete => WindDamageClass::Concrete,
            Self::WoodFrame | Self::Residential | Self::Commercial | Self::Industrial => {
                WindDamageClass::WoodFrame
            }
        }
    }

    /// Flood depth-damage curve for this building type.
    #[must_use]
    pub const fn flood_class(self) -> FloodDamageClass {
        match self {
            Self::Commercial => FloodDamageClass::Commercial,
            Self::Industrial => FloodDamageClass::Industrial,
            Self::WoodFrame | Self::Concrete | Self::Residential => FloodDamageClass::Residential,
        }
    }

    /// Multiplier applied to the chronic hazards (drought, heat stress,
    /// extreme precipitation).
    #[must_use]
    pub const fn vulnerability(self) -> f64 {
        match self {
            Self::WoodFrame | Self::Residential => 1.0,
            Self::Concrete => 0.8,
            Self::Commercial => 0.9,
            Self::Industrial => 0.85,
        }
    }
}

/// Outcome of one hazard model for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardAssessment {
    /// Expected annual loss in asset currency units.
    pub annual_loss: f64,
    /// Expected annual loss as a percentage of the asset value.
    pub annual_loss_pct: f64,
    /// Provenance tier of the data behind the estimate.
    pub confidence: Confidence,
    /// Human-readable explanation of the estimate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl HazardAssessment {
    /// A zero-loss assessment tagged with `confidence`.
    #[must_use]
    pub const fn zero(confidence: Confidence, details: Option<String>) -> Self {
        Self {
            annual_loss: 0.0,
            annual_loss_pct: 0.0,
            confidence,
            details,
        }
    }
}

/// Per-hazard assessments for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskBreakdown {
    /// Hurricane wind.
    pub hurricane: HazardAssessment,
    /// 100-year flood.
    pub flood: HazardAssessment,
    /// Heat stress.
    pub heat_stress: HazardAssessment,
    /// Drought.
    pub drought: HazardAssessment,
    /// Extreme precipitation.
    pub extreme_precipitation: HazardAssessment,
}

impl RiskBreakdown {
    /// Returns the assessment for `kind`.
    #[must_use]
    pub const fn get(&self, kind: HazardKind) -> &HazardAssessment {
        match kind {
            HazardKind::Hurricane => &self.hurricane,
            HazardKind::Flood => &self.flood,
            HazardKind::HeatStress => &self.heat_stress,
            HazardKind::Drought => &self.drought,
            HazardKind::ExtremePrecipitation => &self.extreme_precipitation,
        }
    }

    /// Iterates `(kind, assessment)` pairs in breakdown order.
    pub fn iter(&self) -> impl Iterator<Item = (HazardKind, &HazardAssessment)> {
        HazardKind::all().iter().map(|kind| (*kind, self.get(*kind)))
    }

    /// Sum of the five annual losses.
    #[must_use]
    pub fn total_annual_loss(&self) -> f64 {
        self.iter().map(|(_, a)| a.annual_loss).sum()
    }
}

/// The assessed location, echoed back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Place name, when the coordinate came from a named lookup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Free-text description of how the coordinate was chosen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Fixed model parameters, echoed back with every result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentParameters {
    /// Building class used for the vulnerability curves.
    pub building_type: BuildingType,
    /// Projection horizon in years.
    pub time_horizon: u32,
    /// Annual discount rate.
    pub discount_rate: f64,
    /// Annual climate-risk escalation rate.
    pub climate_escalation: f64,
}

/// How the assessed coordinate was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AssessmentType {
    /// The population-weighted center of a country.
    PopulationWeighted,
}

/// A complete climate risk assessment for one asset at one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResult {
    /// Insured asset value.
    pub asset_value: f64,
    /// Total expected annual loss across all hazards.
    pub expected_annual_loss: f64,
    /// Total expected annual loss as a percentage of the asset value.
    pub expected_annual_loss_pct: f64,
    /// Present value of the escalating losses over the horizon.
    pub present_value_30yr: f64,
    /// Present value as a percentage of the asset value.
    pub present_value_30yr_pct: f64,
    /// Per-hazard assessments.
    pub risk_breakdown: RiskBreakdown,
    /// Assessed location.
    pub location: Location,
    /// Model parameters.
    pub parameters: AssessmentParameters,
    /// Country name for country-level assessments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// How the coordinate was chosen, for country-level assessments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessment_type: Option<AssessmentType>,
}
