//! Country name to population-weighted center lookup.
//!
//! Loaded from a JSON object of the form
//! `{ "<country>": { "population_weighted": { "name", "latitude", "longitude" } } }`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use climate_risk_datasets::DatasetPaths;
use climate_risk_engine::{ResolvedLocation, ValidationError};
use serde::Deserialize;

/// Environment variable overriding the lookup file location.
pub const COUNTRY_LOOKUP_ENV: &str = "COUNTRY_LOOKUP_PATH";

/// Errors from loading the country lookup.
#[derive(Debug, thiserror::Error)]
pub enum CountryLookupError {
    /// The file could not be read.
    #[error("Failed to read country lookup {path}: {source}")]
    Io {
        /// Offending file.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The file is not a valid lookup document.
    #[error("Failed to parse country lookup {path}: {source}")]
    Json {
        /// Offending file.
        path: String,
        /// Underlying error.
        source: serde_json::Error,
    },
}

/// A country's population-weighted center.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CountryCenter {
    /// Name of the place at the center.
    pub name: String,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

#[derive(Debug, Deserialize)]
struct CountryEntry {
    population_weighted: CountryCenter,
}

/// Immutable country lookup table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountryLookup {
    countries: BTreeMap<String, CountryCenter>,
}

impl CountryLookup {
    /// Location of the lookup file: `$COUNTRY_LOOKUP_PATH`, or
    /// `country_lookup.json` in the data directory.
    #[must_use]
    pub fn path_from_env(paths: &DatasetPaths) -> PathBuf {
        std::env::var(COUNTRY_LOOKUP_ENV)
            .map_or_else(|_| paths.country_lookup_file(), PathBuf::from)
    }

    /// Parses a lookup document.
    ///
    /// # Errors
    ///
    /// Returns the parse error if `json` is not a valid lookup document.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let entries: BTreeMap<String, CountryEntry> = serde_json::from_str(json)?;
        Ok(Self {
            countries: entries
                .into_iter()
                .map(|(name, entry)| (name, entry.population_weighted))
                .collect(),
        })
    }

    /// Loads the lookup from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, CountryLookupError> {
        let json = std::fs::read_to_string(path).map_err(|source| CountryLookupError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let lookup = Self::from_json_str(&json).map_err(|source| CountryLookupError::Json {
            path: path.display().to_string(),
            source,
        })?;
        log::info!(
            "Loaded {} countries from {}",
            lookup.len(),
            path.display()
        );
        Ok(lookup)
    }

    /// Resolves `country` to its population-weighted center.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownCountry`] if the name is not in the
    /// table. Names are matched exactly.
    pub fn resolve(&self, country: &str) -> Result<ResolvedLocation, ValidationError> {
        let center = self
            .countries
            .get(country)
            .ok_or_else(|| ValidationError::UnknownCountry(country.to_string()))?;
        Ok(ResolvedLocation {
            country: country.to_string(),
            name: center.name.clone(),
            latitude: center.latitude,
            longitude: center.longitude,
        })
    }

    /// Known country names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.countries.keys().cloned().collect()
    }

    /// Number of countries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.countries.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}
