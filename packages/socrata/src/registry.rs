//! Compile-time registry of inspection dataset configurations.
//!
//! Each open-data dataset is described by a TOML file under `datasets/`.
//! The registry embeds these at compile time and exposes them via
//! [`all_datasets`], [`find_dataset`], and [`default_dataset`].

use serde::Deserialize;

/// An inspection dataset configuration loaded from TOML.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatasetConfig {
    /// Unique identifier (e.g., `"austin"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// SODA resource endpoint (e.g.,
    /// `"https://data.austintexas.gov/resource/ecmv-9xxi.json"`).
    pub api_url: String,
    /// Human-readable portal page for the dataset.
    #[serde(default)]
    pub portal_url: Option<String>,
    /// Value of the `$limit` parameter sent with every query.
    #[serde(default = "default_row_limit")]
    pub row_limit: u32,
    /// Radius of the proximity search in meters.
    #[serde(default = "default_radius_meters")]
    pub radius_meters: u32,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Columns requested via `$select`. Empty selects every column.
    #[serde(default)]
    pub select: Vec<String>,
    /// Dataset column names used in predicates.
    #[serde(default)]
    pub columns: ColumnConfig,
}

/// Column names referenced by the generated predicates.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ColumnConfig {
    /// Restaurant name column, matched with `lower(..) like`.
    pub name: String,
    /// Location column, matched with `within_circle`.
    pub location: String,
    /// Inspection date column, used for `$order`.
    pub date: String,
    /// Establishment identifier column, used for history lookups.
    pub establishment: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            name: "restaurant_name".to_string(),
            location: "address".to_string(),
            date: "inspection_date".to_string(),
            establishment: "parent_id".to_string(),
        }
    }
}

const fn default_row_limit() -> u32 {
    100
}

const fn default_radius_meters() -> u32 {
    1000
}

const fn default_timeout_secs() -> u64 {
    30
}

impl DatasetConfig {
    /// Returns a copy of this config pointed at a different endpoint.
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }
}

// ── Compile-time embedded TOML files ────────────────────────────────

const DATASET_TOMLS: &[(&str, &str)] = &[("austin", include_str!("../datasets/austin.toml"))];

/// Identifier of the dataset used when none is specified.
pub const DEFAULT_DATASET_ID: &str = "austin";

#[cfg(test)]
const EXPECTED_DATASET_COUNT: usize = 1;

/// Returns all dataset configurations.
///
/// # Panics
///
/// Panics if any TOML config is malformed (this is a compile-time guarantee
/// since the configs are embedded).
#[must_use]
pub fn all_datasets() -> Vec<DatasetConfig> {
    DATASET_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            toml::de::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse dataset '{name}': {e}"))
        })
        .collect()
}

/// Looks up a dataset by its identifier.
#[must_use]
pub fn find_dataset(id: &str) -> Option<DatasetConfig> {
    all_datasets().into_iter().find(|d| d.id == id)
}

/// Returns the default (Austin) dataset.
///
/// # Panics
///
/// Panics if the default dataset is missing from the embedded registry.
#[must_use]
pub fn default_dataset() -> DatasetConfig {
    find_dataset(DEFAULT_DATASET_ID)
        .unwrap_or_else(|| panic!("Dataset '{DEFAULT_DATASET_ID}' is not registered"))
}
