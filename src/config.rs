//! Dashboard configuration
//!
//! Settings live in a TOML file; every section and key is optional and falls
//! back to the defaults below. Command-line flags are applied on top by the
//! binary.

use crate::error::{DashboardError, Result};
use area_atlas::{BoundarySource, PropertyKeys};
use crime_forecast::lags::DEFAULT_LAGS;
use crime_forecast::models::forest::{DEFAULT_ESTIMATORS, DEFAULT_SEED};
use crime_forecast::{CrossCategoryFeatures, LagFeatureBuilder, RandomForestRegressor, TableSchema};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Crime table location and column names
    pub data: DataConfig,
    /// Boundary reference data
    pub boundaries: BoundaryConfig,
    /// Feature and model settings
    pub model: ModelConfig,
    /// User-facing reporting choices
    pub report: ReportConfig,
}

/// Where the crime table comes from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// CSV or Parquet file with one row per area and month
    pub path: Option<PathBuf>,
    /// Key column names
    #[serde(flatten)]
    pub schema: TableSchema,
}

/// Where the boundary document comes from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryConfig {
    /// File path or http(s) URL; maps are unavailable without one
    pub source: Option<String>,
    /// Property names inside each feature
    #[serde(flatten)]
    pub keys: PropertyKeys,
}

/// Feature engineering and regression settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Trees per forest
    pub n_estimators: usize,
    /// Seed shared by every fit
    pub seed: u64,
    /// Optional depth limit per tree
    pub max_depth: Option<usize>,
    /// Lags built for every category
    pub lags: Vec<usize>,
    /// Whether point predictions may use other categories' columns
    pub cross_category_features: CrossCategoryFeatures,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            n_estimators: DEFAULT_ESTIMATORS,
            seed: DEFAULT_SEED,
            max_depth: None,
            lags: DEFAULT_LAGS.to_vec(),
            cross_category_features: CrossCategoryFeatures::Included,
        }
    }
}

/// How area codes without a display name are reported
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnresolvedPolicy {
    /// Only emit a log warning
    #[default]
    Log,
    /// Also show a warning in the report
    Warn,
}

/// Reporting choices
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Handling of area codes that resolve to no name
    pub unresolved_areas: UnresolvedPolicy,
}

impl DashboardConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| DashboardError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| DashboardError::ParseConfig {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration if a path is given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// The configured boundary source, if any
    pub fn boundary_source(&self) -> Option<BoundarySource> {
        self.boundaries
            .source
            .as_deref()
            .filter(|location| !location.trim().is_empty())
            .map(BoundarySource::parse)
    }

    /// Forest built from the model section
    pub fn forest(&self) -> Result<RandomForestRegressor> {
        Ok(RandomForestRegressor::new(self.model.n_estimators, self.model.seed)?
            .with_max_depth(self.model.max_depth))
    }

    /// Lag builder for the configured lags
    pub fn lag_builder(&self) -> Result<LagFeatureBuilder> {
        Ok(LagFeatureBuilder::new(self.model.lags.clone())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config: DashboardConfig = toml::from_str("").unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.model.n_estimators, 100);
        assert_eq!(config.model.seed, 42);
        assert_eq!(config.data.schema.area_column, "Community Area");
        assert_eq!(config.boundaries.keys.name_property, "community");
        assert!(config.boundary_source().is_none());
    }

    #[test]
    fn test_sections_override_defaults() {
        let config: DashboardConfig = toml::from_str(
            r#"
            [data]
            path = "crime_monthly_pivot.csv"
            area_column = "area"

            [boundaries]
            source = "https://example.org/areas.geojson"
            name_property = "name"

            [model]
            n_estimators = 10
            lags = [1, 2, 3]
            cross_category_features = "excluded"

            [report]
            unresolved_areas = "warn"
            "#,
        )
        .unwrap();

        assert_eq!(config.data.path, Some(PathBuf::from("crime_monthly_pivot.csv")));
        assert_eq!(config.data.schema.area_column, "area");
        assert_eq!(config.data.schema.year_column, "Year");
        assert_eq!(config.boundaries.keys.id_property, "area_num_1");
        assert_eq!(config.boundaries.keys.name_property, "name");
        assert_eq!(
            config.boundary_source(),
            Some(BoundarySource::Url("https://example.org/areas.geojson".to_string()))
        );
        assert_eq!(config.model.seed, 42);
        assert_eq!(config.model.lags, vec![1, 2, 3]);
        assert_eq!(
            config.model.cross_category_features,
            CrossCategoryFeatures::Excluded
        );
        assert_eq!(config.report.unresolved_areas, UnresolvedPolicy::Warn);
        assert_eq!(config.forest().unwrap().n_estimators(), 10);
    }

    #[test]
    fn test_invalid_model_settings_are_rejected() {
        let mut config = DashboardConfig::default();
        config.model.n_estimators = 0;
        assert!(config.forest().is_err());

        config.model.lags = vec![];
        assert!(config.lag_builder().is_err());
    }
}
