//! Per-area, per-category training sets and history

use crate::data::{is_lag_column, CrimeTable, Period};
use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Whether other categories' columns may be used as features
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrossCategoryFeatures {
    /// Every numeric column except the target is a feature, including other
    /// categories' raw and lagged counts
    #[default]
    Included,
    /// Only the target category's own lag columns are features
    Excluded,
}

/// Training rows for one area and one target category, oldest first
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionDataset {
    /// Selected area name
    pub area: String,
    /// Target category
    pub target: String,
    /// Feature column names, in table order
    pub feature_names: Vec<String>,
    /// Feature rows aligned with `feature_names`
    pub features: Vec<Vec<f64>>,
    /// Target value of each row
    pub targets: Vec<f64>,
    /// Period of each row
    pub periods: Vec<Period>,
}

impl SelectionDataset {
    /// Number of complete rows
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether no complete rows remain
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Features of the most recent row
    pub fn latest_features(&self) -> Option<&[f64]> {
        self.features.last().map(Vec::as_slice)
    }

    /// Period of the most recent row
    pub fn latest_period(&self) -> Option<Period> {
        self.periods.last().copied()
    }
}

/// Builds [`SelectionDataset`]s from a lag-augmented, name-resolved table
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectionBuilder {
    cross_category: CrossCategoryFeatures,
}

impl SelectionBuilder {
    /// Create a builder with the given feature policy
    pub fn new(cross_category: CrossCategoryFeatures) -> Self {
        Self { cross_category }
    }

    /// The feature policy in use
    pub fn cross_category(&self) -> CrossCategoryFeatures {
        self.cross_category
    }

    /// Feature columns used when predicting `target`
    pub fn feature_columns(&self, table: &CrimeTable, target: &str) -> Vec<String> {
        let own_lag_prefix = format!("{}_lag", target);
        table
            .value_columns()
            .into_iter()
            .filter(|name| name != target)
            .filter(|name| match self.cross_category {
                CrossCategoryFeatures::Included => true,
                CrossCategoryFeatures::Excluded => {
                    is_lag_column(name) && name.starts_with(&own_lag_prefix)
                }
            })
            .collect()
    }

    /// Extract the complete rows for `area` with `target` as the label.
    ///
    /// Rows missing the target or any feature are dropped. If nothing is
    /// left the result is [`ForecastError::InsufficientData`].
    pub fn build(&self, table: &CrimeTable, area: &str, target: &str) -> Result<SelectionDataset> {
        let target_values = table.column_values(target)?;
        let feature_names = self.feature_columns(table, target);
        let feature_values = feature_names
            .iter()
            .map(|name| table.column_values(name))
            .collect::<Result<Vec<_>>>()?;

        let rows = table.rows_for_name(area);
        let mut dataset = SelectionDataset {
            area: area.to_string(),
            target: target.to_string(),
            feature_names,
            features: Vec::with_capacity(rows.len()),
            targets: Vec::with_capacity(rows.len()),
            periods: Vec::with_capacity(rows.len()),
        };

        for row in &rows {
            let Some(target_value) = target_values[*row] else {
                continue;
            };
            let features: Option<Vec<f64>> =
                feature_values.iter().map(|column| column[*row]).collect();
            let Some(features) = features else {
                continue;
            };

            dataset.features.push(features);
            dataset.targets.push(target_value);
            dataset.periods.push(table.periods()[*row]);
        }

        debug!(
            "Selection for {} / {}: {} of {} rows complete",
            area,
            target,
            dataset.len(),
            rows.len()
        );

        if dataset.is_empty() {
            return Err(ForecastError::InsufficientData(format!(
                "no complete rows for {} in {}",
                target, area
            )));
        }

        Ok(dataset)
    }
}

/// One point of an area's history
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendPoint {
    /// Month of the observation
    pub period: Period,
    /// Observed count, missing when the table has no value
    pub value: Option<f64>,
}

/// Historical counts of one category in one area
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSeries {
    /// Area name
    pub area: String,
    /// Category
    pub category: String,
    /// Points in chronological order
    pub points: Vec<TrendPoint>,
}

impl TrendSeries {
    /// Observed values, skipping gaps
    pub fn observed_values(&self) -> Vec<f64> {
        self.points.iter().filter_map(|point| point.value).collect()
    }
}

/// Chronological history of `category` in `area`, with missing months kept as gaps
pub fn trend(table: &CrimeTable, area: &str, category: &str) -> Result<TrendSeries> {
    let values = table.column_values(category)?;
    let rows = table.rows_for_name(area);
    if rows.is_empty() {
        return Err(ForecastError::UnknownArea(area.to_string()));
    }

    let points = rows
        .iter()
        .map(|row| TrendPoint {
            period: table.periods()[*row],
            value: values[*row],
        })
        .collect();

    Ok(TrendSeries {
        area: area.to_string(),
        category: category.to_string(),
        points,
    })
}
