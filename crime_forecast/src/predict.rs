//! Next-month predictions
//!
//! Both predictors fit a fresh model on every call; nothing trained is kept
//! between selections.

use crate::data::{CrimeTable, Period};
use crate::error::{ForecastError, Result};
use crate::lags::{lag_column_name, DEFAULT_LAGS};
use crate::models::{FittedRegressor, RandomForestRegressor, Regressor};
use crate::selection::SelectionDataset;
use serde::Serialize;
use tracing::{debug, info};

/// Round a predicted count to the nearest whole number (ties to even)
pub fn round_count(value: f64) -> i64 {
    value.round_ties_even() as i64
}

/// Prediction for one area and category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointPrediction {
    /// Area name
    pub area: String,
    /// Predicted category
    pub category: String,
    /// Month being predicted
    pub period: Period,
    /// Raw model output
    pub value: f64,
    /// Displayed count
    pub rounded: i64,
    /// Rows the model was fitted on
    pub training_rows: usize,
}

/// Predicts the next month for a single area/category selection
#[derive(Debug, Clone)]
pub struct PointPredictor<R: Regressor = RandomForestRegressor> {
    model: R,
}

impl Default for PointPredictor<RandomForestRegressor> {
    fn default() -> Self {
        Self::new(RandomForestRegressor::default())
    }
}

impl<R: Regressor> PointPredictor<R> {
    /// Create a predictor around a regression model
    pub fn new(model: R) -> Self {
        Self { model }
    }

    /// Fit on the whole dataset and predict from its most recent row.
    ///
    /// Callers are expected to have handled the empty-selection case already;
    /// fitting on zero rows is reported by the model.
    pub fn predict(&self, dataset: &SelectionDataset) -> Result<PointPrediction> {
        let fitted = self.model.fit(&dataset.features, &dataset.targets)?;

        let (latest, period) = match (dataset.latest_features(), dataset.latest_period()) {
            (Some(features), Some(period)) => (features, period),
            _ => {
                return Err(ForecastError::InsufficientData(format!(
                    "no rows for {} in {}",
                    dataset.target, dataset.area
                )))
            }
        };

        let value = fitted.predict(latest)?;
        debug!(
            "{} predicts {:.3} {} for {} after {}",
            fitted.name(),
            value,
            dataset.target,
            dataset.area,
            period
        );

        Ok(PointPrediction {
            area: dataset.area.clone(),
            category: dataset.target.clone(),
            period: period.next()?,
            value,
            rounded: round_count(value),
            training_rows: dataset.len(),
        })
    }
}

/// Prediction for one area from the all-areas lag model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaPrediction {
    /// Area name
    pub area: String,
    /// Most recent month observed for the area
    pub latest_period: Period,
    /// Raw model output
    pub value: f64,
    /// Displayed count
    pub rounded: i64,
}

/// Per-area predictions for one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaPredictions {
    /// Predicted category
    pub category: String,
    /// Rows the model was fitted on
    pub training_rows: usize,
    /// One prediction per resolved area name, sorted by name
    pub predictions: Vec<AreaPrediction>,
}

/// Predicts the next month for every area from lag features alone
#[derive(Debug, Clone)]
pub struct AreaLevelPredictor<R: Regressor = RandomForestRegressor> {
    model: R,
    lags: Vec<usize>,
}

impl Default for AreaLevelPredictor<RandomForestRegressor> {
    fn default() -> Self {
        Self::new(RandomForestRegressor::default())
    }
}

impl<R: Regressor> AreaLevelPredictor<R> {
    /// Create a predictor using the default lag-1 and lag-3 features
    pub fn new(model: R) -> Self {
        Self {
            model,
            lags: DEFAULT_LAGS.to_vec(),
        }
    }

    /// Use a different set of lag columns as features
    pub fn with_lags(mut self, lags: Vec<usize>) -> Result<Self> {
        if lags.is_empty() {
            return Err(ForecastError::InvalidParameter(
                "At least one lag is required".to_string(),
            ));
        }
        self.lags = lags;
        Ok(self)
    }

    /// Fit one model across all areas and predict each area's next month.
    ///
    /// Training uses every row with all lag values and the target present.
    /// Each resolved area is then predicted from its most recent row, with
    /// missing lag values replaced by zero, so areas that contributed no
    /// training rows still get a prediction.
    pub fn predict(&self, table: &CrimeTable, category: &str) -> Result<AreaPredictions> {
        let lag_columns: Vec<String> = self
            .lags
            .iter()
            .map(|lag| lag_column_name(category, *lag))
            .collect();
        if lag_columns.iter().any(|name| !table.has_column(name)) {
            return Err(ForecastError::NoLagFeatures(category.to_string()));
        }
        if table.area_names().is_none() {
            return Err(ForecastError::DataError(
                "Area names have not been resolved".to_string(),
            ));
        }

        let target = table.column_values(category)?;
        let lag_values = lag_columns
            .iter()
            .map(|name| table.column_values(name))
            .collect::<Result<Vec<_>>>()?;

        let mut features = Vec::new();
        let mut targets = Vec::new();
        for (row, target_value) in target.iter().enumerate() {
            let Some(target_value) = target_value else {
                continue;
            };
            let row_features: Option<Vec<f64>> =
                lag_values.iter().map(|column| column[row]).collect();
            if let Some(row_features) = row_features {
                features.push(row_features);
                targets.push(*target_value);
            }
        }

        if targets.is_empty() {
            return Err(ForecastError::EmptyTrainingSet(format!(
                "no rows of {} have all lag values",
                category
            )));
        }

        let fitted = self.model.fit(&features, &targets)?;

        let mut predictions = Vec::new();
        for (area, rows) in table.rows_by_name() {
            let Some(latest) = rows.last().copied() else {
                continue;
            };
            let snapshot: Vec<f64> = lag_values
                .iter()
                .map(|column| column[latest].unwrap_or(0.0))
                .collect();
            let value = fitted.predict(&snapshot)?;
            predictions.push(AreaPrediction {
                area,
                latest_period: table.periods()[latest],
                value,
                rounded: round_count(value),
            });
        }

        info!(
            "Predicted {} for {} areas from {} training rows",
            category,
            predictions.len(),
            targets.len()
        );

        Ok(AreaPredictions {
            category: category.to_string(),
            training_rows: targets.len(),
            predictions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_point_predictor_uses_forest_defaults() {
        let predictor = PointPredictor::default();
        assert_eq!(predictor.model.n_estimators(), 100);
        assert_eq!(predictor.model.seed(), 42);
    }

    #[test]
    fn test_round_count_to_nearest() {
        assert_eq!(round_count(7.4), 7);
        assert_eq!(round_count(7.6), 8);
        assert_eq!(round_count(2.5), 2);
        assert_eq!(round_count(3.5), 4);
        assert_eq!(round_count(0.0), 0);
    }
}
