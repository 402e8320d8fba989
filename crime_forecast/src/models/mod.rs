//! Regression models used to project monthly counts

use crate::error::{ForecastError, Result};
use std::fmt::Debug;

/// Fitted regression model
pub trait FittedRegressor: Debug {
    /// Predict the target for one feature row
    fn predict(&self, features: &[f64]) -> Result<f64>;

    /// Predict the target for many feature rows
    fn predict_many(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>> {
        rows.iter().map(|row| self.predict(row)).collect()
    }

    /// Number of features the model was fitted on
    fn n_features(&self) -> usize;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Regression model that can be fitted on a feature matrix
pub trait Regressor: Debug + Clone {
    /// The type of fitted model produced
    type Fitted: FittedRegressor;

    /// Fit the model to `features` (one row per sample) and `targets`
    fn fit(&self, features: &[Vec<f64>], targets: &[f64]) -> Result<Self::Fitted>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

/// Check that a training set is non-empty and rectangular, returning its width
pub(crate) fn validate_training_set(features: &[Vec<f64>], targets: &[f64]) -> Result<usize> {
    if features.is_empty() {
        return Err(ForecastError::InsufficientData(
            "cannot fit a model on zero rows".to_string(),
        ));
    }
    if features.len() != targets.len() {
        return Err(ForecastError::DataError(format!(
            "Feature rows ({}) don't match targets ({})",
            features.len(),
            targets.len()
        )));
    }

    let width = features[0].len();
    if let Some(row) = features.iter().position(|row| row.len() != width) {
        return Err(ForecastError::DataError(format!(
            "Feature row {} has {} values, expected {}",
            row,
            features[row].len(),
            width
        )));
    }
    if features.iter().flatten().chain(targets).any(|v| !v.is_finite()) {
        return Err(ForecastError::DataError(
            "Training data contains non-finite values".to_string(),
        ));
    }

    Ok(width)
}

pub mod forest;
pub mod tree;

pub use forest::{FittedForest, RandomForestRegressor};
pub use tree::{FittedTree, TreeParams};
