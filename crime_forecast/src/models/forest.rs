//! Random forest regression

use crate::error::{ForecastError, Result};
use crate::models::tree::{FittedTree, TreeParams};
use crate::models::{validate_training_set, FittedRegressor, Regressor};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Trees grown when no count is configured
pub const DEFAULT_ESTIMATORS: usize = 100;
/// Seed used when none is configured
pub const DEFAULT_SEED: u64 = 42;

/// Bootstrap-aggregated forest of regression trees
#[derive(Debug, Clone)]
pub struct RandomForestRegressor {
    /// Name of the model
    name: String,
    /// Number of trees
    n_estimators: usize,
    /// Seed for bootstrap sampling and feature subsampling
    seed: u64,
    /// Per-tree growth limits
    params: TreeParams,
    /// Whether each tree sees a bootstrap resample
    bootstrap: bool,
}

/// Fitted random forest
#[derive(Debug, Clone)]
pub struct FittedForest {
    /// Name of the model
    name: String,
    /// Fitted trees
    trees: Vec<FittedTree>,
    /// Feature count seen during fitting
    n_features: usize,
}

impl Default for RandomForestRegressor {
    fn default() -> Self {
        Self {
            name: format!("Random Forest (trees={})", DEFAULT_ESTIMATORS),
            n_estimators: DEFAULT_ESTIMATORS,
            seed: DEFAULT_SEED,
            params: TreeParams::default(),
            bootstrap: true,
        }
    }
}

impl RandomForestRegressor {
    /// Create a forest with the given number of trees and seed
    pub fn new(n_estimators: usize, seed: u64) -> Result<Self> {
        if n_estimators == 0 {
            return Err(ForecastError::InvalidParameter(
                "Number of estimators must be positive".to_string(),
            ));
        }

        Ok(Self {
            name: format!("Random Forest (trees={})", n_estimators),
            n_estimators,
            seed,
            ..Self::default()
        })
    }

    /// Limit the depth of every tree
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.params.max_depth = max_depth;
        self
    }

    /// Minimum samples a node needs before it may split
    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Result<Self> {
        if min_samples_split < 2 {
            return Err(ForecastError::InvalidParameter(
                "min_samples_split must be at least 2".to_string(),
            ));
        }
        self.params.min_samples_split = min_samples_split;
        Ok(self)
    }

    /// Number of features considered per split; all features when `None`
    pub fn with_max_features(mut self, max_features: Option<usize>) -> Self {
        self.params.max_features = max_features;
        self
    }

    /// Grow every tree on the full training set instead of a bootstrap resample
    pub fn without_bootstrap(mut self) -> Self {
        self.bootstrap = false;
        self
    }

    /// Number of trees
    pub fn n_estimators(&self) -> usize {
        self.n_estimators
    }

    /// Seed for the random number generator
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Regressor for RandomForestRegressor {
    type Fitted = FittedForest;

    fn fit(&self, features: &[Vec<f64>], targets: &[f64]) -> Result<Self::Fitted> {
        let n_features = validate_training_set(features, targets)?;
        let n_samples = targets.len();
        let mut rng = StdRng::seed_from_u64(self.seed);

        let mut trees = Vec::with_capacity(self.n_estimators);
        for _ in 0..self.n_estimators {
            let samples: Vec<usize> = if self.bootstrap {
                (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
            } else {
                (0..n_samples).collect()
            };
            trees.push(FittedTree::grow(
                features,
                targets,
                samples,
                &self.params,
                &mut rng,
            )?);
        }

        debug!(
            "Fitted {} trees on {} samples x {} features",
            trees.len(),
            n_samples,
            n_features
        );

        Ok(FittedForest {
            name: self.name.clone(),
            trees,
            n_features,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl FittedForest {
    /// Number of fitted trees
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl FittedRegressor for FittedForest {
    fn predict(&self, features: &[f64]) -> Result<f64> {
        let mut total = 0.0;
        for tree in &self.trees {
            total += tree.predict(features)?;
        }
        Ok(total / self.trees.len() as f64)
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn name(&self) -> &str {
        &self.name
    }
}
