//! CART regression trees

use crate::error::{ForecastError, Result};
use crate::models::FittedRegressor;
use rand::rngs::StdRng;
use std::cmp::Ordering;

// Relative to the node's sum of squared targets
const IMPURITY_EPSILON: f64 = 1e-12;

/// Growth limits for a single tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeParams {
    /// Maximum depth, unbounded when `None`
    pub max_depth: Option<usize>,
    /// Minimum number of samples a node needs before it may split
    pub min_samples_split: usize,
    /// Number of features considered at each split, all when `None`
    pub max_features: Option<usize>,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            max_features: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, Copy)]
struct Split {
    feature: usize,
    threshold: f64,
    score: f64,
}

/// A fitted regression tree stored as a flat node arena; node 0 is the root
#[derive(Debug, Clone)]
pub struct FittedTree {
    nodes: Vec<Node>,
    n_features: usize,
}

impl FittedTree {
    /// Grow a tree on the rows listed in `samples` (duplicates allowed).
    ///
    /// Splits minimise the summed squared error of the two children; leaves
    /// predict the mean target of their samples.
    pub fn grow(
        features: &[Vec<f64>],
        targets: &[f64],
        samples: Vec<usize>,
        params: &TreeParams,
        rng: &mut StdRng,
    ) -> Result<Self> {
        if samples.is_empty() {
            return Err(ForecastError::InsufficientData(
                "cannot grow a tree without samples".to_string(),
            ));
        }

        let n_features = features.first().map(Vec::len).unwrap_or(0);
        let mut tree = Self {
            nodes: Vec::new(),
            n_features,
        };
        let mut grower = Grower {
            features,
            targets,
            params,
            rng,
        };
        grower.grow_node(&mut tree.nodes, samples, 0);
        Ok(tree)
    }

    /// Number of nodes, leaves included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Length of the longest root-to-leaf path
    pub fn depth(&self) -> usize {
        fn depth_of(nodes: &[Node], index: usize) -> usize {
            match &nodes[index] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => {
                    1 + depth_of(nodes, *left).max(depth_of(nodes, *right))
                }
            }
        }
        depth_of(&self.nodes, 0)
    }
}

impl FittedRegressor for FittedTree {
    fn predict(&self, features: &[f64]) -> Result<f64> {
        if features.len() != self.n_features {
            return Err(ForecastError::DataError(format!(
                "Expected {} features, got {}",
                self.n_features,
                features.len()
            )));
        }

        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf { value } => return Ok(*value),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if features[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn name(&self) -> &str {
        "Regression Tree"
    }
}

struct Grower<'a> {
    features: &'a [Vec<f64>],
    targets: &'a [f64],
    params: &'a TreeParams,
    rng: &'a mut StdRng,
}

impl Grower<'_> {
    fn grow_node(&mut self, nodes: &mut Vec<Node>, samples: Vec<usize>, depth: usize) -> usize {
        let n = samples.len() as f64;
        let sum: f64 = samples.iter().map(|i| self.targets[*i]).sum();
        let sum_sq: f64 = samples.iter().map(|i| self.targets[*i].powi(2)).sum();
        let impurity = sum_sq - sum * sum / n;
        let tolerance = IMPURITY_EPSILON * sum_sq.max(1.0);

        let index = nodes.len();
        nodes.push(Node::Leaf { value: sum / n });

        let depth_reached = self.params.max_depth.map_or(false, |max| depth >= max);
        if samples.len() < self.params.min_samples_split
            || depth_reached
            || impurity <= tolerance
        {
            return index;
        }

        // An impure node splits even when no threshold lowers the error
        let Some(split) = self.best_split(&samples, sum, sum_sq, impurity + tolerance) else {
            return index;
        };

        let (left_samples, right_samples): (Vec<usize>, Vec<usize>) = samples
            .iter()
            .partition(|i| self.features[**i][split.feature] <= split.threshold);

        let left = self.grow_node(nodes, left_samples, depth + 1);
        let right = self.grow_node(nodes, right_samples, depth + 1);
        nodes[index] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        index
    }

    fn candidate_features(&mut self) -> Vec<usize> {
        let n_features = self.features.first().map(Vec::len).unwrap_or(0);
        match self.params.max_features {
            Some(k) if k > 0 && k < n_features => {
                let mut chosen =
                    rand::seq::index::sample(&mut *self.rng, n_features, k).into_vec();
                chosen.sort_unstable();
                chosen
            }
            _ => (0..n_features).collect(),
        }
    }

    fn best_split(
        &mut self,
        samples: &[usize],
        sum: f64,
        sum_sq: f64,
        max_score: f64,
    ) -> Option<Split> {
        let n = samples.len();
        let mut best: Option<Split> = None;

        for feature in self.candidate_features() {
            let mut ordered: Vec<(f64, f64)> = samples
                .iter()
                .map(|i| (self.features[*i][feature], self.targets[*i]))
                .collect();
            ordered.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;
            for k in 1..n {
                let (x_prev, y_prev) = ordered[k - 1];
                left_sum += y_prev;
                left_sq += y_prev * y_prev;

                let x_next = ordered[k].0;
                if x_prev >= x_next {
                    continue;
                }

                let left_n = k as f64;
                let right_n = (n - k) as f64;
                let right_sum = sum - left_sum;
                let right_sq = sum_sq - left_sq;
                let score = (left_sq - left_sum * left_sum / left_n)
                    + (right_sq - right_sum * right_sum / right_n);

                if score <= max_score
                    && best.map_or(true, |current| score < current.score)
                {
                    let mut threshold = (x_prev + x_next) / 2.0;
                    if threshold >= x_next {
                        threshold = x_prev;
                    }
                    best = Some(Split {
                        feature,
                        threshold,
                        score,
                    });
                }
            }
        }

        best
    }
}
