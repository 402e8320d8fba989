//! Lagged count features
//!
//! Each category gets one derived column per lag, holding the value observed
//! `k` months earlier in the same area's chronologically sorted series. The
//! first `k` rows of every area have no lag value.

use crate::data::CrimeTable;
use crate::error::{ForecastError, Result};
use std::collections::BTreeMap;
use tracing::debug;

/// Lags built when none are configured
pub const DEFAULT_LAGS: [usize; 2] = [1, 3];

/// Name of the lag-`k` column derived from `category`
pub fn lag_column_name(category: &str, lag: usize) -> String {
    format!("{}_lag{}", category, lag)
}

/// Shift `values` by `lag` positions inside each group.
///
/// `groups` lists row indices per area in chronological order; the output at
/// a row is the value `lag` positions earlier in that row's own group. Rows
/// not covered by any group, and the first `lag` rows of each group, are
/// missing.
pub fn shift_within_groups(
    groups: &BTreeMap<i64, Vec<usize>>,
    values: &[Option<f64>],
    lag: usize,
) -> Vec<Option<f64>> {
    let mut shifted = vec![None; values.len()];
    for rows in groups.values() {
        for (position, row) in rows.iter().enumerate().skip(lag) {
            shifted[*row] = values[rows[position - lag]];
        }
    }
    shifted
}

/// Builds lagged copies of every category column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LagFeatureBuilder {
    lags: Vec<usize>,
}

impl Default for LagFeatureBuilder {
    fn default() -> Self {
        Self {
            lags: DEFAULT_LAGS.to_vec(),
        }
    }
}

impl LagFeatureBuilder {
    /// Create a builder for a custom set of lags
    pub fn new(lags: Vec<usize>) -> Result<Self> {
        if lags.is_empty() {
            return Err(ForecastError::InvalidParameter(
                "At least one lag is required".to_string(),
            ));
        }
        if lags.contains(&0) {
            return Err(ForecastError::InvalidParameter(
                "Lags must be at least 1".to_string(),
            ));
        }

        let mut lags = lags;
        lags.sort_unstable();
        lags.dedup();
        Ok(Self { lags })
    }

    /// The lags this builder produces
    pub fn lags(&self) -> &[usize] {
        &self.lags
    }

    /// Return a copy of `table` with `<category>_lag<k>` columns added.
    ///
    /// Ordering comes from sorting each area by (year, month), so the result
    /// does not depend on the row order of the input.
    pub fn build(&self, table: &CrimeTable) -> Result<CrimeTable> {
        let groups = table.rows_by_area();
        let mut lagged = table.clone();

        for category in table.categories() {
            let values = table.column_values(category)?;
            for lag in &self.lags {
                let shifted = shift_within_groups(&groups, &values, *lag);
                lagged = lagged.with_column(&lag_column_name(category, *lag), shifted)?;
            }
        }

        debug!(
            "Built {} lag columns for {} areas",
            table.categories().len() * self.lags.len(),
            groups.len()
        );
        Ok(lagged)
    }
}
