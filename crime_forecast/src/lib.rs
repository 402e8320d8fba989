//! # Crime Forecast
//!
//! Monthly crime counts per community area, turned into next-month forecasts.
//!
//! ## Features
//!
//! - Loading pivoted monthly count tables (CSV or Parquet) with category discovery
//! - Lagged count features computed per area in chronological order
//! - Per-area, per-category training sets with explicit cross-category policy
//! - Random-forest regression with a fixed seed for reproducible predictions
//! - Per-area predictions from lag features for predicted-value maps
//! - Choropleth data bound to community-area boundary documents
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use area_atlas::AreaNameResolver;
//! use crime_forecast::{DataLoader, LagFeatureBuilder, PointPredictor, SelectionBuilder};
//!
//! # fn main() -> crime_forecast::Result<()> {
//! // Load data and derive lag features
//! let table = DataLoader::from_csv("crime_monthly_pivot.csv")?
//!     .with_area_names(&AreaNameResolver::chicago())?;
//! let table = LagFeatureBuilder::default().build(&table)?;
//!
//! // Build the training set for one selection
//! let dataset = SelectionBuilder::default().build(&table, "Uptown", "THEFT")?;
//!
//! // Fit and predict next month
//! let prediction = PointPredictor::default().predict(&dataset)?;
//! println!("{} {}: {}", prediction.area, prediction.period, prediction.rounded);
//! # Ok(())
//! # }
//! ```

pub mod data;
pub mod error;
pub mod lags;
pub mod maps;
pub mod models;
pub mod predict;
pub mod selection;

// Re-export commonly used types
pub use crate::data::{CrimeTable, DataLoader, Period, TableSchema};
pub use crate::error::{ForecastError, Result};
pub use crate::lags::{lag_column_name, LagFeatureBuilder};
pub use crate::maps::{ChoroplethData, ChoroplethMap, MapKind};
pub use crate::models::{FittedRegressor, RandomForestRegressor, Regressor};
pub use crate::predict::{AreaLevelPredictor, AreaPredictions, PointPrediction, PointPredictor};
pub use crate::selection::{trend, CrossCategoryFeatures, SelectionBuilder, SelectionDataset, TrendSeries};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
