//! Error types for the dashboard

use area_atlas::AtlasError;
use crime_forecast::ForecastError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while configuring or running the dashboard
#[derive(Debug, Error)]
pub enum DashboardError {
    /// The configuration file could not be read
    #[error("Failed to read config {path}: {source}")]
    ReadConfig {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for this schema
    #[error("Failed to parse config {path}: {source}")]
    ParseConfig {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Neither the config nor the command line named a data file
    #[error("No crime data file configured")]
    MissingDataPath,

    /// Boundary data could not be loaded, so no map can be drawn
    #[error("Reference data unavailable: {0}")]
    ReferenceData(String),

    /// Error from the forecasting pipeline
    #[error(transparent)]
    Forecast(#[from] ForecastError),

    /// Error from reference data handling
    #[error(transparent)]
    Atlas(#[from] AtlasError),

    /// The global tracing subscriber could not be installed
    #[error("Failed to install logging: {0}")]
    Logging(String),

    /// Error writing exports
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for dashboard operations
pub type Result<T> = std::result::Result<T, DashboardError>;
