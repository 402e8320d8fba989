//! Error types for the crime_forecast crate

use polars::prelude::PolarsError;
use thiserror::Error;

/// Custom error types for the crime_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// A required column is not present in the table
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// The requested area name is not present in the table
    #[error("Unknown area: {0}")]
    UnknownArea(String),

    /// No complete rows remain for the selected area and category
    #[error("Not enough data to predict yet: {0}")]
    InsufficientData(String),

    /// The category was never lagged, so no per-area model can be trained
    #[error("No lag features found for category '{0}'")]
    NoLagFeatures(String),

    /// Every row was missing a lag value or the target
    #[error("Not enough data to train the area model: {0}")]
    EmptyTrainingSet(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),

    /// Error writing CSV exports
    #[error("CSV error: {0}")]
    CsvError(String),

    /// Error producing JSON exports
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::CsvError(err.to_string())
    }
}

impl ForecastError {
    /// Whether this error only skips one output rather than invalidating the table
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ForecastError::InsufficientData(_)
                | ForecastError::NoLagFeatures(_)
                | ForecastError::EmptyTrainingSet(_)
                | ForecastError::UnknownArea(_)
                | ForecastError::MissingColumn(_)
        )
    }
}
