use crime_forecast::error::ForecastError;
use std::io;

#[test]
fn test_error_conversion() {
    let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
    let forecast_error = ForecastError::from(io_error);

    assert!(matches!(forecast_error, ForecastError::IoError(_)));

    let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let forecast_error = ForecastError::from(json_error);

    assert!(matches!(forecast_error, ForecastError::JsonError(_)));
}

#[test]
fn test_error_display() {
    let error = ForecastError::NoLagFeatures("theft".to_string());
    let error_string = format!("{}", error);

    assert!(error_string.contains("No lag features"));
    assert!(error_string.contains("theft"));

    let error = ForecastError::InsufficientData("no complete rows".to_string());
    assert!(error.to_string().starts_with("Not enough data to predict yet"));

    let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "permission denied");
    let error_string = ForecastError::from(io_error).to_string();

    assert!(error_string.contains("IO error"));
    assert!(error_string.contains("permission denied"));
}

#[test]
fn test_recoverable_errors() {
    assert!(ForecastError::InsufficientData(String::new()).is_recoverable());
    assert!(ForecastError::NoLagFeatures(String::new()).is_recoverable());
    assert!(ForecastError::EmptyTrainingSet(String::new()).is_recoverable());
    assert!(!ForecastError::PolarsError(String::new()).is_recoverable());
    assert!(!ForecastError::DataError(String::new()).is_recoverable());
}
