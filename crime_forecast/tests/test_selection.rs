use area_atlas::AreaNameResolver;
use crime_forecast::data::{CrimeTable, Period, TableSchema};
use crime_forecast::lags::LagFeatureBuilder;
use crime_forecast::selection::{trend, CrossCategoryFeatures, SelectionBuilder};
use crime_forecast::ForecastError;
use polars::prelude::*;
use pretty_assertions::assert_eq;
use rstest::rstest;

/// Rogers Park (1) and West Ridge (2) over six months; Rogers Park is missing
/// its May battery count.
fn lagged_table() -> CrimeTable {
    let areas: Vec<i64> = [1i64; 6].iter().chain([2i64; 6].iter()).copied().collect();
    let months: Vec<i64> = (1..=6).chain(1..=6).collect();
    let theft: Vec<Option<f64>> = [5.0, 7.0, 9.0, 11.0, 13.0, 15.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]
        .iter()
        .map(|v| Some(*v))
        .collect();
    let mut battery: Vec<Option<f64>> = (0..12).map(|v| Some(v as f64)).collect();
    battery[4] = None;

    let df = DataFrame::new(vec![
        Series::new("Community Area", areas),
        Series::new("Year", vec![2024i64; 12]),
        Series::new("Month", months),
        Series::new("THEFT", theft),
        Series::new("BATTERY", battery),
    ])
    .unwrap();

    let table = CrimeTable::new(df, TableSchema::default())
        .unwrap()
        .with_area_names(&AreaNameResolver::chicago())
        .unwrap();
    LagFeatureBuilder::default().build(&table).unwrap()
}

#[test]
fn test_features_exclude_keys_and_target() {
    let table = lagged_table();

    let features = SelectionBuilder::default().feature_columns(&table, "THEFT");

    assert_eq!(
        features,
        vec![
            "BATTERY".to_string(),
            "THEFT_lag1".to_string(),
            "THEFT_lag3".to_string(),
            "BATTERY_lag1".to_string(),
            "BATTERY_lag3".to_string(),
        ]
    );
}

#[test]
fn test_excluded_policy_keeps_only_own_lags() {
    let table = lagged_table();

    let features =
        SelectionBuilder::new(CrossCategoryFeatures::Excluded).feature_columns(&table, "THEFT");

    assert_eq!(features, vec!["THEFT_lag1".to_string(), "THEFT_lag3".to_string()]);
}

#[rstest]
#[case::included(CrossCategoryFeatures::Included, 1)]
#[case::excluded(CrossCategoryFeatures::Excluded, 3)]
fn test_incomplete_rows_are_dropped(#[case] policy: CrossCategoryFeatures, #[case] expected: usize) {
    let table = lagged_table();

    let dataset = SelectionBuilder::new(policy)
        .build(&table, "Rogers Park", "THEFT")
        .unwrap();

    // Months 1-3 lack lag-3 values; with cross-category features the missing
    // May battery count also removes May (raw) and June (battery lag-1).
    assert_eq!(dataset.len(), expected);
    assert!(dataset.len() <= table.rows_for_name("Rogers Park").len());
    for row in &dataset.features {
        assert_eq!(row.len(), dataset.feature_names.len());
        assert!(row.iter().all(|v| v.is_finite()));
    }
}

#[test]
fn test_dataset_is_chronological_and_targets_align() {
    let table = lagged_table();

    let dataset = SelectionBuilder::new(CrossCategoryFeatures::Excluded)
        .build(&table, "West Ridge", "THEFT")
        .unwrap();

    assert_eq!(
        dataset.periods,
        vec![
            Period::new(2024, 4).unwrap(),
            Period::new(2024, 5).unwrap(),
            Period::new(2024, 6).unwrap(),
        ]
    );
    assert_eq!(dataset.targets, vec![5.0, 6.0, 7.0]);
    assert_eq!(dataset.latest_features(), Some(&[6.0, 4.0][..]));
}

#[test]
fn test_empty_selection_signals_insufficient_data() {
    let table = lagged_table();

    let result = SelectionBuilder::default().build(&table, "Uptown", "THEFT");

    assert!(matches!(result, Err(ForecastError::InsufficientData(_))));
}

#[test]
fn test_unknown_target_is_reported() {
    let table = lagged_table();

    let result = SelectionBuilder::default().build(&table, "Rogers Park", "ARSON");

    assert!(matches!(result, Err(ForecastError::MissingColumn(_))));
}

#[test]
fn test_trend_keeps_missing_months() {
    let table = lagged_table();

    let series = trend(&table, "Rogers Park", "BATTERY").unwrap();

    assert_eq!(series.points.len(), 6);
    assert_eq!(series.points[4].value, None);
    assert_eq!(series.observed_values(), vec![0.0, 1.0, 2.0, 3.0, 5.0]);
}

#[test]
fn test_trend_for_unknown_area() {
    let table = lagged_table();

    assert!(matches!(
        trend(&table, "Atlantis", "THEFT"),
        Err(ForecastError::UnknownArea(_))
    ));
}
