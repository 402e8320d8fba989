use area_atlas::AreaNameResolver;
use crime_forecast::data::{CrimeTable, Period, TableSchema};
use crime_forecast::lags::LagFeatureBuilder;
use crime_forecast::maps::ChoroplethData;
use crime_forecast::models::RandomForestRegressor;
use crime_forecast::predict::{AreaLevelPredictor, PointPredictor};
use crime_forecast::selection::{CrossCategoryFeatures, SelectionBuilder};
use crime_forecast::ForecastError;
use polars::prelude::*;
use pretty_assertions::assert_eq;

/// Builds a named table from (area, month, THEFT, BATTERY) rows in 2024
fn named_table(rows: &[(i64, i64, Option<f64>, Option<f64>)]) -> CrimeTable {
    let df = DataFrame::new(vec![
        Series::new(
            "Community Area",
            rows.iter().map(|r| r.0).collect::<Vec<i64>>(),
        ),
        Series::new("Year", vec![2024i64; rows.len()]),
        Series::new("Month", rows.iter().map(|r| r.1).collect::<Vec<i64>>()),
        Series::new("THEFT", rows.iter().map(|r| r.2).collect::<Vec<Option<f64>>>()),
        Series::new("BATTERY", rows.iter().map(|r| r.3).collect::<Vec<Option<f64>>>()),
    ])
    .unwrap();

    CrimeTable::new(df, TableSchema::default())
        .unwrap()
        .with_area_names(&AreaNameResolver::chicago())
        .unwrap()
}

fn sample_table() -> CrimeTable {
    let mut rows = Vec::new();
    for month in 1..=8 {
        let m = month as f64;
        rows.push((1, month, Some(4.0 + m), Some(10.0 - m)));
        rows.push((2, month, Some(2.0 * m), Some(m)));
    }
    // Uptown only has two months, so it never has a lag-3 value
    rows.push((3, 1, Some(1.0), Some(1.0)));
    rows.push((3, 2, Some(2.0), Some(1.0)));
    // Area 99 has no name anywhere
    rows.push((99, 1, Some(50.0), Some(5.0)));
    named_table(&rows)
}

fn lagged(table: &CrimeTable) -> CrimeTable {
    LagFeatureBuilder::default().build(table).unwrap()
}

#[test]
fn test_point_prediction_is_deterministic() {
    let table = lagged(&sample_table());
    let dataset = SelectionBuilder::default()
        .build(&table, "Rogers Park", "THEFT")
        .unwrap();
    let predictor = PointPredictor::default();

    let first = predictor.predict(&dataset).unwrap();
    let second = predictor.predict(&dataset).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.period, Period::new(2024, 9).unwrap());
    assert_eq!(first.training_rows, 5);
}

#[test]
fn test_point_prediction_of_constant_series() {
    let rows: Vec<_> = (1..=6).map(|month| (1, month, Some(4.0), Some(1.0))).collect();
    let table = lagged(&named_table(&rows));
    let dataset = SelectionBuilder::new(CrossCategoryFeatures::Excluded)
        .build(&table, "Rogers Park", "THEFT")
        .unwrap();

    let prediction = PointPredictor::default().predict(&dataset).unwrap();

    assert_eq!(prediction.value, 4.0);
    assert_eq!(prediction.rounded, 4);
    assert_eq!(prediction.area, "Rogers Park");
    assert_eq!(prediction.category, "THEFT");
}

#[test]
fn test_point_prediction_stays_within_observed_targets() {
    let table = lagged(&sample_table());
    let dataset = SelectionBuilder::default()
        .build(&table, "West Ridge", "THEFT")
        .unwrap();

    let prediction = PointPredictor::new(RandomForestRegressor::new(50, 3).unwrap())
        .predict(&dataset)
        .unwrap();

    let min = dataset.targets.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = dataset.targets.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    assert!(prediction.value >= min && prediction.value <= max);
}

#[test]
fn test_area_level_prediction_covers_every_named_area() {
    let table = lagged(&sample_table());

    let result = AreaLevelPredictor::default().predict(&table, "THEFT").unwrap();

    let areas: Vec<&str> = result.predictions.iter().map(|p| p.area.as_str()).collect();
    assert_eq!(areas, vec!["Rogers Park", "Uptown", "West Ridge"]);
    assert_eq!(result.category, "THEFT");
    // Rows with both lags: months 4-8 for areas 1 and 2
    assert_eq!(result.training_rows, 10);

    let uptown = &result.predictions[1];
    assert_eq!(uptown.latest_period, Period::new(2024, 2).unwrap());
    assert!(uptown.value.is_finite());
}

#[test]
fn test_area_level_prediction_of_constant_series() {
    let mut rows = Vec::new();
    for month in 1..=5 {
        rows.push((1, month, Some(6.0), None));
        rows.push((5, month, Some(6.0), None));
    }
    let table = lagged(&named_table(&rows));

    let result = AreaLevelPredictor::default().predict(&table, "THEFT").unwrap();

    assert_eq!(result.predictions.len(), 2);
    for prediction in &result.predictions {
        assert_eq!(prediction.value, 6.0);
        assert_eq!(prediction.rounded, 6);
    }
}

#[test]
fn test_area_level_prediction_is_deterministic() {
    let table = lagged(&sample_table());
    let predictor = AreaLevelPredictor::default();

    assert_eq!(
        predictor.predict(&table, "BATTERY").unwrap(),
        predictor.predict(&table, "BATTERY").unwrap()
    );
}

#[test]
fn test_mismatched_category_case_has_no_lag_features() {
    let table = lagged(&sample_table());

    match AreaLevelPredictor::default().predict(&table, "theft") {
        Err(ForecastError::NoLagFeatures(category)) => assert_eq!(category, "theft"),
        other => panic!("Expected NoLagFeatures, got {:?}", other),
    }
}

#[test]
fn test_unlagged_category_skips_prediction_but_observed_map_renders() {
    // Lags were never built for this table
    let table = sample_table();

    let predicted = AreaLevelPredictor::default().predict(&table, "THEFT");
    let observed = ChoroplethData::observed(&table, "THEFT").unwrap();

    assert!(matches!(predicted, Err(ForecastError::NoLagFeatures(_))));
    assert_eq!(observed.len(), 3);
}

#[test]
fn test_short_series_leave_an_empty_training_set() {
    let rows: Vec<_> = (1..=3)
        .flat_map(|month| vec![(1, month, Some(1.0), None), (2, month, Some(2.0), None)])
        .collect();
    let table = lagged(&named_table(&rows));

    let result = AreaLevelPredictor::default().predict(&table, "THEFT");

    assert!(matches!(result, Err(ForecastError::EmptyTrainingSet(_))));
}

#[test]
fn test_custom_lags_require_matching_columns() {
    let table = lagged(&sample_table());
    let predictor = AreaLevelPredictor::default().with_lags(vec![1, 2]).unwrap();

    assert!(matches!(
        predictor.predict(&table, "THEFT"),
        Err(ForecastError::NoLagFeatures(_))
    ));
}
