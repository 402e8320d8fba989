use crime_forecast::data::{CrimeTable, Period, TableSchema};
use crime_forecast::lags::{lag_column_name, LagFeatureBuilder};
use polars::prelude::*;
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::collections::BTreeMap;

/// Areas 1 and 2 over four consecutive months, rows in the given order
fn scenario_table(order: &[usize]) -> CrimeTable {
    let rows: [(i64, i64, f64); 8] = [
        (1, 1, 5.0),
        (1, 2, 7.0),
        (1, 3, 9.0),
        (1, 4, 11.0),
        (2, 1, 2.0),
        (2, 2, 3.0),
        (2, 3, 4.0),
        (2, 4, 5.0),
    ];
    let picked: Vec<(i64, i64, f64)> = order.iter().map(|i| rows[*i]).collect();

    let df = DataFrame::new(vec![
        Series::new(
            "Community Area",
            picked.iter().map(|r| r.0).collect::<Vec<i64>>(),
        ),
        Series::new("Year", vec![2024i64; picked.len()]),
        Series::new("Month", picked.iter().map(|r| r.1).collect::<Vec<i64>>()),
        Series::new("THEFT", picked.iter().map(|r| r.2).collect::<Vec<f64>>()),
    ])
    .unwrap();

    CrimeTable::new(df, TableSchema::default()).unwrap()
}

/// Lag values keyed by (area, period) so tables with different row orders compare equal
fn lags_by_key(table: &CrimeTable) -> BTreeMap<(i64, Period), (Option<f64>, Option<f64>)> {
    let lag1 = table.column_values("THEFT_lag1").unwrap();
    let lag3 = table.column_values("THEFT_lag3").unwrap();
    (0..table.len())
        .map(|row| {
            (
                (table.area_codes()[row], table.periods()[row]),
                (lag1[row], lag3[row]),
            )
        })
        .collect()
}

fn lag_at(table: &CrimeTable, area: i64, month: u32) -> (Option<f64>, Option<f64>) {
    lags_by_key(table)[&(area, Period::new(2024, month).unwrap())]
}

#[test]
fn test_scenario_lag_values() {
    let table = scenario_table(&[0, 1, 2, 3, 4, 5, 6, 7]);

    let lagged = LagFeatureBuilder::default().build(&table).unwrap();

    assert_eq!(lag_at(&lagged, 1, 4), (Some(9.0), Some(5.0)));
    assert_eq!(lag_at(&lagged, 2, 4).1, Some(2.0));
}

#[test]
fn test_leading_rows_have_no_lag() {
    let lagged = LagFeatureBuilder::default()
        .build(&scenario_table(&[0, 1, 2, 3, 4, 5, 6, 7]))
        .unwrap();

    assert_eq!(lag_at(&lagged, 1, 1), (None, None));
    assert_eq!(lag_at(&lagged, 1, 2), (Some(5.0), None));
    assert_eq!(lag_at(&lagged, 1, 3), (Some(7.0), None));
}

#[test]
fn test_lags_never_cross_areas() {
    // Interleaved rows: area 2's first month directly follows area 1's last
    let lagged = LagFeatureBuilder::default()
        .build(&scenario_table(&[0, 1, 2, 3, 4, 5, 6, 7]))
        .unwrap();

    assert_eq!(lag_at(&lagged, 2, 1), (None, None));
    assert_eq!(lag_at(&lagged, 2, 2), (Some(2.0), None));
}

#[rstest]
#[case::reversed(&[7, 6, 5, 4, 3, 2, 1, 0])]
#[case::interleaved(&[0, 4, 1, 5, 2, 6, 3, 7])]
#[case::scrambled(&[5, 2, 7, 0, 3, 6, 1, 4])]
fn test_lags_do_not_depend_on_row_order(#[case] order: &[usize]) {
    let builder = LagFeatureBuilder::default();
    let expected = lags_by_key(&builder.build(&scenario_table(&[0, 1, 2, 3, 4, 5, 6, 7])).unwrap());

    let actual = lags_by_key(&builder.build(&scenario_table(order)).unwrap());

    assert_eq!(actual, expected);
}

#[test]
fn test_builder_adds_two_columns_per_category() {
    let table = scenario_table(&[0, 1, 2, 3, 4, 5, 6, 7]);
    let before = table.column_names().len();

    let lagged = LagFeatureBuilder::default().build(&table).unwrap();

    assert_eq!(lagged.column_names().len(), before + 2);
    assert!(lagged.has_column(&lag_column_name("THEFT", 1)));
    assert!(lagged.has_column(&lag_column_name("THEFT", 3)));
    assert_eq!(lagged.categories(), table.categories());
    assert_eq!(lagged.column_values("THEFT").unwrap(), table.column_values("THEFT").unwrap());
}

#[test]
fn test_lags_follow_calendar_across_years() {
    let df = DataFrame::new(vec![
        Series::new("Community Area", &[4i64, 4, 4]),
        Series::new("Year", &[2024i64, 2023, 2023]),
        Series::new("Month", &[1i64, 12, 11]),
        Series::new("THEFT", &[Some(30.0), None, Some(10.0)]),
    ])
    .unwrap();
    let table = CrimeTable::new(df, TableSchema::default()).unwrap();

    let lagged = LagFeatureBuilder::new(vec![1, 2]).unwrap().build(&table).unwrap();

    // Row 0 is January 2024: one month back is the missing December value
    assert_eq!(lagged.column_values("THEFT_lag1").unwrap()[0], None);
    assert_eq!(lagged.column_values("THEFT_lag2").unwrap()[0], Some(10.0));
    assert_eq!(lagged.column_values("THEFT_lag1").unwrap()[1], Some(10.0));
}
