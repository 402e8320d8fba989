//! Monthly crime-count tables

use crate::error::{ForecastError, Result};
use area_atlas::AreaNameResolver;
use chrono::{Datelike, Months, NaiveDate};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

/// Column names identifying the area and the month of each observation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSchema {
    /// Integer community-area code
    pub area_column: String,
    /// Calendar year
    pub year_column: String,
    /// Calendar month (1-12)
    pub month_column: String,
    /// Derived display-name column added by name resolution
    pub name_column: String,
}

impl Default for TableSchema {
    fn default() -> Self {
        Self {
            area_column: "Community Area".to_string(),
            year_column: "Year".to_string(),
            month_column: "Month".to_string(),
            name_column: "Community Area Name".to_string(),
        }
    }
}

impl TableSchema {
    /// Whether a column identifies the row rather than holding a count
    pub fn is_key_column(&self, name: &str) -> bool {
        name == self.area_column
            || name == self.year_column
            || name == self.month_column
            || name == self.name_column
    }
}

/// A calendar month, ordered by year then month
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    /// Calendar year
    pub year: i32,
    /// Calendar month (1-12)
    pub month: u32,
}

impl Period {
    /// Create a period, validating the month
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(ForecastError::DataError(format!(
                "Month must be between 1 and 12, got {}",
                month
            )));
        }
        Ok(Self { year, month })
    }

    /// The following calendar month
    pub fn next(&self) -> Result<Self> {
        let next = NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .and_then(|date| date.checked_add_months(Months::new(1)))
            .ok_or_else(|| {
                ForecastError::DataError(format!("No month follows {}", self))
            })?;

        Ok(Self {
            year: next.year(),
            month: next.month(),
        })
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Returns true for derived lag columns such as `THEFT_lag3`
pub fn is_lag_column(name: &str) -> bool {
    match name.rsplit_once("_lag") {
        Some((base, digits)) => {
            !base.is_empty() && !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    }
}

/// Data loader for monthly crime-count tables
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load a table from a CSV file using the default column names
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<CrimeTable> {
        Self::from_csv_with_schema(path, TableSchema::default())
    }

    /// Load a table from a CSV file
    pub fn from_csv_with_schema<P: AsRef<Path>>(path: P, schema: TableSchema) -> Result<CrimeTable> {
        let file = File::open(path.as_ref())?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        info!(
            "Loaded {} rows from {}",
            df.height(),
            path.as_ref().display()
        );
        CrimeTable::new(df, schema)
    }

    /// Load a table from a Parquet file
    pub fn from_parquet<P: AsRef<Path>>(path: P, schema: TableSchema) -> Result<CrimeTable> {
        let file = File::open(path.as_ref())?;
        let df = ParquetReader::new(file).finish()?;

        info!(
            "Loaded {} rows from {}",
            df.height(),
            path.as_ref().display()
        );
        CrimeTable::new(df, schema)
    }

    /// Load a table, choosing the reader from the file extension
    pub fn from_path<P: AsRef<Path>>(path: P, schema: TableSchema) -> Result<CrimeTable> {
        let is_parquet = path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("parquet") || ext.eq_ignore_ascii_case("pq"))
            .unwrap_or(false);

        if is_parquet {
            Self::from_parquet(path, schema)
        } else {
            Self::from_csv_with_schema(path, schema)
        }
    }

    /// Create a table from an existing DataFrame
    pub fn from_dataframe(df: DataFrame) -> Result<CrimeTable> {
        CrimeTable::new(df, TableSchema::default())
    }
}

/// Monthly crime counts per community area.
///
/// Area codes and periods are validated and cached when the table is built;
/// derived columns (lags, display names) are added by returning new tables.
#[derive(Debug, Clone)]
pub struct CrimeTable {
    df: DataFrame,
    schema: TableSchema,
    categories: Vec<String>,
    areas: Vec<i64>,
    periods: Vec<Period>,
    names: Option<Vec<Option<String>>>,
}

impl CrimeTable {
    /// Validate a DataFrame and discover its crime categories.
    ///
    /// Every row needs an area code, a year and a month, and each
    /// (area, year, month) may appear only once.
    pub fn new(df: DataFrame, schema: TableSchema) -> Result<Self> {
        let areas = required_integers(&df, &schema.area_column)?;
        let years = required_integers(&df, &schema.year_column)?;
        let months = required_integers(&df, &schema.month_column)?;

        let mut periods = Vec::with_capacity(years.len());
        for (row, (year, month)) in years.iter().zip(months.iter()).enumerate() {
            let year = i32::try_from(*year).map_err(|_| {
                ForecastError::DataError(format!("Row {}: year {} out of range", row, year))
            })?;
            let month = u32::try_from(*month).map_err(|_| {
                ForecastError::DataError(format!("Row {}: month {} out of range", row, month))
            })?;
            periods.push(Period::new(year, month)?);
        }

        let mut seen = HashSet::with_capacity(areas.len());
        for (area, period) in areas.iter().zip(periods.iter()) {
            if !seen.insert((*area, *period)) {
                return Err(ForecastError::DataError(format!(
                    "Duplicate observation for area {} in {}",
                    area, period
                )));
            }
        }

        let df = numeric_categories(df, &schema)?;
        let categories: Vec<String> = df
            .get_columns()
            .iter()
            .filter(|series| series.dtype().is_numeric())
            .map(|series| series.name().to_string())
            .filter(|name| !schema.is_key_column(name) && !is_lag_column(name))
            .collect();

        if categories.is_empty() {
            return Err(ForecastError::DataError(
                "No crime category columns found in data".to_string(),
            ));
        }

        debug!(
            "Discovered {} categories across {} rows",
            categories.len(),
            df.height()
        );

        Ok(Self {
            df,
            schema,
            categories,
            areas,
            periods,
            names: None,
        })
    }

    /// Get the DataFrame
    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    /// Get the column naming scheme
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Crime categories discovered at load time, in schema order
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Area code of every row
    pub fn area_codes(&self) -> &[i64] {
        &self.areas
    }

    /// Period of every row
    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// Get the number of rows
    pub fn len(&self) -> usize {
        self.df.height()
    }

    /// All column names, in schema order
    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    /// Whether a column with exactly this name exists
    pub fn has_column(&self, name: &str) -> bool {
        self.df.get_column_names().contains(&name)
    }

    /// Numeric columns other than the key columns (categories plus derived lags)
    pub fn value_columns(&self) -> Vec<String> {
        self.df
            .get_columns()
            .iter()
            .filter(|series| series.dtype().is_numeric())
            .map(|series| series.name().to_string())
            .filter(|name| !self.schema.is_key_column(name))
            .collect()
    }

    /// Read a numeric column as optional floats; nulls stay missing
    pub fn column_values(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let series = self
            .df
            .column(name)
            .map_err(|_| ForecastError::MissingColumn(name.to_string()))?;

        if !series.dtype().is_numeric() {
            return Err(ForecastError::DataError(format!(
                "Column '{}' is not numeric",
                name
            )));
        }

        let casted = series.cast(&DataType::Float64)?;
        let values = casted.f64()?.into_iter().collect();
        Ok(values)
    }

    /// Return a copy of the table with a numeric column added (or replaced)
    pub fn with_column(&self, name: &str, values: Vec<Option<f64>>) -> Result<Self> {
        if values.len() != self.len() {
            return Err(ForecastError::DataError(format!(
                "Column '{}' has {} values but the table has {} rows",
                name,
                values.len(),
                self.len()
            )));
        }

        let mut table = self.clone();
        table.df.with_column(Series::new(name, values))?;
        Ok(table)
    }

    /// Return a copy of the table with a display-name column resolved from area codes.
    ///
    /// The area code column is left untouched; codes the resolver does not
    /// know get a null name.
    pub fn with_area_names(&self, resolver: &AreaNameResolver) -> Result<Self> {
        let names: Vec<Option<String>> = self
            .areas
            .iter()
            .map(|code| resolver.resolve(*code).map(str::to_string))
            .collect();

        let mut table = self.clone();
        table
            .df
            .with_column(Series::new(self.schema.name_column.as_str(), names.clone()))?;
        table.names = Some(names);
        Ok(table)
    }

    /// Display name of every row, if names have been resolved
    pub fn area_names(&self) -> Option<&[Option<String>]> {
        self.names.as_deref()
    }

    /// Display name of one row
    pub fn area_name(&self, row: usize) -> Option<&str> {
        self.names
            .as_ref()
            .and_then(|names| names.get(row))
            .and_then(|name| name.as_deref())
    }

    /// Distinct resolved area names, sorted alphabetically
    pub fn resolved_area_names(&self) -> Vec<String> {
        let names: BTreeSet<&str> = (0..self.len())
            .filter_map(|row| self.area_name(row))
            .collect();
        names.into_iter().map(str::to_string).collect()
    }

    /// Distinct area codes without a display name, ascending
    pub fn unresolved_area_codes(&self) -> Vec<i64> {
        let codes: BTreeSet<i64> = self
            .areas
            .iter()
            .enumerate()
            .filter(|(row, _)| self.area_name(*row).is_none())
            .map(|(_, code)| *code)
            .collect();
        codes.into_iter().collect()
    }

    /// Row indices of each area code, each list in chronological order
    pub fn rows_by_area(&self) -> BTreeMap<i64, Vec<usize>> {
        let mut groups: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for (row, code) in self.areas.iter().enumerate() {
            groups.entry(*code).or_default().push(row);
        }
        for rows in groups.values_mut() {
            self.sort_chronologically(rows);
        }
        groups
    }

    /// Row indices of each resolved area name, each list in chronological order
    pub fn rows_by_name(&self) -> BTreeMap<String, Vec<usize>> {
        let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for row in 0..self.len() {
            if let Some(name) = self.area_name(row) {
                groups.entry(name.to_string()).or_default().push(row);
            }
        }
        for rows in groups.values_mut() {
            self.sort_chronologically(rows);
        }
        groups
    }

    /// Row indices for one area name in chronological order
    pub fn rows_for_name(&self, name: &str) -> Vec<usize> {
        let mut rows: Vec<usize> = (0..self.len())
            .filter(|row| self.area_name(*row) == Some(name))
            .collect();
        self.sort_chronologically(&mut rows);
        rows
    }

    fn sort_chronologically(&self, rows: &mut [usize]) {
        rows.sort_by_key(|row| self.periods[*row]);
    }
}

/// Cast text-typed count columns to floats.
///
/// A column whose cells are all empty is inferred as text by the CSV reader;
/// it is still a category, just one with no data. Columns holding real text
/// are left alone and never become categories.
fn numeric_categories(mut df: DataFrame, schema: &TableSchema) -> Result<DataFrame> {
    let candidates: Vec<String> = df
        .get_columns()
        .iter()
        .filter(|series| !series.dtype().is_numeric())
        .map(|series| series.name().to_string())
        .filter(|name| !schema.is_key_column(name) && !is_lag_column(name))
        .collect();

    for name in candidates {
        let series = df.column(&name)?;
        let casted = series.cast(&DataType::Float64)?;
        if casted.null_count() == series.null_count() {
            debug!("Column '{}' read as {}, using it as counts", name, series.dtype());
            df.with_column(casted)?;
        } else {
            debug!("Column '{}' is not numeric and is not a category", name);
        }
    }
    Ok(df)
}

fn required_integers(df: &DataFrame, name: &str) -> Result<Vec<i64>> {
    let series = df
        .column(name)
        .map_err(|_| ForecastError::MissingColumn(name.to_string()))?;

    let casted = series.cast(&DataType::Int64)?;
    casted
        .i64()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            value.ok_or_else(|| {
                ForecastError::DataError(format!("Row {} has no value in column '{}'", row, name))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lag_column_detection() {
        assert!(is_lag_column("THEFT_lag1"));
        assert!(is_lag_column("CRIMINAL DAMAGE_lag12"));
        assert!(!is_lag_column("THEFT"));
        assert!(!is_lag_column("THEFT_lag"));
        assert!(!is_lag_column("_lag1"));
        assert!(!is_lag_column("THEFT_lagged"));
    }

    #[test]
    fn test_period_rolls_over_year() {
        let december = Period::new(2023, 12).unwrap();
        assert_eq!(december.next().unwrap(), Period::new(2024, 1).unwrap());
        assert_eq!(Period::new(2024, 2).unwrap().next().unwrap().month, 3);
        assert_eq!(december.to_string(), "2023-12");
    }

    #[test]
    fn test_period_rejects_invalid_month() {
        assert!(Period::new(2024, 0).is_err());
        assert!(Period::new(2024, 13).is_err());
    }

    #[test]
    fn test_period_ordering() {
        let earlier = Period::new(2023, 11).unwrap();
        let later = Period::new(2024, 1).unwrap();
        assert!(earlier < later);
    }
}
