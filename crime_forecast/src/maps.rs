//! Choropleth map data
//!
//! Values are keyed by resolved area name; rows whose area code has no name
//! never reach a map. Binding to a boundary document writes each value into
//! the matching feature's `properties.value` so any GeoJSON renderer can
//! colour the areas.

use crate::data::CrimeTable;
use crate::error::{ForecastError, Result};
use crate::predict::AreaPredictions;
use area_atlas::BoundaryDocument;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::io::Write;
use tracing::warn;

/// Property written into each bound boundary feature
pub const VALUE_PROPERTY: &str = "value";

/// Which map a set of values belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MapKind {
    /// Summed historical counts
    Observed,
    /// Next-month predictions
    Predicted,
}

/// Value shown for one area
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaValue {
    /// Area name, matching the boundary name property
    pub area: String,
    /// Value used to colour the area
    pub value: f64,
}

/// Values for one choropleth, sorted by area name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoroplethData {
    /// Observed or predicted
    pub kind: MapKind,
    /// Column the values come from
    pub category: String,
    /// One row per area
    pub rows: Vec<AreaValue>,
}

impl ChoroplethData {
    /// Sum every month of `column` per resolved area name.
    ///
    /// Missing cells are skipped, so an area with no data at all sums to zero.
    pub fn observed(table: &CrimeTable, column: &str) -> Result<Self> {
        if table.area_names().is_none() {
            return Err(ForecastError::DataError(
                "Area names have not been resolved".to_string(),
            ));
        }

        let values = table.column_values(column)?;
        let rows = table
            .rows_by_name()
            .into_iter()
            .map(|(area, rows)| AreaValue {
                area,
                value: rows.iter().filter_map(|row| values[*row]).sum(),
            })
            .collect();

        Ok(Self {
            kind: MapKind::Observed,
            category: column.to_string(),
            rows,
        })
    }

    /// Map rows from per-area predictions
    pub fn predicted(predictions: &AreaPredictions) -> Self {
        Self {
            kind: MapKind::Predicted,
            category: predictions.category.clone(),
            rows: predictions
                .predictions
                .iter()
                .map(|prediction| AreaValue {
                    area: prediction.area.clone(),
                    value: prediction.value,
                })
                .collect(),
        }
    }

    /// Value for one area
    pub fn value_for(&self, area: &str) -> Option<f64> {
        self.rows
            .iter()
            .find(|row| row.area == area)
            .map(|row| row.value)
    }

    /// Number of areas on the map
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the map has no areas
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write `area,<category>` rows as CSV
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(["area", self.category.as_str()])?;
        for row in &self.rows {
            csv_writer.write_record([row.area.clone(), row.value.to_string()])?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Attach the values to the boundary features they describe
    pub fn bind(&self, document: &BoundaryDocument) -> Result<ChoroplethMap> {
        let lookup: HashMap<&str, f64> = self
            .rows
            .iter()
            .map(|row| (row.area.as_str(), row.value))
            .collect();
        let name_property = &document.keys().name_property;

        let mut geojson = document.raw().clone();
        let features = geojson
            .get_mut("features")
            .and_then(Value::as_array_mut)
            .ok_or_else(|| {
                ForecastError::DataError("Boundary document has no features".to_string())
            })?;

        for feature in features.iter_mut() {
            let Some(properties) = feature.get_mut("properties").and_then(Value::as_object_mut)
            else {
                continue;
            };
            let value = properties
                .get(name_property)
                .and_then(Value::as_str)
                .and_then(|name| lookup.get(name).copied());
            properties.insert(
                VALUE_PROPERTY.to_string(),
                value.map_or(Value::Null, Value::from),
            );
        }

        let unmatched: Vec<String> = self
            .rows
            .iter()
            .filter(|row| !document.contains_name(&row.area))
            .map(|row| row.area.clone())
            .collect();
        if !unmatched.is_empty() {
            warn!(
                "{} map rows have no boundary feature: {}",
                unmatched.len(),
                unmatched.join(", ")
            );
        }

        Ok(ChoroplethMap {
            data: self.clone(),
            geojson,
            unmatched,
        })
    }
}

/// Map values joined onto boundary geometry
#[derive(Debug, Clone)]
pub struct ChoroplethMap {
    data: ChoroplethData,
    geojson: Value,
    unmatched: Vec<String>,
}

impl ChoroplethMap {
    /// The underlying values
    pub fn data(&self) -> &ChoroplethData {
        &self.data
    }

    /// Boundary document with `properties.value` filled in
    pub fn geojson(&self) -> &Value {
        &self.geojson
    }

    /// Areas with a value but no boundary feature
    pub fn unmatched(&self) -> &[String] {
        &self.unmatched
    }

    /// Serialize the bound document as JSON text
    pub fn to_geojson_string(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.geojson)?)
    }
}
