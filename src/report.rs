//! Report rendering and export
//!
//! A [`DashboardReport`] carries one optional result per output. `None` means
//! the output was not requested; `Some(Err(_))` means it was requested and
//! could not be produced.

use crate::error::Result;
use crime_forecast::{ChoroplethMap, MapKind, PointPrediction, TrendSeries};
use std::fmt;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::info;

/// Which outputs to compute
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportRequest {
    /// Area for the trend and point prediction
    pub area: Option<String>,
    /// Category for the trend and point prediction
    pub category: Option<String>,
    /// Column for the observed map
    pub map_category: Option<String>,
    /// Category for the predicted map
    pub predict_map_category: Option<String>,
}

/// Outputs of one dashboard pass
#[derive(Debug)]
pub struct DashboardReport {
    /// What was asked for
    pub request: ReportRequest,
    /// Historical counts of the selection
    pub trend: Option<Result<TrendSeries>>,
    /// Next-month prediction of the selection
    pub prediction: Option<Result<PointPrediction>>,
    /// Summed counts per area
    pub observed_map: Option<Result<ChoroplethMap>>,
    /// Predicted counts per area
    pub predicted_map: Option<Result<ChoroplethMap>>,
    /// Warnings meant for the user
    pub warnings: Vec<String>,
}

impl DashboardReport {
    /// Whether any requested output failed
    pub fn has_failures(&self) -> bool {
        matches!(self.trend, Some(Err(_)))
            || matches!(self.prediction, Some(Err(_)))
            || matches!(self.observed_map, Some(Err(_)))
            || matches!(self.predicted_map, Some(Err(_)))
    }

    /// Write every rendered map to `dir` as GeoJSON and CSV.
    ///
    /// Returns the written paths. Maps that failed are skipped.
    pub fn export(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dir)?;

        let mut written = Vec::new();
        for map in [&self.observed_map, &self.predicted_map]
            .into_iter()
            .flatten()
            .filter_map(|result| result.as_ref().ok())
        {
            written.extend(export_map(map, dir)?);
        }

        info!("Exported {} files to {}", written.len(), dir.display());
        Ok(written)
    }
}

fn export_map(map: &ChoroplethMap, dir: &Path) -> Result<Vec<PathBuf>> {
    let stem = export_stem(map.data().kind, &map.data().category);

    let geojson_path = dir.join(format!("{stem}.geojson"));
    fs::write(&geojson_path, map.to_geojson_string()?)?;

    let csv_path = dir.join(format!("{stem}.csv"));
    let writer = BufWriter::new(File::create(&csv_path)?);
    map.data().write_csv(writer)?;

    Ok(vec![geojson_path, csv_path])
}

/// File stem for an exported map, e.g. `observed_MOTOR_VEHICLE_THEFT`
pub fn export_stem(kind: MapKind, category: &str) -> String {
    let prefix = match kind {
        MapKind::Observed => "observed",
        MapKind::Predicted => "predicted",
    };
    let cleaned: String = category
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{prefix}_{cleaned}")
}

impl fmt::Display for DashboardReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for warning in &self.warnings {
            writeln!(f, "warning: {warning}")?;
        }

        if let Some(trend) = &self.trend {
            match trend {
                Ok(series) => {
                    writeln!(f, "Historical {} counts in {}", series.category, series.area)?;
                    for point in &series.points {
                        match point.value {
                            Some(value) => writeln!(f, "  {}  {}", point.period, value)?,
                            None => writeln!(f, "  {}  -", point.period)?,
                        }
                    }
                }
                Err(err) => writeln!(f, "Trend unavailable: {err}")?,
            }
        }

        if let Some(prediction) = &self.prediction {
            match prediction {
                Ok(p) => writeln!(
                    f,
                    "Predicted {} in {} for {}: {}",
                    p.category, p.area, p.period, p.rounded
                )?,
                Err(err) => writeln!(f, "Prediction unavailable: {err}")?,
            }
        }

        if let Some(map) = &self.observed_map {
            write_map(f, "Observed", map)?;
        }
        if let Some(map) = &self.predicted_map {
            write_map(f, "Predicted", map)?;
        }
        Ok(())
    }
}

fn write_map(f: &mut fmt::Formatter<'_>, title: &str, map: &Result<ChoroplethMap>) -> fmt::Result {
    match map {
        Ok(map) => {
            let data = map.data();
            writeln!(f, "{} {} map ({} areas)", title, data.category, data.len())?;
            for row in &data.rows {
                writeln!(f, "  {:<28} {:.1}", row.area, row.value)?;
            }
            if !map.unmatched().is_empty() {
                writeln!(f, "  no boundary for: {}", map.unmatched().join(", "))?;
            }
            Ok(())
        }
        Err(err) => writeln!(f, "{title} map unavailable: {err}"),
    }
}
