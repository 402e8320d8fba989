//! # Crime Dashboard
//!
//! Ties the forecasting pipeline to boundary reference data and produces the
//! four dashboard outputs: an area's historical trend, its next-month
//! prediction, and observed and predicted choropleth maps.
//!
//! ## Example
//!
//! ```rust,no_run
//! use area_atlas::BoundaryCache;
//! use crime_dashboard::{Dashboard, DashboardConfig, ReportRequest};
//!
//! # fn main() -> crime_dashboard::Result<()> {
//! let config = DashboardConfig::load("dashboard.toml".as_ref())?;
//! let dashboard = Dashboard::open(&config, &mut BoundaryCache::new())?;
//!
//! let report = dashboard.report(&ReportRequest {
//!     area: Some("Uptown".to_string()),
//!     category: Some("THEFT".to_string()),
//!     map_category: Some("THEFT".to_string()),
//!     predict_map_category: Some("THEFT".to_string()),
//! });
//! print!("{report}");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dashboard;
pub mod error;
pub mod logging;
pub mod report;

pub use crate::config::{DashboardConfig, UnresolvedPolicy};
pub use crate::dashboard::{Dashboard, ReferenceData};
pub use crate::error::{DashboardError, Result};
pub use crate::report::{DashboardReport, ReportRequest};
