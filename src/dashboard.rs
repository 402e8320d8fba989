//! Dashboard session
//!
//! A [`Dashboard`] holds the prepared table (names resolved, lags added) and
//! the boundary reference data. Every output is computed on request, and each
//! output reports its own failure without touching the others.

use crate::config::{DashboardConfig, UnresolvedPolicy};
use crate::error::{DashboardError, Result};
use crate::report::{DashboardReport, ReportRequest};
use area_atlas::{AreaNameResolver, BoundaryCache, BoundaryDocument};
use crime_forecast::{
    trend, AreaLevelPredictor, ChoroplethData, ChoroplethMap, CrimeTable, DataLoader,
    PointPrediction, PointPredictor, SelectionBuilder, TrendSeries,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Boundary data as far as the session could get it
#[derive(Debug, Clone)]
pub enum ReferenceData {
    /// A parsed boundary document
    Boundaries(Arc<BoundaryDocument>),
    /// No usable document, with the reason
    Unavailable(String),
}

impl ReferenceData {
    /// Resolve reference data from the configured source, going through `cache`.
    ///
    /// Failures are logged and kept as [`ReferenceData::Unavailable`]; they
    /// only matter once a map is requested.
    pub fn from_config(config: &DashboardConfig, cache: &mut BoundaryCache) -> Self {
        let Some(source) = config.boundary_source() else {
            return Self::Unavailable("no boundary source configured".to_string());
        };

        match cache.get_or_fetch(&source, &config.boundaries.keys) {
            Ok(document) => {
                info!("Loaded {} boundary features from {}", document.len(), source);
                Self::Boundaries(document)
            }
            Err(err) => {
                warn!("Boundary data unavailable: {}", err);
                Self::Unavailable(err.to_string())
            }
        }
    }

    /// The boundary document, if one was loaded
    pub fn document(&self) -> Option<&BoundaryDocument> {
        match self {
            Self::Boundaries(document) => Some(document.as_ref()),
            Self::Unavailable(_) => None,
        }
    }
}

/// Prepared data plus the predictors configured for it
#[derive(Debug, Clone)]
pub struct Dashboard {
    table: CrimeTable,
    reference: ReferenceData,
    selection: SelectionBuilder,
    point: PointPredictor,
    area_level: AreaLevelPredictor,
    unresolved_policy: UnresolvedPolicy,
    warnings: Vec<String>,
}

impl Dashboard {
    /// Load the configured table and boundary data
    pub fn open(config: &DashboardConfig, cache: &mut BoundaryCache) -> Result<Self> {
        let path = config
            .data
            .path
            .as_ref()
            .ok_or(DashboardError::MissingDataPath)?;
        let table = DataLoader::from_path(path, config.data.schema.clone())?;
        info!(
            "Loaded {} rows with {} categories from {}",
            table.len(),
            table.categories().len(),
            path.display()
        );

        let reference = ReferenceData::from_config(config, cache);
        Self::from_table(&table, reference, config)
    }

    /// Prepare an already loaded table.
    ///
    /// Area names come from the boundary document where it has them and from
    /// the built-in Chicago table otherwise. Lag columns are added for every
    /// category.
    pub fn from_table(
        raw: &CrimeTable,
        reference: ReferenceData,
        config: &DashboardConfig,
    ) -> Result<Self> {
        let mut resolver = AreaNameResolver::chicago();
        if let Some(document) = reference.document() {
            resolver = resolver.with_boundaries(document);
        }

        let named = raw.with_area_names(&resolver)?;
        let table = config.lag_builder()?.build(&named)?;

        let forest = config.forest()?;
        let area_level =
            AreaLevelPredictor::new(forest.clone()).with_lags(config.model.lags.clone())?;

        let mut dashboard = Self {
            table,
            reference,
            selection: SelectionBuilder::new(config.model.cross_category_features),
            point: PointPredictor::new(forest),
            area_level,
            unresolved_policy: config.report.unresolved_areas,
            warnings: Vec::new(),
        };
        dashboard.check_unresolved();
        Ok(dashboard)
    }

    fn check_unresolved(&mut self) {
        let codes = self.table.unresolved_area_codes();
        if codes.is_empty() {
            return;
        }

        let listed: Vec<String> = codes.iter().map(i64::to_string).collect();
        let message = format!(
            "{} area code(s) have no name and are left out: {}",
            codes.len(),
            listed.join(", ")
        );
        warn!("{}", message);
        if self.unresolved_policy == UnresolvedPolicy::Warn {
            self.warnings.push(message);
        }
    }

    /// The prepared table
    pub fn table(&self) -> &CrimeTable {
        &self.table
    }

    /// Boundary data in use
    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    /// Warnings meant for the user
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Resolved area names, alphabetically
    pub fn area_choices(&self) -> Vec<String> {
        self.table.resolved_area_names()
    }

    /// Categories available for the trend and point prediction
    pub fn category_choices(&self) -> Vec<String> {
        self.table.categories().to_vec()
    }

    /// Columns available for the maps, lag columns included
    pub fn map_category_choices(&self) -> Vec<String> {
        self.table.value_columns()
    }

    /// History of one category in one area
    pub fn trend(&self, area: &str, category: &str) -> Result<TrendSeries> {
        Ok(trend(&self.table, area, category)?)
    }

    /// Next-month prediction for one area and category
    pub fn point_prediction(&self, area: &str, category: &str) -> Result<PointPrediction> {
        let dataset = self.selection.build(&self.table, area, category)?;
        Ok(self.point.predict(&dataset)?)
    }

    /// Summed counts per area bound to the boundary document
    pub fn observed_map(&self, category: &str) -> Result<ChoroplethMap> {
        let document = self.boundaries()?;
        let data = ChoroplethData::observed(&self.table, category)?;
        Ok(data.bind(document)?)
    }

    /// Per-area predictions bound to the boundary document
    pub fn predicted_map(&self, category: &str) -> Result<ChoroplethMap> {
        let document = self.boundaries()?;
        let predictions = self.area_level.predict(&self.table, category)?;
        Ok(ChoroplethData::predicted(&predictions).bind(document)?)
    }

    fn boundaries(&self) -> Result<&BoundaryDocument> {
        match &self.reference {
            ReferenceData::Boundaries(document) => Ok(document.as_ref()),
            ReferenceData::Unavailable(reason) => {
                Err(DashboardError::ReferenceData(reason.clone()))
            }
        }
    }

    /// Compute every requested output independently
    pub fn report(&self, request: &ReportRequest) -> DashboardReport {
        let selection = request.area.as_deref().zip(request.category.as_deref());

        let trend = selection.map(|(area, category)| self.trend(area, category));
        let prediction = selection.map(|(area, category)| self.point_prediction(area, category));
        let observed_map = request
            .map_category
            .as_deref()
            .map(|category| self.observed_map(category));
        let predicted_map = request
            .predict_map_category
            .as_deref()
            .map(|category| self.predicted_map(category));

        for (output, result) in [
            ("trend", trend.as_ref().map(|r| r.as_ref().err())),
            ("prediction", prediction.as_ref().map(|r| r.as_ref().err())),
            ("observed map", observed_map.as_ref().map(|r| r.as_ref().err())),
            ("predicted map", predicted_map.as_ref().map(|r| r.as_ref().err())),
        ] {
            if let Some(Some(err)) = result {
                debug!("Skipped {}: {}", output, err);
            }
        }

        DashboardReport {
            request: request.clone(),
            trend,
            prediction,
            observed_map,
            predicted_map,
            warnings: self.warnings.clone(),
        }
    }
}
