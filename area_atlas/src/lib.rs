//! # Area Atlas
//!
//! Reference data for a city's community areas.
//! This crate resolves numeric area codes to display names, either from the
//! compiled-in table of Chicago community areas or from the `properties` of a
//! community-area boundary (GeoJSON) document, and fetches those documents
//! from disk or over HTTP exactly once per process.

use thiserror::Error;

pub mod boundaries;
pub mod names;
pub mod source;

pub use crate::boundaries::{BoundaryDocument, BoundaryFeature, PropertyKeys};
pub use crate::names::{AreaNameResolver, NameOrigin, CHICAGO_COMMUNITY_AREAS};
pub use crate::source::{BoundaryCache, BoundarySource};

/// Errors that can occur while loading or interpreting reference data
#[derive(Error, Debug)]
pub enum AtlasError {
    #[error("Failed to fetch boundary data from {source_name}: {reason}")]
    FetchError { source_name: String, reason: String },

    #[error("Malformed boundary document: {0}")]
    MalformedDocument(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type for reference data operations
pub type Result<T> = std::result::Result<T, AtlasError>;
