//! Fetching boundary documents from disk or over HTTP
//!
//! Boundary data does not change during a session, so each source is fetched
//! at most once and the parsed document is shared afterwards.

use crate::boundaries::{BoundaryDocument, PropertyKeys};
use crate::{AtlasError, Result};
use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::{debug, info};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Upper bound on a downloaded boundary document
pub const MAX_DOCUMENT_BYTES: usize = 64 * 1024 * 1024;

/// Location of a boundary document
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BoundarySource {
    /// Local file
    File(PathBuf),
    /// http(s) URL
    Url(String),
}

impl BoundarySource {
    /// Interpret a user-supplied location; anything with an http(s) scheme is a URL
    pub fn parse(location: &str) -> Self {
        let trimmed = location.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            BoundarySource::Url(trimmed.to_string())
        } else {
            BoundarySource::File(PathBuf::from(trimmed))
        }
    }

    /// Read the raw document bytes
    pub fn read_bytes(&self) -> Result<Vec<u8>> {
        match self {
            BoundarySource::File(path) => {
                std::fs::read(path).map_err(|err| AtlasError::FetchError {
                    source_name: self.to_string(),
                    reason: err.to_string(),
                })
            }
            BoundarySource::Url(url) => {
                let response = agent()
                    .get(url)
                    .call()
                    .map_err(|err| AtlasError::FetchError {
                        source_name: self.to_string(),
                        reason: err.to_string(),
                    })?;
                read_limited(response, MAX_DOCUMENT_BYTES).map_err(|err| AtlasError::FetchError {
                    source_name: self.to_string(),
                    reason: err.to_string(),
                })
            }
        }
    }

    /// Read and parse the document
    pub fn fetch(&self, keys: &PropertyKeys) -> Result<BoundaryDocument> {
        info!("Fetching boundary data from {}", self);
        let bytes = self.read_bytes()?;
        let document = BoundaryDocument::from_slice(&bytes, keys)?;
        debug!("Parsed {} boundary features from {}", document.len(), self);
        Ok(document)
    }
}

impl fmt::Display for BoundarySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundarySource::File(path) => write!(f, "{}", path.display()),
            BoundarySource::Url(url) => write!(f, "{}", url),
        }
    }
}

/// Process-lifetime cache of parsed boundary documents.
///
/// Entries are keyed by source location and property keys. Failed fetches are
/// not cached.
#[derive(Debug, Default)]
pub struct BoundaryCache {
    entries: HashMap<(BoundarySource, PropertyKeys), Arc<BoundaryDocument>>,
}

impl BoundaryCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached document for a source, fetching it on first use
    pub fn get_or_fetch(
        &mut self,
        source: &BoundarySource,
        keys: &PropertyKeys,
    ) -> Result<Arc<BoundaryDocument>> {
        let key = (source.clone(), keys.clone());
        if let Some(document) = self.entries.get(&key) {
            debug!("Boundary cache hit for {}", source);
            return Ok(Arc::clone(document));
        }

        let document = Arc::new(source.fetch(keys)?);
        self.entries.insert(key, Arc::clone(&document));
        Ok(document)
    }

    /// Number of cached documents
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been cached yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| {
        ureq::AgentBuilder::new()
            .timeout_connect(CONNECT_TIMEOUT)
            .timeout_read(READ_TIMEOUT)
            .build()
    })
}

fn read_limited(response: ureq::Response, max_bytes: usize) -> std::io::Result<Vec<u8>> {
    let mut limited = response.into_reader().take(max_bytes as u64 + 1);
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes)?;
    if bytes.len() > max_bytes {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("response exceeded {} bytes", max_bytes),
        ));
    }
    Ok(bytes)
}
