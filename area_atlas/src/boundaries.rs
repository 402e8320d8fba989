//! Community-area boundary documents
//!
//! A boundary document is a GeoJSON `FeatureCollection` whose features carry
//! an area number and a community name in their `properties`. The raw JSON is
//! kept so map outputs can be bound back onto the original geometry.

use crate::{AtlasError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Names of the feature properties holding the area code and display name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyKeys {
    /// Property holding the integer area code (number or numeric string)
    pub id_property: String,
    /// Property holding the community display name
    pub name_property: String,
}

impl Default for PropertyKeys {
    fn default() -> Self {
        Self {
            id_property: "area_num_1".to_string(),
            name_property: "community".to_string(),
        }
    }
}

/// Code and name extracted from one boundary feature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryFeature {
    /// Integer area code
    pub code: i64,
    /// Community display name
    pub name: String,
}

/// Parsed boundary document
#[derive(Debug, Clone)]
pub struct BoundaryDocument {
    raw: Value,
    keys: PropertyKeys,
    features: Vec<BoundaryFeature>,
}

impl BoundaryDocument {
    /// Parse a document from raw bytes
    pub fn from_slice(bytes: &[u8], keys: &PropertyKeys) -> Result<Self> {
        let raw: Value = serde_json::from_slice(bytes)?;
        Self::from_value(raw, keys)
    }

    /// Parse a document from an already decoded JSON value.
    ///
    /// Every feature must expose both configured properties; a document with
    /// no features at all is rejected rather than producing an empty map.
    pub fn from_value(raw: Value, keys: &PropertyKeys) -> Result<Self> {
        let entries = raw
            .get("features")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                AtlasError::MalformedDocument("document has no `features` array".to_string())
            })?;

        if entries.is_empty() {
            return Err(AtlasError::MalformedDocument(
                "document contains no features".to_string(),
            ));
        }

        let mut features = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            let properties = entry
                .get("properties")
                .and_then(Value::as_object)
                .ok_or_else(|| {
                    AtlasError::MalformedDocument(format!("feature {} has no properties", index))
                })?;

            let code = properties
                .get(&keys.id_property)
                .and_then(parse_code)
                .ok_or_else(|| {
                    AtlasError::MalformedDocument(format!(
                        "feature {} has no integer `{}` property",
                        index, keys.id_property
                    ))
                })?;

            let name = properties
                .get(&keys.name_property)
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    AtlasError::MalformedDocument(format!(
                        "feature {} has no string `{}` property",
                        index, keys.name_property
                    ))
                })?;

            features.push(BoundaryFeature {
                code,
                name: name.to_string(),
            });
        }

        Ok(Self {
            raw,
            keys: keys.clone(),
            features,
        })
    }

    /// Extracted code/name pairs, in document order
    pub fn features(&self) -> &[BoundaryFeature] {
        &self.features
    }

    /// The property keys this document was parsed with
    pub fn keys(&self) -> &PropertyKeys {
        &self.keys
    }

    /// The original JSON document
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Whether some feature carries the given display name
    pub fn contains_name(&self, name: &str) -> bool {
        self.features.iter().any(|feature| feature.name == name)
    }

    /// Number of features in the document
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether the document has no features
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

fn parse_code(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    }
}
