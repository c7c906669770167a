use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::geometry::{Crs, Geometry};

/// Free-form tag mapping of a raw feature
pub type Tags = BTreeMap<String, String>;

/// Stable identifier of a raw feature, e.g. `way/4021733`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureId(pub String);

impl FeatureId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FeatureId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for FeatureId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// The two feature populations being associated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    Substation,
    Generator,
}

impl FeatureKind {
    /// Values of the `power` tag that select this kind
    pub fn power_values(&self) -> &'static [&'static str] {
        match self {
            FeatureKind::Substation => &["substation"],
            FeatureKind::Generator => &["generator", "plant"],
        }
    }

    /// Check whether a tag mapping belongs to this kind
    pub fn matches(&self, tags: &Tags) -> bool {
        tags.get("power")
            .map(|value| self.power_values().contains(&value.as_str()))
            .unwrap_or(false)
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureKind::Substation => f.write_str("substation"),
            FeatureKind::Generator => f.write_str("generator"),
        }
    }
}

/// Raw geospatial record as returned by a feature source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Stable identifier
    pub id: FeatureId,

    /// Geometry in the CRS of the enclosing [`FeatureSet`]
    pub geometry: Geometry,

    /// Region label; empty until the feature is attributed to a region
    pub region: String,

    pub tags: Tags,
}

impl Feature {
    pub fn new(id: impl Into<FeatureId>, geometry: Geometry, tags: Tags) -> Self {
        Self { id: id.into(), geometry, region: String::new(), tags }
    }

    /// Set the region label
    pub fn in_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Look up a tag value
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

/// Collection of features sharing one CRS
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureSet {
    pub crs: Crs,
    pub features: Vec<Feature>,
}

impl FeatureSet {
    pub fn new(crs: Crs, features: Vec<Feature>) -> Self {
        Self { crs, features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Administrative region boundary
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub name: String,

    /// Polygon or MultiPolygon boundary
    pub boundary: Geometry,

    pub crs: Crs,
}

impl Region {
    pub fn new(name: impl Into<String>, boundary: Geometry, crs: Crs) -> Self {
        Self { name: name.into(), boundary, crs }
    }
}
