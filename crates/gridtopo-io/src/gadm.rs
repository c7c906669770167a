//! Administrative boundaries from a GADM GeoJSON download

use async_trait::async_trait;
use geojson::{FeatureCollection, JsonValue};
use gridtopo_core::config::DEFAULT_GADM_URL;
use gridtopo_core::error::{GridError, Result};
use gridtopo_core::models::{Crs, Region};
use gridtopo_core::ports::RegionSource;

use crate::collection::{feature_geometry, parse_collection};

/// Property holding the level-1 region name in GADM files
pub const DEFAULT_NAME_PROPERTY: &str = "NAME_1";

/// Region source downloading one GADM FeatureCollection
pub struct GadmRegionSource {
    /// URL of the GeoJSON document
    url: String,

    /// Property compared against requested names
    name_property: String,

    /// HTTP client
    client: reqwest::Client,
}

impl GadmRegionSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name_property: DEFAULT_NAME_PROPERTY.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Create with the German level-1 boundaries
    pub fn germany() -> Self {
        Self::new(DEFAULT_GADM_URL)
    }

    pub fn with_name_property(mut self, name_property: impl Into<String>) -> Self {
        self.name_property = name_property.into();
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn download(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.error(format!("Failed to connect to {}: {}", self.url, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(self.error(format!("GADM download failed ({}) for {}", status, self.url)));
        }

        response.text().await.map_err(|e| self.error(format!("Failed to read response: {}", e)))
    }

    fn error(&self, reason: String) -> GridError {
        GridError::Collaborator { source_name: self.source_name().to_string(), reason }
    }
}

#[async_trait]
impl RegionSource for GadmRegionSource {
    async fn regions(&self, names: &[String]) -> Result<Vec<Region>> {
        if names.is_empty() {
            return Err(GridError::NoRegions);
        }

        let content = self.download().await?;
        let (collection, crs) = parse_collection(&content, self.source_name())?;
        tracing::debug!(url = %self.url, features = collection.features.len(), "Downloaded GADM boundaries");

        select_regions(&collection, &crs, names, &self.name_property)
    }

    fn source_name(&self) -> &str {
        "GADM"
    }
}

/// Pick one boundary per requested name, in request order.
///
/// Names are compared exactly. A name without a matching polygon feature is
/// a `RegionNotFound` error.
pub fn select_regions(
    collection: &FeatureCollection,
    crs: &Crs,
    names: &[String],
    name_property: &str,
) -> Result<Vec<Region>> {
    if names.is_empty() {
        return Err(GridError::NoRegions);
    }

    names
        .iter()
        .map(|name| {
            let boundary = collection
                .features
                .iter()
                .filter(|feature| {
                    feature
                        .properties
                        .as_ref()
                        .and_then(|props| props.get(name_property))
                        .and_then(JsonValue::as_str)
                        == Some(name.as_str())
                })
                .find_map(feature_geometry)
                .filter(|geometry| geometry.is_areal())
                .ok_or_else(|| GridError::RegionNotFound { name: name.clone() })?;

            Ok(Region::new(name.clone(), boundary, crs.clone()))
        })
        .collect()
}
