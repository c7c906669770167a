//! Region and feature sources backed by local GeoJSON files

use async_trait::async_trait;
use gridtopo_core::error::{GridError, Result};
use gridtopo_core::models::{Crs, Feature, FeatureKind, FeatureSet, Region};
use gridtopo_core::ports::{FeatureSource, RegionSource};
use gridtopo_geo::{crs_match, from_geo_geometry, intersects_region, to_geo_geometry, Reprojector};
use std::fs;
use std::path::{Path, PathBuf};

use crate::collection::{feature_geometry, feature_id, parse_collection, properties_to_tags};
use crate::gadm::{select_regions, DEFAULT_NAME_PROPERTY};

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| GridError::Collaborator {
        source_name: path.display().to_string(),
        reason: format!("Failed to read file: {}", e),
    })
}

/// Region boundaries from a GeoJSON file, selected like GADM downloads
pub struct GeoJsonRegionSource {
    path: PathBuf,
    name_property: String,
}

impl GeoJsonRegionSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), name_property: DEFAULT_NAME_PROPERTY.to_string() }
    }

    pub fn with_name_property(mut self, name_property: impl Into<String>) -> Self {
        self.name_property = name_property.into();
        self
    }
}

#[async_trait]
impl RegionSource for GeoJsonRegionSource {
    async fn regions(&self, names: &[String]) -> Result<Vec<Region>> {
        let content = read_file(&self.path)?;
        let (collection, crs) = parse_collection(&content, self.source_name())?;
        select_regions(&collection, &crs, names, &self.name_property)
    }

    fn source_name(&self) -> &str {
        "GeoJSON regions"
    }
}

/// Substations and generators from one GeoJSON file per kind.
///
/// Both files are read once on open. A query returns the features of the
/// requested kind whose geometry intersects the region.
pub struct GeoJsonFeatureSource {
    substations: FeatureSet,
    generators: FeatureSet,
}

impl GeoJsonFeatureSource {
    pub fn open(substations: impl AsRef<Path>, generators: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            substations: load_features(substations.as_ref(), FeatureKind::Substation)?,
            generators: load_features(generators.as_ref(), FeatureKind::Generator)?,
        })
    }

    pub fn from_sets(substations: FeatureSet, generators: FeatureSet) -> Self {
        Self { substations, generators }
    }

    fn set(&self, kind: FeatureKind) -> &FeatureSet {
        match kind {
            FeatureKind::Substation => &self.substations,
            FeatureKind::Generator => &self.generators,
        }
    }
}

#[async_trait]
impl FeatureSource for GeoJsonFeatureSource {
    async fn features(&self, region: &Region, kind: FeatureKind) -> Result<FeatureSet> {
        let set = self.set(kind);
        let region = region_in_crs(region, &set.crs)?;

        let features: Vec<Feature> = set
            .features
            .iter()
            .filter(|feature| intersects_region(&feature.geometry, &region))
            .cloned()
            .collect();

        Ok(FeatureSet::new(set.crs.clone(), features))
    }

    fn source_name(&self) -> &str {
        "GeoJSON features"
    }
}

/// Read every feature of a file; ids default to `<kind>/<index>`
pub fn load_features(path: &Path, kind: FeatureKind) -> Result<FeatureSet> {
    let content = read_file(path)?;
    let (collection, crs) = parse_collection(&content, &path.display().to_string())?;

    let mut features = Vec::with_capacity(collection.features.len());
    for (idx, feature) in collection.features.iter().enumerate() {
        let id = feature_id(feature).unwrap_or_else(|| format!("{}/{}", kind, idx));
        match feature_geometry(feature) {
            Some(geometry) => {
                features.push(Feature::new(id, geometry, properties_to_tags(feature.properties.as_ref())))
            }
            None => tracing::warn!(%id, path = %path.display(), "Skipping feature without geometry"),
        }
    }

    tracing::debug!(path = %path.display(), %kind, count = features.len(), crs = %crs, "Loaded features");
    Ok(FeatureSet::new(crs, features))
}

fn region_in_crs(region: &Region, crs: &Crs) -> Result<Region> {
    if crs_match(&region.crs, crs) {
        return Ok(region.clone());
    }

    let reprojector = Reprojector::new(&region.crs, crs)?;
    let projected = reprojector.reproject(&to_geo_geometry(&region.boundary))?;
    let boundary = from_geo_geometry(&projected).ok_or_else(|| GridError::InvalidGeometry {
        feature_id: region.name.clone(),
        reason: "Boundary is empty after reprojection".to_string(),
    })?;
    Ok(Region::new(region.name.clone(), boundary, crs.clone()))
}
