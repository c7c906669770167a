//! Geometry reduction: one representative point per feature in a metric CRS.

use geo::{Centroid, Point};
use gridtopo_core::error::{GridError, Result};
use gridtopo_core::models::{Crs, FeatureId, FeatureSet, Tags, ValidityMode};

use crate::models::to_geo_geometry;
use crate::transform::Reprojector;
use crate::validation::validate_geometry;

/// A feature reduced to a single point in the working CRS
#[derive(Debug, Clone, PartialEq)]
pub struct ReducedFeature {
    pub id: FeatureId,
    pub location: Point,
    pub region: String,
    pub tags: Tags,
}

impl ReducedFeature {
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

/// Reduced features sharing one CRS
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReducedSet {
    pub crs: Crs,
    pub features: Vec<ReducedFeature>,

    /// Features dropped for invalid geometry (lenient mode only)
    pub dropped: usize,
}

/// Reproject every feature into `target` and replace it with its centroid.
///
/// Points stay points; lines and polygons become their centroid computed in
/// the target CRS. Features whose geometry has no usable centroid fail the
/// run under [`ValidityMode::Strict`] and are dropped under
/// [`ValidityMode::Lenient`].
pub fn reduce_features(set: &FeatureSet, target: &Crs, mode: ValidityMode) -> Result<ReducedSet> {
    let reprojector = Reprojector::new(&set.crs, target)?;
    let mut features = Vec::with_capacity(set.features.len());
    let mut dropped = 0;

    for feature in &set.features {
        match reduce_one(&reprojector, &feature.geometry) {
            Ok(location) => features.push(ReducedFeature {
                id: feature.id.clone(),
                location,
                region: feature.region.clone(),
                tags: feature.tags.clone(),
            }),
            Err(reason) => match mode {
                ValidityMode::Strict => {
                    return Err(GridError::InvalidGeometry {
                        feature_id: feature.id.to_string(),
                        reason,
                    })
                }
                ValidityMode::Lenient => {
                    tracing::warn!(
                        feature_id = %feature.id,
                        kind = feature.geometry.kind_name(),
                        %reason,
                        "Dropping feature with invalid geometry"
                    );
                    dropped += 1;
                }
            },
        }
    }

    tracing::debug!(
        from = %set.crs,
        to = %target,
        kept = features.len(),
        dropped,
        "Reduced features to representative points"
    );

    Ok(ReducedSet { crs: target.clone(), features, dropped })
}

fn reduce_one(
    reprojector: &Reprojector,
    geometry: &gridtopo_core::models::Geometry,
) -> std::result::Result<Point, String> {
    let source = to_geo_geometry(geometry);
    let validation = validate_geometry(&source);
    if !validation.is_valid {
        return Err(validation.first_reason().unwrap_or("Invalid geometry").to_string());
    }

    let projected = reprojector.reproject(&source).map_err(|e| e.to_string())?;
    let centroid = projected.centroid().ok_or_else(|| "Geometry has no centroid".to_string())?;

    if !centroid.x().is_finite() || !centroid.y().is_finite() {
        return Err(format!("Centroid is not finite in {}", reprojector.target()));
    }
    Ok(centroid)
}
