//! GeoJSON export of a grid topology

use geojson::{FeatureCollection, JsonObject, JsonValue};
use gridtopo_core::error::{GridError, Result, Stage};
use gridtopo_core::models::{Crs, Geometry};
use gridtopo_geo::{from_geo_geometry, Reprojector};
use gridtopo_topology::{GridTopology, Link, MatchedGenerator, SubstationSummary};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

use crate::collection::crs_member;
use crate::summary::RunSummary;

pub const SUBSTATIONS_FILE: &str = "substations.geojson";
pub const GENERATORS_FILE: &str = "generators.geojson";
pub const LINES_FILE: &str = "lines.geojson";
pub const SUMMARY_FILE: &str = "summary.json";

/// Paths of the written datasets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFiles {
    pub substations: PathBuf,
    pub generators: PathBuf,
    pub lines: PathBuf,
}

/// Writes substations, generators and links as GeoJSON FeatureCollections
pub struct GeoJsonWriter {
    output_dir: PathBuf,

    /// CRS of the written files; the topology CRS when unset
    export_crs: Option<Crs>,
}

impl GeoJsonWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self { output_dir: output_dir.into(), export_crs: None }
    }

    pub fn with_export_crs(mut self, export_crs: Option<Crs>) -> Self {
        self.export_crs = export_crs;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write the three datasets, creating the output directory if needed
    pub fn write(&self, topology: &GridTopology) -> Result<OutputFiles> {
        self.write_all(topology).map_err(|e| e.at_stage(Stage::Export))
    }

    /// Write the run summary next to the datasets
    pub fn write_summary(&self, summary: &RunSummary) -> Result<PathBuf> {
        let path = self.output_dir.join(SUMMARY_FILE);
        let content = serde_json::to_string_pretty(summary)
            .map_err(|e| GridError::Serialization(format!("Failed to serialize summary: {}", e)))
            .map_err(|e| e.at_stage(Stage::Export))?;
        fs::create_dir_all(&self.output_dir).map_err(|e| GridError::Io(e).at_stage(Stage::Export))?;
        fs::write(&path, content).map_err(|e| GridError::Io(e).at_stage(Stage::Export))?;
        Ok(path)
    }

    fn write_all(&self, topology: &GridTopology) -> Result<OutputFiles> {
        let target = self.export_crs.clone().unwrap_or_else(|| topology.crs.clone());
        let reprojector = Reprojector::new(&topology.crs, &target)?;

        fs::create_dir_all(&self.output_dir)?;
        let files = OutputFiles {
            substations: self.output_dir.join(SUBSTATIONS_FILE),
            generators: self.output_dir.join(GENERATORS_FILE),
            lines: self.output_dir.join(LINES_FILE),
        };

        let substations = topology
            .substations
            .iter()
            .map(|s| substation_feature(s, topology, &reprojector))
            .collect::<Result<Vec<_>>>()?;
        write_collection(&files.substations, substations, &target)?;

        let generators = topology
            .generators
            .iter()
            .map(|g| generator_feature(g, &reprojector))
            .collect::<Result<Vec<_>>>()?;
        write_collection(&files.generators, generators, &target)?;

        let lines =
            topology.links.iter().map(|l| link_feature(l, &reprojector)).collect::<Result<Vec<_>>>()?;
        write_collection(&files.lines, lines, &target)?;

        tracing::info!(
            dir = %self.output_dir.display(),
            crs = %target,
            substations = topology.substations.len(),
            generators = topology.generators.len(),
            links = topology.links.len(),
            "Wrote GeoJSON outputs"
        );
        Ok(files)
    }
}

fn write_collection(path: &Path, features: Vec<geojson::Feature>, crs: &Crs) -> Result<()> {
    let mut foreign_members = JsonObject::new();
    foreign_members.insert("crs".to_string(), crs_member(crs));

    let collection = FeatureCollection { bbox: None, features, foreign_members: Some(foreign_members) };
    let content = serde_json::to_string(&collection)
        .map_err(|e| GridError::Serialization(format!("Failed to serialize {}: {}", path.display(), e)))?;
    fs::write(path, content)?;
    Ok(())
}

fn to_feature(geometry: Geometry, properties: JsonObject) -> Result<geojson::Feature> {
    let geometry: geojson::Geometry = serde_json::from_value(geometry.to_geojson())
        .map_err(|e| GridError::Serialization(format!("Failed to convert geometry: {}", e)))?;

    Ok(geojson::Feature {
        bbox: None,
        geometry: Some(geometry),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    })
}

fn point_geometry(point: geo::Point, reprojector: &Reprojector) -> Result<Geometry> {
    let point = reprojector.reproject_point(point)?;
    Ok(Geometry::point(point.x(), point.y()))
}

fn tags_value(tags: &gridtopo_core::models::Tags) -> JsonValue {
    JsonValue::Object(tags.iter().map(|(k, v)| (k.clone(), JsonValue::String(v.clone()))).collect())
}

/// Substation feature; properties follow [`GridTopology::substation_fields`]
pub fn substation_feature(
    summary: &SubstationSummary,
    topology: &GridTopology,
    reprojector: &Reprojector,
) -> Result<geojson::Feature> {
    let substation = &summary.substation;
    let mut props = JsonObject::new();
    props.insert("id".to_string(), json!(substation.id));
    props.insert("name".to_string(), json!(substation.name));
    props.insert("region".to_string(), json!(substation.region));
    props.insert("voltage".to_string(), json!(substation.voltage));
    props.insert("num_generators".to_string(), json!(summary.num_generators));
    for (column, count) in summary.breakdown_by_name(&topology.categories) {
        props.insert(column.to_string(), json!(count));
    }
    props.insert("total_capacity_mw".to_string(), json!(summary.total_capacity_mw));
    props.insert("tags".to_string(), tags_value(&substation.tags));

    to_feature(point_geometry(substation.location, reprojector)?, props)
}

pub fn generator_feature(
    matched: &MatchedGenerator,
    reprojector: &Reprojector,
) -> Result<geojson::Feature> {
    let generator = &matched.generator;
    let mut props = JsonObject::new();
    props.insert("id".to_string(), json!(generator.id));
    props.insert("name".to_string(), json!(generator.name));
    props.insert("region".to_string(), json!(generator.region));
    props.insert("capacity_mw".to_string(), json!(generator.capacity_mw));
    props.insert("generator_method".to_string(), json!(generator.category));
    props.insert(
        "nearest_substation_id".to_string(),
        json!(matched.nearest.as_ref().map(|m| &m.substation_id)),
    );
    props.insert(
        "nearest_substation_distance_m".to_string(),
        json!(matched.nearest.as_ref().map(|m| m.distance_m)),
    );
    props.insert("tags".to_string(), tags_value(&generator.tags));

    to_feature(point_geometry(generator.location, reprojector)?, props)
}

pub fn link_feature(link: &Link, reprojector: &Reprojector) -> Result<geojson::Feature> {
    let projected = reprojector.reproject(&geo::Geometry::LineString(link.geometry.clone()))?;
    let geometry = from_geo_geometry(&projected).ok_or_else(|| GridError::InvalidGeometry {
        feature_id: link.generator_id.to_string(),
        reason: "Link geometry vanished during reprojection".to_string(),
    })?;

    let mut props = JsonObject::new();
    props.insert("generator_id".to_string(), json!(link.generator_id));
    props.insert("substation_id".to_string(), json!(link.substation_id));
    props.insert("capacity_mw".to_string(), json!(link.capacity_mw));

    to_feature(geometry, props)
}
