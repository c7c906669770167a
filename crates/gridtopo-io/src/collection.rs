//! GeoJSON FeatureCollection helpers shared by the file and HTTP adapters

use geojson::{FeatureCollection, GeoJson, JsonObject, JsonValue};
use gridtopo_core::error::{GridError, Result};
use gridtopo_core::models::{Crs, Geometry, Tags};

/// Parse a FeatureCollection and its CRS.
///
/// The CRS comes from the legacy `crs` foreign member and defaults to
/// EPSG:4326 as RFC 7946 prescribes.
pub fn parse_collection(content: &str, source_name: &str) -> Result<(FeatureCollection, Crs)> {
    let geojson: GeoJson = content.parse().map_err(|e| GridError::Collaborator {
        source_name: source_name.to_string(),
        reason: format!("Failed to parse GeoJSON: {}", e),
    })?;

    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        GeoJson::Feature(feature) => {
            FeatureCollection { bbox: None, features: vec![feature], foreign_members: None }
        }
        GeoJson::Geometry(_) => {
            return Err(GridError::Collaborator {
                source_name: source_name.to_string(),
                reason: "Expected a FeatureCollection, found a bare geometry".to_string(),
            })
        }
    };

    let epsg = collection
        .foreign_members
        .as_ref()
        .and_then(|fm| fm.get("crs"))
        .and_then(extract_epsg_from_crs)
        .unwrap_or(4326);

    Ok((collection, Crs::epsg(epsg)))
}

/// Extract EPSG code from a legacy CRS object
pub fn extract_epsg_from_crs(crs: &JsonValue) -> Option<u32> {
    let name = crs.get("properties")?.get("name")?.as_str()?;
    // "EPSG:4326" or "urn:ogc:def:crs:EPSG::4326"
    name.rsplit(':').next()?.parse().ok()
}

/// Legacy CRS object naming an EPSG code
pub fn crs_member(crs: &Crs) -> JsonValue {
    serde_json::json!({
        "type": "name",
        "properties": { "name": format!("urn:ogc:def:crs:EPSG::{}", crs.epsg) }
    })
}

/// Canonical geometry of a GeoJSON feature, `None` for missing or
/// collection geometries
pub fn feature_geometry(feature: &geojson::Feature) -> Option<Geometry> {
    let value = serde_json::to_value(feature.geometry.as_ref()?).ok()?;
    Geometry::from_geojson(&value)
}

/// Feature id from the GeoJSON `id` member or an `id`/`@id` property
pub fn feature_id(feature: &geojson::Feature) -> Option<String> {
    if let Some(id) = &feature.id {
        return Some(match id {
            geojson::feature::Id::String(s) => s.clone(),
            geojson::feature::Id::Number(n) => n.to_string(),
        });
    }

    let props = feature.properties.as_ref()?;
    ["id", "@id"].iter().find_map(|key| match props.get(*key)? {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Flatten properties into string tags.
///
/// Strings are kept verbatim, nulls are skipped, anything else is stored as
/// its JSON text.
pub fn properties_to_tags(properties: Option<&JsonObject>) -> Tags {
    let Some(properties) = properties else {
        return Tags::new();
    };

    properties
        .iter()
        .filter_map(|(key, value)| {
            let text = match value {
                JsonValue::Null => return None,
                JsonValue::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some((key.clone(), text))
        })
        .collect()
}
