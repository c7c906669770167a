//! OpenStreetMap features through the Overpass API

use async_trait::async_trait;
use gridtopo_core::config::DEFAULT_OVERPASS_URL;
use gridtopo_core::error::{GridError, Result};
use gridtopo_core::models::{Crs, Feature, FeatureKind, FeatureSet, Geometry, Region, Tags};
use gridtopo_core::ports::FeatureSource;
use gridtopo_geo::{exterior_rings, from_geo_geometry, to_geo_geometry, Reprojector};
use serde::Deserialize;
use std::time::Duration;

/// Server-side timeout requested in every query, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 180;

/// Feature source querying an Overpass interpreter
pub struct OverpassFeatureSource {
    /// Interpreter endpoint
    url: String,

    timeout_secs: u64,

    /// HTTP client
    client: reqwest::Client,
}

impl OverpassFeatureSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), timeout_secs: DEFAULT_TIMEOUT_SECS, client: reqwest::Client::new() }
    }

    /// Create with the public overpass-api.de endpoint
    pub fn public() -> Self {
        Self::new(DEFAULT_OVERPASS_URL)
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn error(&self, reason: String) -> GridError {
        GridError::Collaborator { source_name: self.source_name().to_string(), reason }
    }
}

#[async_trait]
impl FeatureSource for OverpassFeatureSource {
    async fn features(&self, region: &Region, kind: FeatureKind) -> Result<FeatureSet> {
        let query = build_query(region, kind, self.timeout_secs)?;
        tracing::debug!(region = %region.name, %kind, bytes = query.len(), "Sending Overpass query");

        let response = self
            .client
            .post(&self.url)
            .body(query)
            .timeout(Duration::from_secs(self.timeout_secs + 30))
            .send()
            .await
            .map_err(|e| self.error(format!("Failed to connect to {}: {}", self.url, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(self.error(format!("Overpass API error ({}): {}", status, error_text)));
        }

        let body =
            response.text().await.map_err(|e| self.error(format!("Failed to read response: {}", e)))?;
        parse_response(&body, kind)
    }

    fn source_name(&self) -> &str {
        "Overpass"
    }
}

/// Overpass QL selecting every element of `kind` inside the region.
///
/// One `poly` clause is emitted per outer ring of the boundary, which is
/// reprojected to lat/lon first when needed.
pub fn build_query(region: &Region, kind: FeatureKind, timeout_secs: u64) -> Result<String> {
    let boundary = if region.crs.epsg == 4326 {
        region.boundary.clone()
    } else {
        let reprojector = Reprojector::new(&region.crs, &Crs::wgs84())?;
        let projected = reprojector.reproject(&to_geo_geometry(&region.boundary))?;
        from_geo_geometry(&projected).ok_or_else(|| GridError::InvalidGeometry {
            feature_id: region.name.clone(),
            reason: "Boundary is empty after reprojection".to_string(),
        })?
    };

    let rings = exterior_rings(&boundary);
    if rings.is_empty() {
        return Err(GridError::InvalidGeometry {
            feature_id: region.name.clone(),
            reason: "Region boundary has no polygon ring".to_string(),
        });
    }

    let filter = tag_filter(kind);
    let mut query = format!("[out:json][timeout:{}];\n(\n", timeout_secs);
    for ring in rings {
        let poly = ring.iter().map(|c| format!("{} {}", c[1], c[0])).collect::<Vec<_>>().join(" ");
        query.push_str(&format!("  nwr{}(poly:\"{}\");\n", filter, poly));
    }
    query.push_str(");\nout geom;\n");
    Ok(query)
}

fn tag_filter(kind: FeatureKind) -> String {
    match kind.power_values() {
        [single] => format!("[\"power\"=\"{}\"]", single),
        values => format!("[\"power\"~\"^({})$\"]", values.join("|")),
    }
}

/// Response body of an `[out:json]` query
#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<Element>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Element {
    Node {
        id: u64,
        lat: f64,
        lon: f64,
        #[serde(default)]
        tags: Tags,
    },
    Way {
        id: u64,
        #[serde(default)]
        geometry: Vec<LatLon>,
        #[serde(default)]
        tags: Tags,
    },
    Relation {
        id: u64,
        #[serde(default)]
        members: Vec<Member>,
        #[serde(default)]
        tags: Tags,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct LatLon {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct Member {
    #[serde(rename = "type")]
    member_type: String,
    #[serde(default)]
    role: String,
    #[serde(default)]
    geometry: Vec<LatLon>,
}

/// Parse an Overpass JSON response into WGS84 features of `kind`.
///
/// Ids are `node/<id>`, `way/<id>` or `relation/<id>`. Elements without a
/// usable geometry or without a matching `power` tag are skipped.
pub fn parse_response(body: &str, kind: FeatureKind) -> Result<FeatureSet> {
    let response: OverpassResponse = serde_json::from_str(body).map_err(|e| GridError::Collaborator {
        source_name: "Overpass".to_string(),
        reason: format!("Failed to parse Overpass response: {}", e),
    })?;

    let mut features = Vec::with_capacity(response.elements.len());
    for element in response.elements {
        let (id, geometry, tags) = match element {
            Element::Node { id, lat, lon, tags } => {
                (format!("node/{}", id), Some(Geometry::point(lon, lat)), tags)
            }
            Element::Way { id, geometry, tags } => (format!("way/{}", id), way_geometry(&geometry), tags),
            Element::Relation { id, members, tags } => {
                (format!("relation/{}", id), relation_geometry(&members), tags)
            }
            Element::Other => continue,
        };

        if !kind.matches(&tags) {
            tracing::debug!(%id, %kind, "Skipping element without matching power tag");
            continue;
        }
        match geometry {
            Some(geometry) => features.push(Feature::new(id, geometry, tags)),
            None => tracing::debug!(%id, "Skipping element without geometry"),
        }
    }

    Ok(FeatureSet::new(Crs::wgs84(), features))
}

fn coords(points: &[LatLon]) -> Vec<[f64; 2]> {
    points.iter().map(|p| [p.lon, p.lat]).collect()
}

fn is_closed_ring(coords: &[[f64; 2]]) -> bool {
    coords.len() >= 4 && coords.first() == coords.last()
}

fn way_geometry(points: &[LatLon]) -> Option<Geometry> {
    let coords = coords(points);
    if coords.is_empty() {
        None
    } else if is_closed_ring(&coords) {
        Some(Geometry::polygon(vec![coords]))
    } else {
        Some(Geometry::line_string(coords))
    }
}

fn relation_geometry(members: &[Member]) -> Option<Geometry> {
    let ways: Vec<(&str, Vec<[f64; 2]>)> = members
        .iter()
        .filter(|m| m.member_type == "way" && !m.geometry.is_empty())
        .map(|m| (m.role.as_str(), coords(&m.geometry)))
        .collect();

    let outers: Vec<Vec<Vec<[f64; 2]>>> = ways
        .iter()
        .filter(|(role, ring)| (role.is_empty() || *role == "outer") && is_closed_ring(ring))
        .map(|(_, ring)| vec![ring.clone()])
        .collect();
    if !outers.is_empty() {
        return Some(Geometry::MultiPolygon { coordinates: outers });
    }

    let lines: Vec<Vec<[f64; 2]>> = ways.into_iter().map(|(_, line)| line).collect();
    if lines.is_empty() {
        None
    } else {
        Some(Geometry::MultiLineString { coordinates: lines })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region() -> Region {
        Region::new(
            "Sachsen",
            Geometry::MultiPolygon {
                coordinates: vec![
                    vec![vec![[12.0, 50.0], [13.0, 50.0], [13.0, 51.0], [12.0, 50.0]]],
                    vec![vec![[14.0, 51.0], [14.5, 51.0], [14.5, 51.5], [14.0, 51.0]]],
                ],
            },
            Crs::wgs84(),
        )
    }

    #[test]
    fn test_query_has_one_clause_per_ring() {
        let query = build_query(&region(), FeatureKind::Substation, 90).unwrap();

        assert!(query.starts_with("[out:json][timeout:90];"));
        assert_eq!(query.matches("nwr[\"power\"=\"substation\"]").count(), 2);
        // lat before lon
        assert!(query.contains("(poly:\"50 12 50 13 51 13 50 12\")"));
        assert!(query.trim_end().ends_with("out geom;"));
    }

    #[test]
    fn test_generator_query_matches_generator_and_plant() {
        let query = build_query(&region(), FeatureKind::Generator, 180).unwrap();
        assert!(query.contains("nwr[\"power\"~\"^(generator|plant)$\"]"));
    }

    #[test]
    fn test_query_requires_polygon_boundary() {
        let line = Region::new("Line", Geometry::line_string(vec![[0.0, 0.0], [1.0, 1.0]]), Crs::wgs84());
        let err = build_query(&line, FeatureKind::Substation, 180).unwrap_err();
        assert!(matches!(err, GridError::InvalidGeometry { .. }));
    }

    #[test]
    fn test_parse_elements() {
        let body = r#"{
            "version": 0.6,
            "elements": [
                {"type": "node", "id": 1, "lat": 51.0, "lon": 13.0,
                 "tags": {"power": "substation", "voltage": "110000"}},
                {"type": "way", "id": 2,
                 "geometry": [{"lat": 51.0, "lon": 13.0}, {"lat": 51.0, "lon": 13.1},
                              {"lat": 51.1, "lon": 13.1}, {"lat": 51.0, "lon": 13.0}],
                 "tags": {"power": "substation"}},
                {"type": "way", "id": 3,
                 "geometry": [{"lat": 51.0, "lon": 13.0}, {"lat": 51.0, "lon": 13.1}],
                 "tags": {"power": "substation"}},
                {"type": "relation", "id": 4,
                 "members": [
                    {"type": "way", "ref": 10, "role": "outer",
                     "geometry": [{"lat": 50.0, "lon": 12.0}, {"lat": 50.0, "lon": 12.1},
                                  {"lat": 50.1, "lon": 12.1}, {"lat": 50.0, "lon": 12.0}]},
                    {"type": "node", "ref": 11, "role": "", "lat": 50.0, "lon": 12.0}
                 ],
                 "tags": {"power": "substation", "type": "multipolygon"}},
                {"type": "node", "id": 5, "lat": 50.0, "lon": 12.0, "tags": {"power": "tower"}},
                {"type": "area", "id": 6}
            ]
        }"#;

        let set = parse_response(body, FeatureKind::Substation).unwrap();
        assert_eq!(set.crs, Crs::wgs84());

        let ids: Vec<&str> = set.features.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, ["node/1", "way/2", "way/3", "relation/4"]);

        assert_eq!(set.features[0].geometry, Geometry::point(13.0, 51.0));
        assert_eq!(set.features[0].tag("voltage"), Some("110000"));
        assert!(matches!(set.features[1].geometry, Geometry::Polygon { .. }));
        assert!(matches!(set.features[2].geometry, Geometry::LineString { .. }));
        assert!(matches!(set.features[3].geometry, Geometry::MultiPolygon { ref coordinates } if coordinates.len() == 1));
    }

    #[test]
    fn test_relation_without_rings_becomes_lines() {
        let body = r#"{"elements": [
            {"type": "relation", "id": 7,
             "members": [{"type": "way", "role": "outer",
                          "geometry": [{"lat": 50.0, "lon": 12.0}, {"lat": 50.5, "lon": 12.5}]}],
             "tags": {"power": "plant"}}
        ]}"#;

        let set = parse_response(body, FeatureKind::Generator).unwrap();
        assert!(matches!(set.features[0].geometry, Geometry::MultiLineString { .. }));
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        assert!(matches!(
            parse_response("<html>busy</html>", FeatureKind::Generator),
            Err(GridError::Collaborator { .. })
        ));
    }
}
