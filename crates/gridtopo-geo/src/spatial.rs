use geo::{BoundingRect, Intersects};
use gridtopo_core::models::{Geometry, Region};

use crate::models::to_geo_geometry;

/// Check if a geometry intersects a region boundary.
///
/// Both must be in the region's CRS.
pub fn intersects_region(geometry: &Geometry, region: &Region) -> bool {
    let geom = to_geo_geometry(geometry);
    let boundary = to_geo_geometry(&region.boundary);

    // Cheap rejection before the exact test
    match (geom.bounding_rect(), boundary.bounding_rect()) {
        (Some(a), Some(b)) if a.intersects(&b) => geom.intersects(&boundary),
        _ => false,
    }
}

/// Exterior rings of an areal geometry; other geometry types have none
pub fn exterior_rings(geometry: &Geometry) -> Vec<&[[f64; 2]]> {
    match geometry {
        Geometry::Polygon { coordinates } => {
            coordinates.first().map(|ring| vec![ring.as_slice()]).unwrap_or_default()
        }
        Geometry::MultiPolygon { coordinates } => coordinates
            .iter()
            .filter_map(|polygon| polygon.first().map(Vec::as_slice))
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridtopo_core::models::Crs;

    fn square_region() -> Region {
        Region::new(
            "Square",
            Geometry::polygon(vec![vec![
                [0.0, 0.0],
                [10.0, 0.0],
                [10.0, 10.0],
                [0.0, 10.0],
                [0.0, 0.0],
            ]]),
            Crs::wgs84(),
        )
    }

    #[test]
    fn test_point_inside_and_outside() {
        let region = square_region();
        assert!(intersects_region(&Geometry::point(5.0, 5.0), &region));
        assert!(!intersects_region(&Geometry::point(15.0, 5.0), &region));
    }

    #[test]
    fn test_line_crossing_border_intersects() {
        let region = square_region();
        let line = Geometry::line_string(vec![[8.0, 5.0], [12.0, 5.0]]);
        assert!(intersects_region(&line, &region));
    }

    #[test]
    fn test_exterior_rings_of_multipolygon() {
        let ring = vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]];
        let geom = Geometry::MultiPolygon {
            coordinates: vec![vec![ring.clone()], vec![ring.clone(), ring.clone()]],
        };
        assert_eq!(exterior_rings(&geom).len(), 2);
        assert!(exterior_rings(&Geometry::point(0.0, 0.0)).is_empty());
    }
}
