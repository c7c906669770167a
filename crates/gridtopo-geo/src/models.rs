//! Conversions between the canonical [`Geometry`] and the `geo` crate types.

use geo::Geometry as GeoGeometry;
use geo::{Coord, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};

pub use gridtopo_core::models::{Crs, Geometry, ValidityMode};

fn to_line(coords: &[[f64; 2]]) -> LineString {
    coords.iter().map(|c| Coord { x: c[0], y: c[1] }).collect()
}

fn to_polygon(rings: &[Vec<[f64; 2]>]) -> Polygon {
    match rings.split_first() {
        Some((exterior, interiors)) => {
            Polygon::new(to_line(exterior), interiors.iter().map(|r| to_line(r)).collect())
        }
        None => Polygon::new(LineString::new(vec![]), vec![]),
    }
}

fn from_line(line: &LineString) -> Vec<[f64; 2]> {
    line.coords().map(|c| [c.x, c.y]).collect()
}

fn from_polygon(polygon: &Polygon) -> Vec<Vec<[f64; 2]>> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(from_line)
        .collect()
}

/// Convert a canonical Geometry to a geo::Geometry
pub fn to_geo_geometry(geom: &Geometry) -> GeoGeometry {
    match geom {
        Geometry::Point { coordinates } => {
            GeoGeometry::Point(Point::new(coordinates[0], coordinates[1]))
        }
        Geometry::LineString { coordinates } => GeoGeometry::LineString(to_line(coordinates)),
        Geometry::Polygon { coordinates } => GeoGeometry::Polygon(to_polygon(coordinates)),
        Geometry::MultiPoint { coordinates } => GeoGeometry::MultiPoint(MultiPoint::new(
            coordinates.iter().map(|c| Point::new(c[0], c[1])).collect(),
        )),
        Geometry::MultiLineString { coordinates } => GeoGeometry::MultiLineString(
            MultiLineString::new(coordinates.iter().map(|l| to_line(l)).collect()),
        ),
        Geometry::MultiPolygon { coordinates } => GeoGeometry::MultiPolygon(MultiPolygon::new(
            coordinates.iter().map(|p| to_polygon(p)).collect(),
        )),
    }
}

/// Convert a geo::Geometry to a canonical Geometry
///
/// Collections are flattened to their first member; `Rect` and `Triangle`
/// become polygons.
pub fn from_geo_geometry(geom: &GeoGeometry) -> Option<Geometry> {
    let converted = match geom {
        GeoGeometry::Point(p) => Geometry::point(p.x(), p.y()),
        GeoGeometry::Line(l) => Geometry::line_string(vec![[l.start.x, l.start.y], [l.end.x, l.end.y]]),
        GeoGeometry::LineString(ls) => Geometry::line_string(from_line(ls)),
        GeoGeometry::Polygon(p) => Geometry::polygon(from_polygon(p)),
        GeoGeometry::MultiPoint(mp) => Geometry::MultiPoint {
            coordinates: mp.iter().map(|p| [p.x(), p.y()]).collect(),
        },
        GeoGeometry::MultiLineString(mls) => Geometry::MultiLineString {
            coordinates: mls.iter().map(from_line).collect(),
        },
        GeoGeometry::MultiPolygon(mp) => Geometry::MultiPolygon {
            coordinates: mp.iter().map(from_polygon).collect(),
        },
        GeoGeometry::GeometryCollection(gc) => return gc.iter().next().and_then(from_geo_geometry),
        GeoGeometry::Rect(r) => Geometry::polygon(from_polygon(&r.to_polygon())),
        GeoGeometry::Triangle(t) => Geometry::polygon(from_polygon(&t.to_polygon())),
    };
    Some(converted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polygon_with_hole_keeps_rings() {
        let geom = Geometry::polygon(vec![
            vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [0.0, 0.0]],
            vec![[4.0, 4.0], [6.0, 4.0], [6.0, 6.0], [4.0, 6.0], [4.0, 4.0]],
        ]);
        let back = from_geo_geometry(&to_geo_geometry(&geom)).unwrap();
        assert_eq!(back, geom);
    }

    #[test]
    fn test_empty_collection_has_no_canonical_form() {
        let empty = GeoGeometry::GeometryCollection(geo::GeometryCollection::new_from(vec![]));
        assert!(from_geo_geometry(&empty).is_none());
    }
}
