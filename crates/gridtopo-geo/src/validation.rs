use geo::{CoordsIter, Geometry as GeoGeometry, LineString, Polygon};

/// Validation result with details
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

/// Validation error with location details
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub location: String,
    pub reason: String,
}

impl ValidationResult {
    /// Create a valid result
    pub fn valid() -> Self {
        Self { is_valid: true, errors: Vec::new() }
    }

    /// Add an error to the result
    pub fn add_error(&mut self, location: impl Into<String>, reason: impl Into<String>) {
        self.is_valid = false;
        self.errors.push(ValidationError { location: location.into(), reason: reason.into() });
    }

    /// First error reason, for single-line diagnostics
    pub fn first_reason(&self) -> Option<&str> {
        self.errors.first().map(|e| e.reason.as_str())
    }
}

/// Validate a geometry before it is reduced to a point.
///
/// Only defects that prevent a meaningful representative point are reported:
/// no coordinates at all, non-finite coordinates, and degenerate lines.
/// Ring closure and self-intersection are tolerated since the centroid is
/// still well defined.
pub fn validate_geometry(geometry: &GeoGeometry) -> ValidationResult {
    let mut result = ValidationResult::valid();

    if geometry.coords_count() == 0 {
        result.add_error(geometry_name(geometry), "Geometry has no coordinates");
        return result;
    }

    if let Some((i, _)) =
        geometry.coords_iter().enumerate().find(|(_, c)| !c.x.is_finite() || !c.y.is_finite())
    {
        result.add_error(format!("{}[{}]", geometry_name(geometry), i), "Coordinates must be finite");
    }

    match geometry {
        GeoGeometry::LineString(ls) => validate_linestring(ls, "LineString", &mut result),
        GeoGeometry::Polygon(poly) => validate_polygon(poly, "Polygon", &mut result),
        GeoGeometry::MultiLineString(mls) => {
            for (i, ls) in mls.iter().enumerate() {
                validate_linestring(ls, &format!("MultiLineString[{}]", i), &mut result);
            }
        }
        GeoGeometry::MultiPolygon(mp) => {
            for (i, poly) in mp.iter().enumerate() {
                validate_polygon(poly, &format!("MultiPolygon[{}]", i), &mut result);
            }
        }
        _ => {}
    }

    result
}

fn validate_linestring(linestring: &LineString, location: &str, result: &mut ValidationResult) {
    if linestring.0.len() == 1 {
        result.add_error(location, "LineString must have at least 2 points, found 1");
    }
}

fn validate_polygon(polygon: &Polygon, location: &str, result: &mut ValidationResult) {
    let exterior = polygon.exterior();
    if !exterior.0.is_empty() && exterior.0.len() < 3 {
        result.add_error(
            format!("{} exterior", location),
            format!("Polygon exterior must have at least 3 points, found {}", exterior.0.len()),
        );
    }
}

fn geometry_name(geometry: &GeoGeometry) -> &'static str {
    match geometry {
        GeoGeometry::Point(_) => "Point",
        GeoGeometry::Line(_) => "Line",
        GeoGeometry::LineString(_) => "LineString",
        GeoGeometry::Polygon(_) => "Polygon",
        GeoGeometry::MultiPoint(_) => "MultiPoint",
        GeoGeometry::MultiLineString(_) => "MultiLineString",
        GeoGeometry::MultiPolygon(_) => "MultiPolygon",
        GeoGeometry::GeometryCollection(_) => "GeometryCollection",
        GeoGeometry::Rect(_) => "Rect",
        GeoGeometry::Triangle(_) => "Triangle",
    }
}
