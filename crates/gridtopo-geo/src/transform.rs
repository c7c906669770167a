//! CRS transformation and normalization

use geo::{Coord, Geometry as GeoGeometry, MapCoords, Point};
use gridtopo_core::error::{GridError, Result};
use gridtopo_core::models::Crs;
use proj::Proj;

/// Check if two CRS are the same
pub fn crs_match(crs1: &Crs, crs2: &Crs) -> bool {
    crs1.epsg == crs2.epsg
}

/// Fail with `CrsMismatch` unless both CRS are the same
pub fn check_crs_match(left: &Crs, right: &Crs) -> Result<()> {
    if !crs_match(left, right) {
        return Err(GridError::CrsMismatch { left: left.to_string(), right: right.to_string() });
    }
    Ok(())
}

/// Reprojects geometries between two CRS.
///
/// The PROJ pipeline is created once and reused for every geometry. When
/// source and target match, geometries pass through untouched.
pub struct Reprojector {
    from: Crs,
    to: Crs,
    proj: Option<Proj>,
}

impl Reprojector {
    pub fn new(from: &Crs, to: &Crs) -> Result<Self> {
        let proj = if crs_match(from, to) {
            None
        } else {
            let proj = Proj::new_known_crs(&from.authority(), &to.authority(), None).map_err(
                |e| GridError::Projection {
                    reason: format!(
                        "Failed to create projection from {} to {}: {}",
                        from, to, e
                    ),
                },
            )?;
            Some(proj)
        };

        Ok(Self { from: from.clone(), to: to.clone(), proj })
    }

    pub fn source(&self) -> &Crs {
        &self.from
    }

    pub fn target(&self) -> &Crs {
        &self.to
    }

    /// Whether this reprojector changes coordinates at all
    pub fn is_identity(&self) -> bool {
        self.proj.is_none()
    }

    pub fn reproject(&self, geometry: &GeoGeometry) -> Result<GeoGeometry> {
        let Some(proj) = &self.proj else {
            return Ok(geometry.clone());
        };

        geometry.try_map_coords(|coord: Coord| {
            proj.convert((coord.x, coord.y))
                .map(|(x, y)| Coord { x, y })
                .map_err(|e| self.projection_error(e))
        })
    }

    pub fn reproject_point(&self, point: Point) -> Result<Point> {
        let Some(proj) = &self.proj else {
            return Ok(point);
        };

        proj.convert((point.x(), point.y()))
            .map(|(x, y)| Point::new(x, y))
            .map_err(|e| self.projection_error(e))
    }

    fn projection_error(&self, e: proj::ProjError) -> GridError {
        GridError::Projection { reason: format!("{} -> {}: {}", self.from, self.to, e) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_passes_through() {
        let reprojector = Reprojector::new(&Crs::web_mercator(), &Crs::epsg(3857)).unwrap();
        assert!(reprojector.is_identity());

        let point = Point::new(1_500_000.0, 6_800_000.0);
        assert_eq!(reprojector.reproject_point(point).unwrap(), point);
    }

    #[test]
    fn test_wgs84_to_web_mercator() {
        let reprojector = Reprojector::new(&Crs::wgs84(), &Crs::web_mercator()).unwrap();
        assert!(!reprojector.is_identity());

        // Longitude 180 maps to half the equatorial circumference
        let p = reprojector.reproject_point(Point::new(180.0, 0.0)).unwrap();
        assert!((p.x() - 20_037_508.342789244).abs() < 1e-3);
        assert!(p.y().abs() < 1e-3);
    }

    #[test]
    fn test_check_crs_match() {
        assert!(check_crs_match(&Crs::web_mercator(), &Crs::web_mercator()).is_ok());
        let err = check_crs_match(&Crs::wgs84(), &Crs::web_mercator()).unwrap_err();
        assert!(matches!(err, GridError::CrsMismatch { .. }));
    }
}
