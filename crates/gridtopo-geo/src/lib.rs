//! Gridtopo Geo - Geometry, CRS, and spatial operations
//!
//! This crate handles geometry conversion and validation, CRS reprojection,
//! reduction of features to representative points, and nearest-point search.

pub mod index;
pub mod models;
pub mod reduce;
pub mod spatial;
pub mod transform;
pub mod validation;

pub use index::{NearestHit, PointIndex};
pub use models::{from_geo_geometry, to_geo_geometry};
pub use reduce::{reduce_features, ReducedFeature, ReducedSet};
pub use spatial::{exterior_rings, intersects_region};
pub use transform::{check_crs_match, crs_match, Reprojector};
pub use validation::{validate_geometry, ValidationError, ValidationResult};
