pub mod feature;
pub mod geometry;

pub use feature::{Feature, FeatureId, FeatureKind, FeatureSet, Region, Tags};
pub use geometry::{Crs, Geometry, ValidityMode};
