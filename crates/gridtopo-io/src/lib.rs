//! Gridtopo IO - Collaborator adapters
//!
//! Region boundaries from GADM or local files, OSM features from Overpass or
//! local files, and GeoJSON export of the resulting topology.

pub mod collection;
pub mod gadm;
pub mod local;
pub mod overpass;
pub mod summary;
pub mod writer;

pub use gadm::{select_regions, GadmRegionSource};
pub use local::{load_features, GeoJsonFeatureSource, GeoJsonRegionSource};
pub use overpass::{build_query, parse_response, OverpassFeatureSource};
pub use summary::RunSummary;
pub use writer::{GeoJsonWriter, OutputFiles};
