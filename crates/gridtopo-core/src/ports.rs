//! Port trait definitions
//!
//! These traits define the collaborators the pipeline consumes. Adapters live
//! in `gridtopo-io`.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{FeatureKind, FeatureSet, Region};

/// Port for administrative region boundaries
#[async_trait]
pub trait RegionSource: Send + Sync {
    /// Return one boundary per requested name, in request order
    async fn regions(&self, names: &[String]) -> Result<Vec<Region>>;

    /// Human-readable source name for diagnostics
    fn source_name(&self) -> &str;
}

/// Port for raw feature queries
#[async_trait]
pub trait FeatureSource: Send + Sync {
    /// Return the features of `kind` inside `region`
    async fn features(&self, region: &Region, kind: FeatureKind) -> Result<FeatureSet>;

    /// Human-readable source name for diagnostics
    fn source_name(&self) -> &str;
}
