use gridtopo_core::error::{GridError, Result, Stage};
use gridtopo_core::models::{FeatureKind, FeatureSet, Region};
use gridtopo_core::ports::{FeatureSource, RegionSource};
use gridtopo_geo::check_crs_match;
use std::collections::HashSet;

use crate::builder::TopologyBuilder;
use crate::models::GridTopology;

/// Pipeline fetching regions and features, then building the topology
pub struct GridPipeline<R, F>
where
    R: RegionSource,
    F: FeatureSource,
{
    region_source: R,
    feature_source: F,
    builder: TopologyBuilder,
}

impl<R, F> GridPipeline<R, F>
where
    R: RegionSource,
    F: FeatureSource,
{
    /// Create a new grid pipeline
    pub fn new(region_source: R, feature_source: F, builder: TopologyBuilder) -> Self {
        Self { region_source, feature_source, builder }
    }

    pub fn builder(&self) -> &TopologyBuilder {
        &self.builder
    }

    /// Execute the pipeline for the named regions
    pub async fn run(&self, region_names: &[String]) -> Result<GridTopology> {
        // Phase 1: Region boundaries
        let regions = self.fetch_regions(region_names).await?;

        // Phase 2: Raw features, unioned over all regions
        let substations = self.collect(&regions, FeatureKind::Substation).await?;
        let generators = self.collect(&regions, FeatureKind::Generator).await?;

        // Phase 3: Core association and aggregation
        self.builder.build(&substations, &generators)
    }

    async fn fetch_regions(&self, names: &[String]) -> Result<Vec<Region>> {
        if names.is_empty() {
            return Err(GridError::NoRegions.at_stage(Stage::RegionFetch));
        }

        let regions = self
            .region_source
            .regions(names)
            .await
            .map_err(|e| e.at_stage(Stage::RegionFetch))?;
        if regions.is_empty() {
            return Err(GridError::NoRegions.at_stage(Stage::RegionFetch));
        }

        tracing::info!(
            source = self.region_source.source_name(),
            regions = regions.len(),
            "Fetched region boundaries"
        );
        Ok(regions)
    }

    async fn collect(&self, regions: &[Region], kind: FeatureKind) -> Result<FeatureSet> {
        let mut parts = Vec::with_capacity(regions.len());
        for region in regions {
            let set = self
                .feature_source
                .features(region, kind)
                .await
                .map_err(|e| e.at_stage(Stage::FeatureQuery))?;
            tracing::info!(
                source = self.feature_source.source_name(),
                region = %region.name,
                %kind,
                count = set.len(),
                "Queried features"
            );
            parts.push((region.name.clone(), set));
        }

        let union = union_regions(parts).map_err(|e| e.at_stage(Stage::FeatureQuery))?;
        if union.is_empty() {
            return Err(GridError::EmptyFeatureSet { kind }.at_stage(Stage::FeatureQuery));
        }
        Ok(union)
    }
}

/// Concatenate per-region feature sets in order.
///
/// Each feature is labelled with its region. A feature seen in several
/// regions is kept once, under the first. All sets must share one CRS.
pub fn union_regions(parts: Vec<(String, FeatureSet)>) -> Result<FeatureSet> {
    let mut parts = parts.into_iter();
    let Some((first_region, first)) = parts.next() else {
        return Ok(FeatureSet::default());
    };

    let crs = first.crs.clone();
    let mut seen = HashSet::new();
    let mut features = Vec::new();

    for (region, set) in std::iter::once((first_region, first)).chain(parts) {
        check_crs_match(&crs, &set.crs)?;
        for feature in set.features {
            if seen.insert(feature.id.clone()) {
                features.push(feature.in_region(region.clone()));
            } else {
                tracing::debug!(feature_id = %feature.id, %region, "Skipping feature already seen");
            }
        }
    }

    Ok(FeatureSet::new(crs, features))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridtopo_core::models::{Crs, Feature, Geometry, Tags};

    fn set(crs: Crs, ids: &[&str]) -> FeatureSet {
        FeatureSet::new(
            crs,
            ids.iter().map(|id| Feature::new(*id, Geometry::point(0.0, 0.0), Tags::new())).collect(),
        )
    }

    #[test]
    fn test_union_labels_and_dedupes() {
        let union = union_regions(vec![
            ("Brandenburg".to_string(), set(Crs::wgs84(), &["node/1", "way/2"])),
            ("Sachsen".to_string(), set(Crs::wgs84(), &["way/2", "node/3"])),
        ])
        .unwrap();

        let labelled: Vec<(&str, &str)> =
            union.features.iter().map(|f| (f.id.as_str(), f.region.as_str())).collect();
        assert_eq!(
            labelled,
            [("node/1", "Brandenburg"), ("way/2", "Brandenburg"), ("node/3", "Sachsen")]
        );
        assert_eq!(union.crs, Crs::wgs84());
    }

    #[test]
    fn test_union_rejects_mixed_crs() {
        let err = union_regions(vec![
            ("A".to_string(), set(Crs::wgs84(), &["node/1"])),
            ("B".to_string(), set(Crs::web_mercator(), &["node/2"])),
        ])
        .unwrap_err();
        assert!(matches!(err, GridError::CrsMismatch { .. }));
    }

    #[test]
    fn test_union_of_nothing_is_empty() {
        assert!(union_regions(vec![]).unwrap().is_empty());
    }
}
