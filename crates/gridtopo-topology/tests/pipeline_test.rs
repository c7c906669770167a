use async_trait::async_trait;
use gridtopo_core::error::{GridError, Result, Stage};
use gridtopo_core::models::{Crs, Feature, FeatureKind, FeatureSet, Geometry, Region, Tags};
use gridtopo_core::ports::{FeatureSource, RegionSource};
use gridtopo_topology::{GridPipeline, TopologyBuilder};
use std::collections::HashMap;

struct StaticRegions {
    regions: Vec<Region>,
}

#[async_trait]
impl RegionSource for StaticRegions {
    async fn regions(&self, names: &[String]) -> Result<Vec<Region>> {
        names
            .iter()
            .map(|name| {
                self.regions
                    .iter()
                    .find(|r| &r.name == name)
                    .cloned()
                    .ok_or_else(|| GridError::RegionNotFound { name: name.clone() })
            })
            .collect()
    }

    fn source_name(&self) -> &str {
        "static regions"
    }
}

#[derive(Default)]
struct StaticFeatures {
    sets: HashMap<(String, FeatureKind), FeatureSet>,
}

impl StaticFeatures {
    fn with(mut self, region: &str, kind: FeatureKind, features: Vec<Feature>) -> Self {
        self.sets.insert((region.to_string(), kind), FeatureSet::new(Crs::web_mercator(), features));
        self
    }
}

#[async_trait]
impl FeatureSource for StaticFeatures {
    async fn features(&self, region: &Region, kind: FeatureKind) -> Result<FeatureSet> {
        Ok(self
            .sets
            .get(&(region.name.clone(), kind))
            .cloned()
            .unwrap_or_else(|| FeatureSet::new(Crs::web_mercator(), vec![])))
    }

    fn source_name(&self) -> &str {
        "static features"
    }
}

fn region(name: &str) -> Region {
    Region::new(
        name,
        Geometry::polygon(vec![vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]),
        Crs::web_mercator(),
    )
}

fn tags(pairs: &[(&str, &str)]) -> Tags {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

fn substation(id: &str, x: f64, voltage: &str) -> Feature {
    Feature::new(id, Geometry::point(x, 0.0), tags(&[("power", "substation"), ("voltage", voltage)]))
}

fn generator(id: &str, x: f64, method: &str) -> Feature {
    Feature::new(
        id,
        Geometry::point(x, 0.0),
        tags(&[
            ("power", "generator"),
            ("generator:method", method),
            ("generator:output:electricity", "3 MW"),
        ]),
    )
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn pipeline(features: StaticFeatures) -> GridPipeline<StaticRegions, StaticFeatures> {
    GridPipeline::new(
        StaticRegions { regions: vec![region("Brandenburg"), region("Sachsen")] },
        features,
        TopologyBuilder::new(Crs::web_mercator()),
    )
}

#[tokio::test]
async fn test_run_over_two_regions() {
    let features = StaticFeatures::default()
        .with("Brandenburg", FeatureKind::Substation, vec![substation("node/1", 0.0, "380")])
        .with("Sachsen", FeatureKind::Substation, vec![substation("node/2", 100.0, "110000")])
        .with(
            "Brandenburg",
            FeatureKind::Generator,
            vec![generator("node/10", 10.0, "wind_turbine"), generator("node/11", 90.0, "photovoltaic")],
        )
        .with("Sachsen", FeatureKind::Generator, vec![generator("node/12", 95.0, "photovoltaic")]);

    let topology = pipeline(features).run(&names(&["Brandenburg", "Sachsen"])).await.unwrap();

    assert_eq!(topology.substations.len(), 2);
    assert_eq!(topology.substations[0].substation.region, "Brandenburg");
    assert_eq!(topology.substations[1].substation.region, "Sachsen");
    assert_eq!(topology.categories.names(), ["photovoltaic", "wind_turbine"]);

    // Matching is global: a Brandenburg generator may feed a Sachsen substation
    assert_eq!(topology.substations[0].num_generators, 1);
    assert_eq!(topology.substations[1].num_generators, 2);
    assert_eq!(topology.substations[1].breakdown, vec![2, 0]);
    assert_eq!(topology.substations[1].total_capacity_mw, 6.0);
    assert_eq!(topology.links.len(), 3);
}

#[tokio::test]
async fn test_empty_region_list_fails() {
    let err = pipeline(StaticFeatures::default()).run(&[]).await.unwrap_err();
    assert_eq!(err.stage(), Some(Stage::RegionFetch));
}

#[tokio::test]
async fn test_unknown_region_fails_region_fetch() {
    let err = pipeline(StaticFeatures::default()).run(&names(&["Atlantis"])).await.unwrap_err();
    assert_eq!(err.stage(), Some(Stage::RegionFetch));
    assert!(err.to_string().contains("Atlantis"));
}

#[tokio::test]
async fn test_empty_generator_union_fails_feature_query() {
    let features = StaticFeatures::default().with(
        "Sachsen",
        FeatureKind::Substation,
        vec![substation("node/2", 100.0, "110000")],
    );

    let err = pipeline(features).run(&names(&["Sachsen"])).await.unwrap_err();
    assert_eq!(err.stage(), Some(Stage::FeatureQuery));
    match err {
        GridError::StageFailed { source, .. } => {
            assert!(matches!(*source, GridError::EmptyFeatureSet { kind: FeatureKind::Generator }));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_no_qualifying_substation_leaves_generators_unmatched() {
    let features = StaticFeatures::default()
        .with("Sachsen", FeatureKind::Substation, vec![substation("node/2", 0.0, "20")])
        .with("Sachsen", FeatureKind::Generator, vec![generator("node/12", 5.0, "hydro")]);

    let topology = pipeline(features).run(&names(&["Sachsen"])).await.unwrap();
    assert!(topology.substations.is_empty());
    assert!(topology.links.is_empty());
    assert!(topology.generators[0].nearest.is_none());
    assert_eq!(topology.categories.names(), ["hydro"]);
}
