//! Association-and-aggregation core over fetched feature sets

use gridtopo_core::config::DEFAULT_VOLTAGE_THRESHOLD;
use gridtopo_core::error::{Result, Stage};
use gridtopo_core::models::{Crs, FeatureSet, ValidityMode};
use gridtopo_geo::reduce_features;

use crate::aggregate::aggregate;
use crate::filter::VoltageFilter;
use crate::links::synthesize_links;
use crate::matcher::NearestSubstationMatcher;
use crate::models::{BuildReport, CategoryColumns, Generator, GridTopology, Substation};

/// Builds a [`GridTopology`] from raw substation and generator features
#[derive(Debug, Clone)]
pub struct TopologyBuilder {
    crs: Crs,
    filter: VoltageFilter,
    validity: ValidityMode,
}

impl TopologyBuilder {
    /// Builder working in `crs` with the default voltage threshold
    pub fn new(crs: Crs) -> Self {
        Self {
            crs,
            filter: VoltageFilter::new(DEFAULT_VOLTAGE_THRESHOLD),
            validity: ValidityMode::default(),
        }
    }

    pub fn with_voltage_threshold(mut self, min_voltage: u64) -> Self {
        self.filter = VoltageFilter::new(min_voltage);
        self
    }

    pub fn with_validity(mut self, validity: ValidityMode) -> Self {
        self.validity = validity;
        self
    }

    pub fn crs(&self) -> &Crs {
        &self.crs
    }

    pub fn voltage_threshold(&self) -> u64 {
        self.filter.min_voltage
    }

    /// Run reduce, normalize, filter, match, aggregate and link.
    ///
    /// An empty generator set is fine: every substation gets zero aggregates
    /// and no links are produced.
    pub fn build(&self, substations: &FeatureSet, generators: &FeatureSet) -> Result<GridTopology> {
        let reduced_substations = reduce_features(substations, &self.crs, self.validity)
            .map_err(|e| e.at_stage(Stage::Reduce))?;
        let reduced_generators = reduce_features(generators, &self.crs, self.validity)
            .map_err(|e| e.at_stage(Stage::Reduce))?;

        let dropped_invalid = reduced_substations.dropped + reduced_generators.dropped;
        let generator_crs = reduced_generators.crs.clone();

        let all_substations: Vec<Substation> =
            reduced_substations.features.into_iter().map(Substation::from_reduced).collect();
        let all_generators: Vec<Generator> =
            reduced_generators.features.into_iter().map(Generator::from_reduced).collect();
        let substations_in = all_substations.len();
        let generators_in = all_generators.len();

        let kept = self.filter.apply(all_substations);

        let matcher = NearestSubstationMatcher::new(&kept, &reduced_substations.crs);
        let matched = matcher
            .match_all(all_generators, &generator_crs)
            .map_err(|e| e.at_stage(Stage::Match))?;

        // Column schema is fixed from every generator before any grouping
        let categories = CategoryColumns::from_generators(matched.iter().map(|m| &m.generator));
        let summaries = aggregate(&kept, &matched, &categories);

        let links = synthesize_links(&matched, &kept);

        let report = BuildReport {
            substations_in,
            substations_kept: kept.len(),
            generators_in,
            generators_matched: links.len(),
            dropped_invalid,
        };
        tracing::info!(
            substations = report.substations_kept,
            generators = report.generators_in,
            links = links.len(),
            crs = %self.crs,
            "Built grid topology"
        );

        Ok(GridTopology {
            crs: self.crs.clone(),
            categories,
            substations: summaries,
            generators: matched,
            links,
            report,
        })
    }
}
