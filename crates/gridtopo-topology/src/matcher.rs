//! Nearest-substation matching

use gridtopo_core::error::Result;
use gridtopo_core::models::Crs;
use gridtopo_geo::{check_crs_match, PointIndex};

use crate::models::{Generator, Match, MatchedGenerator, Substation};

/// Matches generators to the closest substation of a fixed set.
///
/// The index is built once and never changes, so each generator's match
/// depends only on its own location.
pub struct NearestSubstationMatcher {
    index: PointIndex,
    crs: Crs,
}

impl NearestSubstationMatcher {
    /// Index `substations`, whose locations are in `crs`
    pub fn new(substations: &[Substation], crs: &Crs) -> Self {
        let index = PointIndex::new(substations.iter().map(|s| (s.id.clone(), s.location)));
        Self { index, crs: crs.clone() }
    }

    /// Nearest substation of a single point, `None` when the set is empty
    pub fn nearest(&self, generator: &Generator) -> Option<Match> {
        self.index.nearest(generator.location).map(|hit| Match {
            substation: hit.slot,
            substation_id: hit.id.clone(),
            distance_m: hit.distance,
        })
    }

    /// Match every generator; fails if the generators are in another CRS
    pub fn match_all(&self, generators: Vec<Generator>, crs: &Crs) -> Result<Vec<MatchedGenerator>> {
        check_crs_match(&self.crs, crs)?;

        let matched: Vec<MatchedGenerator> = generators
            .into_iter()
            .map(|generator| {
                let nearest = self.nearest(&generator);
                if let Some(m) = &nearest {
                    tracing::debug!(
                        generator = %generator.id,
                        substation = %m.substation_id,
                        distance_m = m.distance_m,
                        "Matched generator"
                    );
                }
                MatchedGenerator { generator, nearest }
            })
            .collect();

        let unmatched = matched.iter().filter(|m| !m.is_matched()).count();
        if unmatched > 0 {
            tracing::warn!(unmatched, "Generators left without a substation");
        }
        tracing::info!(
            generators = matched.len(),
            substations = self.index.len(),
            crs = %self.crs,
            "Matched generators to nearest substations"
        );

        Ok(matched)
    }
}
