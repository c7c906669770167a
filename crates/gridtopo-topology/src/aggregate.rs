//! Per-substation generator statistics

use crate::models::{CategoryColumns, MatchedGenerator, Substation, SubstationSummary};

/// Summarize the generators matched to each substation.
///
/// Returns one summary per substation in input order, including substations
/// no generator matched (all aggregates zero). `matched` positions refer to
/// `substations`; unmatched generators contribute nothing. The result depends
/// only on the inputs, so repeated calls agree.
pub fn aggregate(
    substations: &[Substation],
    generators: &[MatchedGenerator],
    columns: &CategoryColumns,
) -> Vec<SubstationSummary> {
    let mut summaries: Vec<SubstationSummary> =
        substations.iter().map(|s| SubstationSummary::empty(s.clone(), columns)).collect();

    for matched in generators {
        let Some(nearest) = &matched.nearest else {
            continue;
        };
        let Some(summary) = summaries.get_mut(nearest.substation) else {
            tracing::warn!(
                generator = %matched.generator.id,
                substation = %nearest.substation_id,
                "Match refers to an unknown substation"
            );
            continue;
        };

        summary.num_generators += 1;
        summary.total_capacity_mw += matched.generator.capacity_mw;
        if let Some(column) = columns.position(matched.generator.category_key()) {
            summary.breakdown[column] += 1;
        }
    }

    tracing::info!(
        substations = summaries.len(),
        columns = columns.len(),
        with_generators = summaries.iter().filter(|s| s.num_generators > 0).count(),
        "Aggregated generators per substation"
    );
    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Generator, Match};
    use geo::Point;
    use gridtopo_core::models::{FeatureId, Tags};

    fn substation(id: &str) -> Substation {
        Substation {
            id: FeatureId::from(id),
            location: Point::new(0.0, 0.0),
            region: String::new(),
            name: None,
            voltage: Some(110_000),
            tags: Tags::new(),
        }
    }

    fn matched(id: &str, capacity_mw: f64, category: Option<&str>, slot: Option<usize>) -> MatchedGenerator {
        MatchedGenerator {
            generator: Generator {
                id: FeatureId::from(id),
                location: Point::new(1.0, 1.0),
                region: String::new(),
                name: None,
                capacity_mw,
                category: category.map(str::to_string),
                tags: Tags::new(),
            },
            nearest: slot.map(|s| Match {
                substation: s,
                substation_id: FeatureId::new(format!("s{}", s)),
                distance_m: 1.0,
            }),
        }
    }

    fn fixture() -> (Vec<Substation>, Vec<MatchedGenerator>, CategoryColumns) {
        let subs = vec![substation("s0"), substation("s1"), substation("s2")];
        let gens = vec![
            matched("g1", 2.5, Some("wind_turbine"), Some(0)),
            matched("g2", 0.5, Some("photovoltaic"), Some(0)),
            matched("g3", 1.0, None, Some(0)),
            matched("g4", 3.0, Some("wind_turbine"), Some(2)),
            matched("g5", 7.0, Some("combustion"), None),
        ];
        let columns = CategoryColumns::from_generators(gens.iter().map(|m| &m.generator));
        (subs, gens, columns)
    }

    #[test]
    fn test_group_statistics() {
        let (subs, gens, columns) = fixture();
        let summaries = aggregate(&subs, &gens, &columns);

        assert_eq!(columns.names(), ["combustion", "photovoltaic", "wind_turbine", "unknown"]);

        assert_eq!(summaries[0].num_generators, 3);
        assert_eq!(summaries[0].breakdown, vec![0, 1, 1, 1]);
        assert_eq!(summaries[0].total_capacity_mw, 4.0);

        assert_eq!(summaries[2].num_generators, 1);
        assert_eq!(summaries[2].breakdown, vec![0, 0, 1, 0]);
        assert_eq!(summaries[2].total_capacity_mw, 3.0);
    }

    #[test]
    fn test_unmatched_substation_defaults_to_zero() {
        let (subs, gens, columns) = fixture();
        let summaries = aggregate(&subs, &gens, &columns);

        let empty = &summaries[1];
        assert_eq!(empty.substation.id.as_str(), "s1");
        assert_eq!(empty.num_generators, 0);
        assert_eq!(empty.breakdown, vec![0; 4]);
        assert_eq!(empty.total_capacity_mw, 0.0);
    }

    #[test]
    fn test_unmatched_generators_excluded() {
        let (subs, gens, columns) = fixture();
        let summaries = aggregate(&subs, &gens, &columns);

        let total: usize = summaries.iter().map(|s| s.num_generators).sum();
        assert_eq!(total, 4);
        // combustion only exists on the unmatched generator but still has a column
        assert!(summaries.iter().all(|s| s.breakdown[0] == 0));
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let (subs, gens, columns) = fixture();
        assert_eq!(aggregate(&subs, &gens, &columns), aggregate(&subs, &gens, &columns));
    }

    #[test]
    fn test_empty_generators_give_zero_aggregates() {
        let subs = vec![substation("s0"), substation("s1")];
        let columns = CategoryColumns::from_generators(std::iter::empty());
        let summaries = aggregate(&subs, &[], &columns);

        assert_eq!(summaries.len(), 2);
        for summary in &summaries {
            assert_eq!(summary.num_generators, 0);
            assert!(summary.breakdown.is_empty());
            assert_eq!(summary.total_capacity_mw, 0.0);
        }
    }
}
