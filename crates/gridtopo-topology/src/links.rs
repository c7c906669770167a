//! Straight-line connectors between matched pairs

use geo::{LineString, Point};
use gridtopo_core::models::FeatureId;

use crate::models::{Link, MatchedGenerator, Substation};

/// Build the connector for one match
pub fn link(
    generator_id: &FeatureId,
    substation_id: &FeatureId,
    from: Point,
    to: Point,
    capacity_mw: f64,
) -> Link {
    Link {
        generator_id: generator_id.clone(),
        substation_id: substation_id.clone(),
        capacity_mw,
        geometry: LineString::from(vec![from.0, to.0]),
    }
}

/// One link per matched generator, in generator order
pub fn synthesize_links(generators: &[MatchedGenerator], substations: &[Substation]) -> Vec<Link> {
    let links: Vec<Link> = generators
        .iter()
        .filter_map(|matched| {
            let nearest = matched.nearest.as_ref()?;
            let substation = substations.get(nearest.substation)?;
            Some(link(
                &matched.generator.id,
                &substation.id,
                matched.generator.location,
                substation.location,
                matched.generator.capacity_mw,
            ))
        })
        .collect();

    tracing::info!(links = links.len(), "Synthesized generator links");
    links
}
