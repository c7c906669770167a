//! Gridtopo Topology - Substation/generator association and aggregation
//!
//! Filters substations by voltage, matches every generator to its nearest
//! substation, summarizes generators per substation and draws the links.

pub mod aggregate;
pub mod builder;
pub mod filter;
pub mod links;
pub mod matcher;
pub mod models;
pub mod pipeline;

pub use aggregate::aggregate;
pub use builder::TopologyBuilder;
pub use filter::VoltageFilter;
pub use links::{link, synthesize_links};
pub use matcher::NearestSubstationMatcher;
pub use models::{
    BuildReport, CategoryColumns, Generator, GridTopology, Link, Match, MatchedGenerator, Substation,
    SubstationSummary,
};
pub use pipeline::{union_regions, GridPipeline};
