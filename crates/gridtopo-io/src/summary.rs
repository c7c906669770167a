use chrono::{DateTime, Utc};
use gridtopo_topology::{BuildReport, GridTopology};
use serde::{Deserialize, Serialize};

/// Machine-readable record of one run, written as `summary.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub generated_at: DateTime<Utc>,
    pub regions: Vec<String>,

    /// Working CRS (EPSG)
    pub crs: u32,

    /// CRS of the written files (EPSG)
    pub export_crs: u32,

    /// Minimum substation voltage in volts
    pub voltage_threshold: u64,

    #[serde(flatten)]
    pub report: BuildReport,

    pub links: usize,
    pub total_capacity_mw: f64,
    pub categories: Vec<String>,
}

impl RunSummary {
    pub fn new(
        topology: &GridTopology,
        regions: &[String],
        voltage_threshold: u64,
        export_crs: Option<u32>,
    ) -> Self {
        Self {
            generated_at: Utc::now(),
            regions: regions.to_vec(),
            crs: topology.crs.epsg,
            export_crs: export_crs.unwrap_or(topology.crs.epsg),
            voltage_threshold,
            report: topology.report,
            links: topology.links.len(),
            total_capacity_mw: topology.substations.iter().map(|s| s.total_capacity_mw).sum(),
            categories: topology.categories.names().to_vec(),
        }
    }
}
