use gridtopo_topology::{BuildReport, GridTopology, SubstationSummary};
use serde::Serialize;
use tabled::Tabled;

/// Output for the run command
#[derive(Debug, Serialize)]
pub struct RunOutput {
    pub regions: Vec<String>,
    pub crs: u32,
    pub export_crs: u32,
    pub voltage_threshold: u64,
    pub report: BuildReport,
    pub links: usize,
    pub categories: Vec<String>,
    pub files: OutputFilesInfo,
    pub top_substations: Vec<SubstationInfo>,
}

#[derive(Debug, Serialize)]
pub struct OutputFilesInfo {
    pub substations: String,
    pub generators: String,
    pub lines: String,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubstationInfo {
    pub id: String,
    pub name: Option<String>,
    pub region: String,
    pub voltage: Option<u64>,
    pub num_generators: usize,
    pub total_capacity_mw: f64,
}

impl SubstationInfo {
    pub fn from_summary(summary: &SubstationSummary) -> Self {
        let substation = &summary.substation;
        Self {
            id: substation.id.to_string(),
            name: substation.name.clone(),
            region: substation.region.clone(),
            voltage: substation.voltage,
            num_generators: summary.num_generators,
            total_capacity_mw: summary.total_capacity_mw,
        }
    }
}

/// Substations with the most generators, then the most capacity, then by id
pub fn top_substations(topology: &GridTopology, limit: usize) -> Vec<SubstationInfo> {
    let mut ranked: Vec<&SubstationSummary> =
        topology.substations.iter().filter(|s| s.num_generators > 0).collect();
    ranked.sort_by(|a, b| {
        b.num_generators
            .cmp(&a.num_generators)
            .then_with(|| b.total_capacity_mw.total_cmp(&a.total_capacity_mw))
            .then_with(|| a.substation.id.cmp(&b.substation.id))
    });
    ranked.into_iter().take(limit).map(SubstationInfo::from_summary).collect()
}

/// Table row for the human-readable run summary
#[derive(Tabled)]
pub struct SubstationRow {
    #[tabled(rename = "Substation")]
    pub id: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Region")]
    pub region: String,
    #[tabled(rename = "Voltage (V)")]
    pub voltage: String,
    #[tabled(rename = "Generators")]
    pub num_generators: usize,
    #[tabled(rename = "Capacity (MW)")]
    pub capacity: String,
}

impl From<&SubstationInfo> for SubstationRow {
    fn from(info: &SubstationInfo) -> Self {
        Self {
            id: info.id.clone(),
            name: info.name.clone().unwrap_or_else(|| "-".to_string()),
            region: info.region.clone(),
            voltage: info.voltage.map_or_else(|| "-".to_string(), |v| v.to_string()),
            num_generators: info.num_generators,
            capacity: format!("{:.2}", info.total_capacity_mw),
        }
    }
}

/// Output for the config command
#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    pub entries: Vec<ConfigEntry>,
}

#[derive(Debug, Serialize)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
    pub source: String,
}

#[derive(Tabled)]
pub struct ConfigRow {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Source")]
    pub source: String,
}

impl From<&ConfigEntry> for ConfigRow {
    fn from(entry: &ConfigEntry) -> Self {
        Self { key: entry.key.clone(), value: entry.value.clone(), source: entry.source.clone() }
    }
}
