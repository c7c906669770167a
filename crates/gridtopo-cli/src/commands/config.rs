use crate::config_loader::load_config;
use crate::output::OutputWriter;
use crate::output_types::{ConfigEntry, ConfigOutput, ConfigRow};
use anyhow::Result;
use std::path::Path;

/// Show every setting with the layer it came from
pub fn execute(config_path: Option<&Path>, output: &OutputWriter) -> Result<()> {
    let config = load_config(config_path)?;

    let mut entries: Vec<ConfigEntry> = config
        .to_inspection_map()
        .into_iter()
        .map(|(key, (value, source))| ConfigEntry { key, value, source: format!("{:?}", source) })
        .collect();
    entries.sort_by(|a, b| a.key.cmp(&b.key));

    if output.is_json() {
        return output.result(ConfigOutput { entries });
    }

    output.section("Configuration");
    output.table(entries.iter().map(ConfigRow::from).collect());

    output.section("Configuration Precedence");
    output.info("CLI arguments > Environment variables (GRIDTOPO_*) > gridtopo.toml > Defaults");

    if let Err(e) = config.validate() {
        output.warning(format!("Configuration is not runnable: {}", e));
    }

    Ok(())
}
