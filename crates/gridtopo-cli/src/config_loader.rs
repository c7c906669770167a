//! Configuration loading utilities for CLI commands

use anyhow::{Context, Result};
use gridtopo_core::config::{CliConfigOverrides, LayeredConfig};
use std::path::Path;

/// Config file picked up from the working directory
pub const DEFAULT_CONFIG_FILE: &str = "gridtopo.toml";

/// Load defaults, then the config file, then `GRIDTOPO_*` variables.
///
/// An explicit `--config` path must exist; the default file is optional.
pub fn load_config(explicit: Option<&Path>) -> Result<LayeredConfig> {
    let config = LayeredConfig::with_defaults();
    let config = match explicit {
        Some(path) => config
            .load_from_file(path)
            .with_context(|| format!("Failed to load configuration file {}", path.display()))?,
        None => config
            .load_from_optional_file(DEFAULT_CONFIG_FILE)
            .context("Failed to load configuration file")?,
    };

    Ok(config.load_from_env())
}

/// Load layered configuration with CLI overrides
pub fn load_config_with_overrides(
    explicit: Option<&Path>,
    overrides: CliConfigOverrides,
) -> Result<LayeredConfig> {
    let mut config = load_config(explicit)?;
    config.update_from_cli(overrides);
    Ok(config)
}
