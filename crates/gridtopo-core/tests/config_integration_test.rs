//! Integration tests for layered configuration
//!
//! These tests verify that configuration loading follows the correct precedence:
//! CLI arguments > Environment variables > Config file > Defaults

use gridtopo_core::config::{CliConfigOverrides, ConfigSource, LayeredConfig};
use gridtopo_core::models::ValidityMode;
use serial_test::serial;
use std::env;
use std::io::Write;
use tempfile::NamedTempFile;

const ENV_VARS: &[&str] = &[
    "GRIDTOPO_REGIONS",
    "GRIDTOPO_VOLTAGE_THRESHOLD",
    "GRIDTOPO_CRS",
    "GRIDTOPO_EXPORT_CRS",
    "GRIDTOPO_GEOMETRY_VALIDITY",
    "GRIDTOPO_OUTPUT_DIR",
    "GRIDTOPO_GADM_URL",
    "GRIDTOPO_OVERPASS_URL",
];

fn clear_env() {
    for var in ENV_VARS {
        env::remove_var(var);
    }
}

fn config_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", content).unwrap();
    file
}

#[test]
#[serial]
fn test_env_overrides_file() {
    clear_env();
    let file = config_file("voltage_threshold = 220000\ncrs = 25833");

    env::set_var("GRIDTOPO_VOLTAGE_THRESHOLD", "380000");
    env::set_var("GRIDTOPO_REGIONS", "Berlin, Brandenburg");

    let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap().load_from_env();

    assert_eq!(config.voltage_threshold.value, 380_000);
    assert_eq!(config.voltage_threshold.source, ConfigSource::Environment);
    assert_eq!(config.regions.value, vec!["Berlin", "Brandenburg"]);
    // File value survives where env is silent
    assert_eq!(config.crs.value, 25833);
    assert_eq!(config.crs.source, ConfigSource::File);

    clear_env();
}

#[test]
#[serial]
fn test_cli_overrides_env() {
    clear_env();
    env::set_var("GRIDTOPO_CRS", "25832");
    env::set_var("GRIDTOPO_GEOMETRY_VALIDITY", "strict");

    let mut config = LayeredConfig::with_defaults().load_from_env();
    config.update_from_cli(CliConfigOverrides { crs: Some(25833), ..Default::default() });

    assert_eq!(config.crs.value, 25833);
    assert_eq!(config.crs.source, ConfigSource::Cli);
    assert_eq!(config.geometry_validity.value, ValidityMode::Strict);
    assert_eq!(config.geometry_validity.source, ConfigSource::Environment);

    clear_env();
}

#[test]
#[serial]
fn test_invalid_env_values_are_ignored() {
    clear_env();
    env::set_var("GRIDTOPO_VOLTAGE_THRESHOLD", "110kV");
    env::set_var("GRIDTOPO_CRS", "web-mercator");
    env::set_var("GRIDTOPO_REGIONS", " , ");
    env::set_var("GRIDTOPO_GEOMETRY_VALIDITY", "sometimes");

    let config = LayeredConfig::with_defaults().load_from_env();

    assert_eq!(config.voltage_threshold.value, 110_000);
    assert_eq!(config.voltage_threshold.source, ConfigSource::Default);
    assert_eq!(config.crs.source, ConfigSource::Default);
    assert_eq!(config.regions.source, ConfigSource::Default);
    assert_eq!(config.geometry_validity.value, ValidityMode::Lenient);

    clear_env();
}

#[test]
#[serial]
fn test_env_endpoints_and_export_crs() {
    clear_env();
    env::set_var("GRIDTOPO_OVERPASS_URL", "http://localhost:12345/api/interpreter");
    env::set_var("GRIDTOPO_EXPORT_CRS", "4326");

    let config = LayeredConfig::with_defaults().load_from_env();

    assert_eq!(config.overpass_url.value, "http://localhost:12345/api/interpreter");
    assert_eq!(config.export_crs().epsg, 4326);
    assert_eq!(config.working_crs().epsg, 3857);

    clear_env();
}
