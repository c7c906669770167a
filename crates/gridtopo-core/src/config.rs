use crate::error::{GridError, Result};
use crate::models::{Crs, ValidityMode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Minimum voltage for a transmission-grade substation, in volts
pub const DEFAULT_VOLTAGE_THRESHOLD: u64 = 110_000;

/// GADM 4.1 level-1 boundaries for Germany
pub const DEFAULT_GADM_URL: &str = "https://geodata.ucdavis.edu/gadm/gadm4.1/json/gadm41_DEU_1.json";

pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered configuration for a topology run
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub regions: ConfigValue<Vec<String>>,
    pub voltage_threshold: ConfigValue<u64>,
    pub crs: ConfigValue<u32>,
    pub export_crs: ConfigValue<Option<u32>>,
    pub geometry_validity: ConfigValue<ValidityMode>,
    pub output_dir: ConfigValue<PathBuf>,
    pub gadm_url: ConfigValue<String>,
    pub overpass_url: ConfigValue<String>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            regions: ConfigValue::new(
                vec!["Brandenburg".to_string(), "Sachsen".to_string()],
                ConfigSource::Default,
            ),
            voltage_threshold: ConfigValue::new(DEFAULT_VOLTAGE_THRESHOLD, ConfigSource::Default),
            crs: ConfigValue::new(3857, ConfigSource::Default),
            export_crs: ConfigValue::new(None, ConfigSource::Default),
            geometry_validity: ConfigValue::new(ValidityMode::Lenient, ConfigSource::Default),
            output_dir: ConfigValue::new(PathBuf::from("./output"), ConfigSource::Default),
            gadm_url: ConfigValue::new(DEFAULT_GADM_URL.to_string(), ConfigSource::Default),
            overpass_url: ConfigValue::new(DEFAULT_OVERPASS_URL.to_string(), ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| GridError::ConfigInvalid {
            key: "file".to_string(),
            reason: format!("Failed to read config file {}: {}", path.as_ref().display(), e),
        })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| GridError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(regions) = file_config.regions {
            self.regions.update(regions, ConfigSource::File);
        }

        if let Some(threshold) = file_config.voltage_threshold {
            self.voltage_threshold.update(threshold, ConfigSource::File);
        }

        if let Some(crs) = file_config.crs {
            self.crs.update(crs, ConfigSource::File);
        }

        if let Some(export_crs) = file_config.export_crs {
            self.export_crs.update(Some(export_crs), ConfigSource::File);
        }

        if let Some(geometry_validity) = file_config.geometry_validity {
            self.geometry_validity.update(geometry_validity, ConfigSource::File);
        }

        if let Some(output_dir) = file_config.output_dir {
            self.output_dir.update(output_dir, ConfigSource::File);
        }

        if let Some(gadm_url) = file_config.gadm_url {
            self.gadm_url.update(gadm_url, ConfigSource::File);
        }

        if let Some(overpass_url) = file_config.overpass_url {
            self.overpass_url.update(overpass_url, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from a TOML file if it exists
    pub fn load_from_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self> {
        if path.as_ref().exists() {
            self.load_from_file(path)
        } else {
            tracing::debug!("No config file at {}", path.as_ref().display());
            Ok(self)
        }
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // GRIDTOPO_REGIONS
        if let Ok(regions_str) = env::var("GRIDTOPO_REGIONS") {
            let regions = parse_region_list(&regions_str);
            if regions.is_empty() {
                tracing::warn!("Ignoring empty GRIDTOPO_REGIONS value");
            } else {
                self.regions.update(regions, ConfigSource::Environment);
            }
        }

        // GRIDTOPO_VOLTAGE_THRESHOLD
        if let Ok(threshold_str) = env::var("GRIDTOPO_VOLTAGE_THRESHOLD") {
            match threshold_str.parse::<u64>() {
                Ok(threshold) => {
                    self.voltage_threshold.update(threshold, ConfigSource::Environment)
                }
                Err(_) => tracing::warn!(
                    "Invalid GRIDTOPO_VOLTAGE_THRESHOLD value '{}': expected volts as integer",
                    threshold_str
                ),
            }
        }

        // GRIDTOPO_CRS
        if let Ok(crs_str) = env::var("GRIDTOPO_CRS") {
            match crs_str.parse::<u32>() {
                Ok(crs) => self.crs.update(crs, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GRIDTOPO_CRS value '{}': expected integer EPSG code",
                    crs_str
                ),
            }
        }

        // GRIDTOPO_EXPORT_CRS
        if let Ok(crs_str) = env::var("GRIDTOPO_EXPORT_CRS") {
            match crs_str.parse::<u32>() {
                Ok(crs) => self.export_crs.update(Some(crs), ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GRIDTOPO_EXPORT_CRS value '{}': expected integer EPSG code",
                    crs_str
                ),
            }
        }

        // GRIDTOPO_GEOMETRY_VALIDITY
        if let Ok(validity_str) = env::var("GRIDTOPO_GEOMETRY_VALIDITY") {
            match parse_validity_mode(&validity_str) {
                Ok(validity) => self.geometry_validity.update(validity, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GRIDTOPO_GEOMETRY_VALIDITY value '{}': expected strict or lenient",
                    validity_str
                ),
            }
        }

        // GRIDTOPO_OUTPUT_DIR
        if let Ok(output_dir) = env::var("GRIDTOPO_OUTPUT_DIR") {
            self.output_dir.update(PathBuf::from(output_dir), ConfigSource::Environment);
        }

        // GRIDTOPO_GADM_URL
        if let Ok(url) = env::var("GRIDTOPO_GADM_URL") {
            self.gadm_url.update(url, ConfigSource::Environment);
        }

        // GRIDTOPO_OVERPASS_URL
        if let Ok(url) = env::var("GRIDTOPO_OVERPASS_URL") {
            self.overpass_url.update(url, ConfigSource::Environment);
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(regions) = overrides.regions {
            self.regions.update(regions, ConfigSource::Cli);
        }

        if let Some(threshold) = overrides.voltage_threshold {
            self.voltage_threshold.update(threshold, ConfigSource::Cli);
        }

        if let Some(crs) = overrides.crs {
            self.crs.update(crs, ConfigSource::Cli);
        }

        if let Some(export_crs) = overrides.export_crs {
            self.export_crs.update(Some(export_crs), ConfigSource::Cli);
        }

        if let Some(geometry_validity) = overrides.geometry_validity {
            self.geometry_validity.update(geometry_validity, ConfigSource::Cli);
        }

        if let Some(output_dir) = overrides.output_dir {
            self.output_dir.update(output_dir, ConfigSource::Cli);
        }
    }

    /// Working CRS used for all distance arithmetic
    pub fn working_crs(&self) -> Crs {
        Crs::epsg(self.crs.value)
    }

    /// CRS of written files
    pub fn export_crs(&self) -> Crs {
        Crs::epsg(self.export_crs.value.unwrap_or(self.crs.value))
    }

    /// Reject settings that would make the run meaningless
    pub fn validate(&self) -> Result<()> {
        let working = self.working_crs();
        if working.is_geographic() {
            return Err(GridError::ConfigInvalid {
                key: "crs".to_string(),
                reason: format!(
                    "{} is geographic; distances need a projected metric CRS such as EPSG:3857 or EPSG:25833",
                    working
                ),
            });
        }

        if self.voltage_threshold.value == 0 {
            return Err(GridError::ConfigInvalid {
                key: "voltage_threshold".to_string(),
                reason: "Threshold must be a positive number of volts".to_string(),
            });
        }

        Ok(())
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert(
            "regions".to_string(),
            (self.regions.value.join(", "), self.regions.source),
        );

        map.insert(
            "voltage_threshold".to_string(),
            (format!("{} V", self.voltage_threshold.value), self.voltage_threshold.source),
        );

        map.insert("crs".to_string(), (format!("EPSG:{}", self.crs.value), self.crs.source));

        map.insert(
            "export_crs".to_string(),
            (format!("EPSG:{}", self.export_crs().epsg), self.export_crs.source),
        );

        map.insert(
            "geometry_validity".to_string(),
            (format!("{:?}", self.geometry_validity.value), self.geometry_validity.source),
        );

        map.insert(
            "output_dir".to_string(),
            (self.output_dir.value.display().to_string(), self.output_dir.source),
        );

        map.insert("gadm_url".to_string(), (self.gadm_url.value.clone(), self.gadm_url.source));

        map.insert(
            "overpass_url".to_string(),
            (self.overpass_url.value.clone(), self.overpass_url.source),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    regions: Option<Vec<String>>,
    voltage_threshold: Option<u64>,
    crs: Option<u32>,
    export_crs: Option<u32>,
    geometry_validity: Option<ValidityMode>,
    output_dir: Option<PathBuf>,
    gadm_url: Option<String>,
    overpass_url: Option<String>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub regions: Option<Vec<String>>,
    pub voltage_threshold: Option<u64>,
    pub crs: Option<u32>,
    pub export_crs: Option<u32>,
    pub geometry_validity: Option<ValidityMode>,
    pub output_dir: Option<PathBuf>,
}

/// Split a comma separated region list, dropping blanks
pub fn parse_region_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse validity mode from string
pub fn parse_validity_mode(s: &str) -> Result<ValidityMode> {
    match s.to_lowercase().as_str() {
        "strict" => Ok(ValidityMode::Strict),
        "lenient" => Ok(ValidityMode::Lenient),
        _ => Err(GridError::ConfigInvalid {
            key: "geometry_validity".to_string(),
            reason: format!("Invalid validity mode: {}. Use strict or lenient", s),
        }),
    }
}
