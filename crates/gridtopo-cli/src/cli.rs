use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Gridtopo - Power-grid topology from OpenStreetMap
#[derive(Parser, Debug)]
#[command(name = "gridtopo")]
#[command(about = "Match generators to their nearest transmission substation", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Show planned actions without executing them
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Configuration file (defaults to ./gridtopo.toml if present)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch features, build the topology and write GeoJSON outputs
    Run(RunArgs),

    /// Show the effective configuration and where each value comes from
    Config,
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Region names, comma separated (e.g. "Brandenburg,Sachsen")
    #[arg(long, value_delimiter = ',')]
    pub regions: Option<Vec<String>>,

    /// Minimum substation voltage in volts
    #[arg(long, value_name = "VOLTS")]
    pub voltage_threshold: Option<u64>,

    /// Working CRS EPSG code; must be projected
    #[arg(long, value_name = "EPSG")]
    pub crs: Option<u32>,

    /// EPSG code of the written files (defaults to the working CRS)
    #[arg(long, value_name = "EPSG")]
    pub export_crs: Option<u32>,

    /// Output directory
    #[arg(long, short = 'o', value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Fail on the first invalid geometry instead of dropping it
    #[arg(long)]
    pub strict: bool,

    /// Region boundaries as GeoJSON (offline mode)
    #[arg(long, value_name = "FILE", requires_all = ["substations_file", "generators_file"])]
    pub regions_file: Option<PathBuf>,

    /// Substation features as GeoJSON (offline mode)
    #[arg(long, value_name = "FILE", requires_all = ["regions_file", "generators_file"])]
    pub substations_file: Option<PathBuf>,

    /// Generator features as GeoJSON (offline mode)
    #[arg(long, value_name = "FILE", requires_all = ["regions_file", "substations_file"])]
    pub generators_file: Option<PathBuf>,

    /// Boundary property holding the region name
    #[arg(long, default_value = "NAME_1")]
    pub region_property: String,

    /// Server-side Overpass timeout in seconds
    #[arg(long, default_value = "180", value_name = "SECS")]
    pub overpass_timeout: u64,

    /// Number of substations listed in the summary table
    #[arg(long, default_value = "10")]
    pub top: usize,
}

impl RunArgs {
    /// Local files for an offline run, when all three are given
    pub fn offline_files(&self) -> Option<(&PathBuf, &PathBuf, &PathBuf)> {
        match (&self.regions_file, &self.substations_file, &self.generators_file) {
            (Some(r), Some(s), Some(g)) => Some((r, s, g)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_flags() {
        let cli = Cli::parse_from([
            "gridtopo",
            "--json",
            "run",
            "--regions",
            "Brandenburg,Sachsen",
            "--voltage-threshold",
            "220000",
            "--strict",
        ]);

        assert!(cli.json);
        let Commands::Run(args) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(args.regions, Some(vec!["Brandenburg".to_string(), "Sachsen".to_string()]));
        assert_eq!(args.voltage_threshold, Some(220_000));
        assert!(args.strict);
        assert!(args.offline_files().is_none());
        assert_eq!(args.top, 10);
    }

    #[test]
    fn test_offline_files_require_each_other() {
        let result = Cli::try_parse_from(["gridtopo", "run", "--regions-file", "regions.geojson"]);
        assert!(result.is_err());
    }
}
