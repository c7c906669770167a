use crate::cli::RunArgs;
use crate::config_loader::load_config_with_overrides;
use crate::dry_run::{display_planned_actions, ActionType, PlannedAction};
use crate::errors::{from_grid_error, incomplete_offline_inputs};
use crate::output::OutputWriter;
use crate::output_types::{top_substations, OutputFilesInfo, RunOutput, SubstationRow};
use crate::progress::{create_spinner, finish_error, finish_success};
use anyhow::Result;
use gridtopo_core::config::{CliConfigOverrides, LayeredConfig};
use gridtopo_core::error::GridError;
use gridtopo_core::models::{Crs, ValidityMode};
use gridtopo_core::ports::{FeatureSource, RegionSource};
use gridtopo_io::{
    GadmRegionSource, GeoJsonFeatureSource, GeoJsonRegionSource, GeoJsonWriter,
    OverpassFeatureSource, RunSummary,
};
use gridtopo_topology::{GridPipeline, GridTopology, TopologyBuilder};
use std::path::Path;

pub async fn execute(
    args: RunArgs,
    config_path: Option<&Path>,
    output: &OutputWriter,
    dry_run: bool,
) -> Result<()> {
    let overrides = CliConfigOverrides {
        regions: args.regions.clone(),
        voltage_threshold: args.voltage_threshold,
        crs: args.crs,
        export_crs: args.export_crs,
        geometry_validity: args.strict.then_some(ValidityMode::Strict),
        output_dir: args.output.clone(),
    };
    let config = load_config_with_overrides(config_path, overrides)?;
    config.validate().map_err(|e| from_grid_error(&e))?;

    let any_offline =
        args.regions_file.is_some() || args.substations_file.is_some() || args.generators_file.is_some();
    if any_offline && args.offline_files().is_none() {
        return Err(incomplete_offline_inputs().into());
    }

    if dry_run {
        return display_planned_actions(output, &planned_actions(&args, &config));
    }

    let builder = TopologyBuilder::new(config.working_crs())
        .with_voltage_threshold(config.voltage_threshold.value)
        .with_validity(config.geometry_validity.value);

    let topology = match args.offline_files() {
        Some((regions, substations, generators)) => {
            let region_source =
                GeoJsonRegionSource::new(regions).with_name_property(args.region_property.as_str());
            let feature_source =
                GeoJsonFeatureSource::open(substations, generators).map_err(|e| from_grid_error(&e))?;
            build(GridPipeline::new(region_source, feature_source, builder), &config, output).await?
        }
        None => {
            let region_source = GadmRegionSource::new(config.gadm_url.value.as_str())
                .with_name_property(args.region_property.as_str());
            let feature_source = OverpassFeatureSource::new(config.overpass_url.value.as_str())
                .with_timeout(args.overpass_timeout);
            build(GridPipeline::new(region_source, feature_source, builder), &config, output).await?
        }
    };

    let export_crs = config.export_crs();
    let writer = GeoJsonWriter::new(&config.output_dir.value).with_export_crs(Some(export_crs.clone()));
    let files = writer.write(&topology).map_err(|e| from_grid_error(&e))?;

    let summary = RunSummary::new(
        &topology,
        &config.regions.value,
        config.voltage_threshold.value,
        Some(export_crs.epsg),
    );
    let summary_path = writer.write_summary(&summary).map_err(|e| from_grid_error(&e))?;

    let result = RunOutput {
        regions: config.regions.value.clone(),
        crs: topology.crs.epsg,
        export_crs: export_crs.epsg,
        voltage_threshold: config.voltage_threshold.value,
        report: topology.report,
        links: topology.links.len(),
        categories: topology.categories.names().to_vec(),
        files: OutputFilesInfo {
            substations: files.substations.display().to_string(),
            generators: files.generators.display().to_string(),
            lines: files.lines.display().to_string(),
            summary: summary_path.display().to_string(),
        },
        top_substations: top_substations(&topology, args.top),
    };

    if output.is_json() {
        return output.result(result);
    }

    display_run(output, &result, &export_crs);
    Ok(())
}

async fn build<R, F>(
    pipeline: GridPipeline<R, F>,
    config: &LayeredConfig,
    output: &OutputWriter,
) -> Result<GridTopology>
where
    R: RegionSource,
    F: FeatureSource,
{
    let regions = &config.regions.value;
    let spinner = create_spinner(
        &format!("Building topology for {}...", regions.join(", ")),
        !output.is_json(),
    );

    match pipeline.run(regions).await {
        Ok(topology) => {
            finish_success(
                &spinner,
                &format!(
                    "Matched {} of {} generators to {} substations",
                    topology.report.generators_matched,
                    topology.report.generators_in,
                    topology.report.substations_kept
                ),
            );
            Ok(topology)
        }
        Err(e) => {
            finish_error(&spinner, "Topology build failed");
            Err(cli_error(e))
        }
    }
}

fn cli_error(error: GridError) -> anyhow::Error {
    from_grid_error(&error).into()
}

fn planned_actions(args: &RunArgs, config: &LayeredConfig) -> Vec<PlannedAction> {
    let regions = config.regions.value.join(", ");
    let output_dir = &config.output_dir.value;

    let (fetch, query) = match args.offline_files() {
        Some((regions_file, substations, generators)) => (
            PlannedAction::new(ActionType::FetchRegions, format!("Select regions: {}", regions))
                .with_detail(format!("File: {}", regions_file.display()))
                .with_detail(format!("Name property: {}", args.region_property)),
            PlannedAction::new(ActionType::QueryFeatures, "Load substations and generators")
                .with_detail(format!("Substations: {}", substations.display()))
                .with_detail(format!("Generators: {}", generators.display())),
        ),
        None => (
            PlannedAction::new(ActionType::FetchRegions, format!("Download regions: {}", regions))
                .with_detail(format!("URL: {}", config.gadm_url.value))
                .with_detail(format!("Name property: {}", args.region_property)),
            PlannedAction::new(ActionType::QueryFeatures, "Query substations and generators per region")
                .with_detail(format!("Endpoint: {}", config.overpass_url.value))
                .with_detail(format!("Timeout: {} s", args.overpass_timeout)),
        ),
    };

    vec![
        fetch,
        query,
        PlannedAction::new(ActionType::BuildTopology, "Match generators to nearest substations")
            .with_detail(format!("Working CRS: EPSG:{}", config.crs.value))
            .with_detail(format!("Voltage threshold: {} V", config.voltage_threshold.value))
            .with_detail(format!("Geometry validity: {:?}", config.geometry_validity.value)),
        PlannedAction::new(ActionType::CreateDirectory, format!("Create {}", output_dir.display())),
        PlannedAction::new(ActionType::WriteFile, "Write GeoJSON outputs and summary")
            .with_detail(format!("Export CRS: EPSG:{}", config.export_crs().epsg))
            .with_detail(format!("Files: {}", output_file_names().join(", "))),
    ]
}

fn output_file_names() -> Vec<&'static str> {
    vec![
        gridtopo_io::writer::SUBSTATIONS_FILE,
        gridtopo_io::writer::GENERATORS_FILE,
        gridtopo_io::writer::LINES_FILE,
        gridtopo_io::writer::SUMMARY_FILE,
    ]
}

fn display_run(output: &OutputWriter, result: &RunOutput, export_crs: &Crs) {
    output.section("Topology");
    output.kv("Regions", result.regions.join(", "));
    output.kv("Working CRS", format!("EPSG:{}", result.crs));
    output.kv("Voltage threshold", format!("{} V", result.voltage_threshold));
    output.kv(
        "Substations",
        format!("{} of {} kept", result.report.substations_kept, result.report.substations_in),
    );
    output.kv(
        "Generators",
        format!("{} of {} matched", result.report.generators_matched, result.report.generators_in),
    );
    output.kv("Links", result.links);
    if result.report.dropped_invalid > 0 {
        output.warning(format!("Dropped {} features with invalid geometry", result.report.dropped_invalid));
    }
    if !result.categories.is_empty() {
        output.kv("Categories", result.categories.join(", "));
    }

    output.section(format!("Busiest substations ({})", result.top_substations.len()));
    output.table(result.top_substations.iter().map(SubstationRow::from).collect());

    output.section(format!("Outputs ({})", export_crs));
    output.success(&result.files.substations);
    output.success(&result.files.generators);
    output.success(&result.files.lines);
    output.success(&result.files.summary);
}
