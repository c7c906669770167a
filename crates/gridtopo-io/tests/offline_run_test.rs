use gridtopo_core::models::Crs;
use gridtopo_io::{GeoJsonFeatureSource, GeoJsonRegionSource, GeoJsonWriter, RunSummary};
use gridtopo_topology::{GridPipeline, TopologyBuilder};
use serde_json::Value;
use std::fs;
use std::path::Path;

const REGIONS: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {"type": "Feature", "properties": {"NAME_1": "Brandenburg"},
         "geometry": {"type": "Polygon", "coordinates": [[[12.0, 52.0], [14.0, 52.0], [14.0, 53.0], [12.0, 53.0], [12.0, 52.0]]]}},
        {"type": "Feature", "properties": {"NAME_1": "Sachsen"},
         "geometry": {"type": "Polygon", "coordinates": [[[12.0, 50.5], [14.0, 50.5], [14.0, 52.0], [12.0, 52.0], [12.0, 50.5]]]}}
    ]
}"#;

const SUBSTATIONS: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {"type": "Feature", "id": "node/100",
         "geometry": {"type": "Point", "coordinates": [13.0, 52.5]},
         "properties": {"power": "substation", "voltage": "380000;220000", "name": "Nord"}},
        {"type": "Feature", "id": "way/200",
         "geometry": {"type": "Polygon", "coordinates": [[[13.0, 51.0], [13.01, 51.0], [13.01, 51.01], [13.0, 51.01], [13.0, 51.0]]]},
         "properties": {"power": "substation", "voltage": "110"}},
        {"type": "Feature", "id": "node/300",
         "geometry": {"type": "Point", "coordinates": [13.5, 51.5]},
         "properties": {"power": "substation", "voltage": "20000"}},
        {"type": "Feature", "id": "node/400",
         "geometry": {"type": "Point", "coordinates": [13.2, 52.0]},
         "properties": {"power": "substation", "voltage": "110000"}}
    ]
}"#;

const GENERATORS: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {"type": "Feature", "id": "node/1",
         "geometry": {"type": "Point", "coordinates": [13.05, 52.45]},
         "properties": {"power": "generator", "generator:method": "wind_turbine", "generator:output:electricity": "3 MW"}},
        {"type": "Feature", "id": "node/2",
         "geometry": {"type": "Point", "coordinates": [13.02, 51.02]},
         "properties": {"power": "generator", "generator:method": "photovoltaic", "generator:output:electricity": "750 kW"}},
        {"type": "Feature", "id": "way/3",
         "geometry": {"type": "Polygon", "coordinates": [[[13.5, 51.5], [13.51, 51.5], [13.51, 51.51], [13.5, 51.5]]]},
         "properties": {"power": "plant", "generator:output:electricity": "yes"}}
    ]
}"#;

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn read(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[tokio::test]
async fn test_offline_run_writes_consistent_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let regions = write(dir.path(), "regions.geojson", REGIONS);
    let substations = write(dir.path(), "substations_in.geojson", SUBSTATIONS);
    let generators = write(dir.path(), "generators_in.geojson", GENERATORS);

    let pipeline = GridPipeline::new(
        GeoJsonRegionSource::new(&regions),
        GeoJsonFeatureSource::open(&substations, &generators).unwrap(),
        TopologyBuilder::new(Crs::web_mercator()),
    );
    let names = vec!["Brandenburg".to_string(), "Sachsen".to_string()];
    let topology = pipeline.run(&names).await.unwrap();

    // node/300 is below the threshold; node/400 sits on the shared border
    let ids: Vec<&str> = topology.substations.iter().map(|s| s.substation.id.as_str()).collect();
    assert_eq!(ids, ["node/100", "node/400", "way/200"]);
    assert_eq!(topology.substations[1].substation.region, "Brandenburg");

    assert_eq!(topology.categories.names(), ["photovoltaic", "wind_turbine", "unknown"]);
    assert_eq!(topology.links.len(), 3);

    let out = dir.path().join("output");
    let writer = GeoJsonWriter::new(&out);
    let files = writer.write(&topology).unwrap();
    let summary = RunSummary::new(&topology, &names, 110_000, None);
    let summary_path = writer.write_summary(&summary).unwrap();

    let subs = read(&files.substations);
    let features = subs["features"].as_array().unwrap();
    for feature in features {
        let props = &feature["properties"];
        let breakdown: u64 = ["photovoltaic", "wind_turbine", "unknown"]
            .iter()
            .map(|c| props[*c].as_u64().unwrap())
            .sum();
        assert_eq!(breakdown, props["num_generators"].as_u64().unwrap());
    }

    let total: u64 = features.iter().map(|f| f["properties"]["num_generators"].as_u64().unwrap()).sum();
    assert_eq!(total, 3);
    assert_eq!(read(&files.lines)["features"].as_array().unwrap().len(), 3);

    let summary_json = read(&summary_path);
    assert_eq!(summary_json["links"], 3);
    assert_eq!(summary_json["substations_kept"], 3);
}
