use std::path::PathBuf;

use resilient_cities::{
    report::{write_report, AnalyticsReport},
    DataCoordinator, EngineConfig,
};

fn config_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config/resilient_cities.yaml")
}

#[test]
fn bundled_config_matches_reference_values() {
    let config = EngineConfig::from_yaml(config_path()).expect("config parses");

    assert_eq!(config.grid.temperature_step, 0.008);
    assert_eq!(config.grid.flood_step, 0.006);
    assert_eq!(config.viewport.margin, 0.05);
    assert_eq!(config.buildings.count, 60);
    assert_eq!(config.flood.inclusion_threshold, 0.15);
    assert_eq!(config.viewport.default_location, "New York City, NY");
    assert!(config.rng.seed.is_none());
}

#[tokio::test]
async fn tuned_config_drives_a_round_and_export() {
    let mut config = EngineConfig::from_yaml(config_path()).unwrap();
    config.buildings.count = 12;
    config.rng.seed = Some(21);
    let coordinator = DataCoordinator::new(config);

    let report = coordinator.refresh_default().await.unwrap();
    assert_eq!(report.summary.building_count, 12);

    let temp = tempfile::tempdir().unwrap();
    let exported = AnalyticsReport::from_state(&coordinator.state()).expect("round published");
    let path = write_report(temp.path(), &exported).unwrap();

    let data = std::fs::read_to_string(path).unwrap();
    assert!(data.contains("\"location\": \"New York City, NY\""));
    assert!(data.contains("\"buildings\": 12"));
}
