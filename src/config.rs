//! Tunable constants for the sampling engine

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    analytics::DEFAULT_AREA_PER_FLOOD_POINT_KM2,
    geo::Coordinate,
    layers::{BuildingGenerator, FloodGenerator, TemperatureGenerator},
};

fn default_temperature_step() -> f64 {
    0.008
}

fn default_flood_step() -> f64 {
    0.006
}

fn default_margin() -> f64 {
    0.05
}

fn default_zoom() -> u8 {
    12
}

fn default_location_name() -> String {
    "New York City, NY".to_string()
}

fn default_center() -> Coordinate {
    Coordinate::new(40.7589, -73.9851)
}

fn default_building_count() -> u32 {
    60
}

fn default_inclusion_threshold() -> f64 {
    0.15
}

fn default_area_per_point() -> f64 {
    DEFAULT_AREA_PER_FLOOD_POINT_KM2
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub viewport: ViewportConfig,
    #[serde(default)]
    pub buildings: BuildingsConfig,
    #[serde(default)]
    pub flood: FloodConfig,
    #[serde(default)]
    pub rng: RngConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_temperature_step")]
    pub temperature_step: f64,
    #[serde(default = "default_flood_step")]
    pub flood_step: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            temperature_step: default_temperature_step(),
            flood_step: default_flood_step(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewportConfig {
    #[serde(default = "default_margin")]
    pub margin: f64,
    #[serde(default = "default_zoom")]
    pub default_zoom: u8,
    #[serde(default = "default_location_name")]
    pub default_location: String,
    #[serde(default = "default_center")]
    pub default_center: Coordinate,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            margin: default_margin(),
            default_zoom: default_zoom(),
            default_location: default_location_name(),
            default_center: default_center(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildingsConfig {
    #[serde(default = "default_building_count")]
    pub count: u32,
}

impl Default for BuildingsConfig {
    fn default() -> Self {
        Self {
            count: default_building_count(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloodConfig {
    #[serde(default = "default_inclusion_threshold")]
    pub inclusion_threshold: f64,
    #[serde(default = "default_area_per_point")]
    pub area_per_point_km2: f64,
}

impl Default for FloodConfig {
    fn default() -> Self {
        Self {
            inclusion_threshold: default_inclusion_threshold(),
            area_per_point_km2: default_area_per_point(),
        }
    }
}

/// Leaving `seed` unset keeps the per-call entropy of the reference demo.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RngConfig {
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access config file")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config yaml")]
    Yaml(#[from] serde_yaml::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}

impl EngineConfig {
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, step) in [
            ("grid.temperature_step", self.grid.temperature_step),
            ("grid.flood_step", self.grid.flood_step),
        ] {
            if !(step.is_finite() && step > 0.0) {
                return Err(ConfigError::Validation(format!(
                    "{name} must be a positive number, got {step}"
                )));
            }
        }

        if !(self.viewport.margin.is_finite() && self.viewport.margin > 0.0) {
            return Err(ConfigError::Validation(format!(
                "viewport.margin must be a positive number, got {}",
                self.viewport.margin
            )));
        }

        let threshold = self.flood.inclusion_threshold;
        if !(threshold.is_finite() && threshold >= 0.0) {
            return Err(ConfigError::Validation(format!(
                "flood.inclusion_threshold must be a non-negative number, got {threshold}"
            )));
        }

        if !(self.flood.area_per_point_km2.is_finite() && self.flood.area_per_point_km2 >= 0.0) {
            return Err(ConfigError::Validation(
                "flood.area_per_point_km2 must be a non-negative number".into(),
            ));
        }

        Ok(())
    }

    pub fn temperature_generator(&self) -> TemperatureGenerator {
        TemperatureGenerator::new(self.grid.temperature_step)
    }

    pub fn flood_generator(&self) -> FloodGenerator {
        FloodGenerator::new(self.grid.flood_step, self.flood.inclusion_threshold)
    }

    pub fn building_generator(&self) -> BuildingGenerator {
        BuildingGenerator::new(self.buildings.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_defaults() {
        let config = EngineConfig::default();

        assert_eq!(config.grid.temperature_step, 0.008);
        assert_eq!(config.grid.flood_step, 0.006);
        assert_eq!(config.viewport.margin, 0.05);
        assert_eq!(config.viewport.default_zoom, 12);
        assert_eq!(config.buildings.count, 60);
        assert_eq!(config.flood.inclusion_threshold, 0.15);
        assert_eq!(config.flood.area_per_point_km2, 0.01);
        assert!(config.rng.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_falls_back_to_defaults() {
        let config = EngineConfig::from_yaml_str(
            "buildings:\n  count: 25\nrng:\n  seed: 9\n",
        )
        .unwrap();

        assert_eq!(config.buildings.count, 25);
        assert_eq!(config.rng.seed, Some(9));
        assert_eq!(config.grid.temperature_step, 0.008);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_rejects_non_positive_step() {
        let err = EngineConfig::from_yaml_str("grid:\n  flood_step: 0.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_rejects_negative_margin() {
        let mut config = EngineConfig::default();
        config.viewport.margin = -0.05;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_yaml_round_trip_on_disk() {
        let mut config = EngineConfig::default();
        config.flood.inclusion_threshold = 0.2;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.yaml");
        config.to_yaml(&path).unwrap();

        let loaded = EngineConfig::from_yaml(&path).unwrap();
        assert_eq!(loaded.flood.inclusion_threshold, 0.2);
        assert_eq!(loaded.viewport.default_location, "New York City, NY");
    }

    #[test]
    fn test_generators_follow_config() {
        let mut config = EngineConfig::default();
        config.grid.temperature_step = 0.01;
        config.buildings.count = 5;

        assert_eq!(config.temperature_generator().step(), 0.01);
        assert_eq!(config.building_generator().count(), 5);
        assert_eq!(config.flood_generator().inclusion_threshold(), 0.15);
    }
}
