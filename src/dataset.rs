use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemperaturePoint {
    pub lat: f64,
    pub lng: f64,
    pub temperature: f64,
    pub heat_index: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloodPoint {
    pub lat: f64,
    pub lng: f64,
    pub flood_risk: f64,
    pub elevation: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildingType {
    Commercial,
    Residential,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Building {
    /// Index within the batch that produced it; not stable across rounds.
    pub id: u32,
    pub lat: f64,
    pub lng: f64,
    pub height: f64,
    pub width: f64,
    pub depth: f64,
    pub carbon_footprint: f64,
    pub energy_efficiency: f64,
    pub building_type: BuildingType,
    pub year_built: u16,
}

impl TemperaturePoint {
    pub fn position(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}

impl FloodPoint {
    pub fn position(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}

impl Building {
    pub fn position(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}

/// All three layers of one refresh round. Replaced as a whole, never patched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClimateDataset {
    pub temperature: Vec<TemperaturePoint>,
    pub buildings: Vec<Building>,
    pub flood: Vec<FloodPoint>,
    pub loading: bool,
    pub generated_at: Option<DateTime<Utc>>,
}

impl ClimateDataset {
    pub fn new(
        temperature: Vec<TemperaturePoint>,
        buildings: Vec<Building>,
        flood: Vec<FloodPoint>,
    ) -> Self {
        Self {
            temperature,
            buildings,
            flood,
            loading: false,
            generated_at: Some(Utc::now()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.temperature.is_empty() && self.buildings.is_empty() && self.flood.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_building_serializes_camel_case() {
        let building = Building {
            id: 3,
            lat: 1.0,
            lng: 2.0,
            height: 60.0,
            width: 20.0,
            depth: 20.0,
            carbon_footprint: 55.0,
            energy_efficiency: 0.4,
            building_type: BuildingType::Commercial,
            year_built: 1999,
        };
        let json = serde_json::to_value(&building).unwrap();
        assert_eq!(json["carbonFootprint"], 55.0);
        assert_eq!(json["buildingType"], "commercial");
        assert_eq!(json["yearBuilt"], 1999);
    }

    #[test]
    fn test_default_dataset_is_empty() {
        let dataset = ClimateDataset::default();
        assert!(dataset.is_empty());
        assert!(!dataset.loading);
        assert!(dataset.generated_at.is_none());
    }
}
