use serde::{Deserialize, Serialize};

use crate::dataset::{Building, ClimateDataset, FloodPoint, TemperaturePoint};

pub const DEFAULT_AREA_PER_FLOOD_POINT_KM2: f64 = 0.01;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub avg_temperature: f64,
    /// Count-based proxy: each retained flood point stands for a fixed area.
    pub flood_risk_area: f64,
    pub building_count: usize,
    pub carbon_total: f64,
}

/// One labelled dashboard row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRow {
    pub label: &'static str,
    pub value: String,
}

impl AnalyticsSummary {
    pub fn metrics(&self) -> Vec<MetricRow> {
        vec![
            MetricRow {
                label: "Avg Temperature",
                value: format!("{:.1}°C", self.avg_temperature),
            },
            MetricRow {
                label: "Buildings Analyzed",
                value: self.building_count.to_string(),
            },
            MetricRow {
                label: "At-Risk Area",
                value: format!("{:.2} km²", self.flood_risk_area),
            },
            MetricRow {
                label: "Carbon Impact",
                value: format!("{:.0}t CO₂", self.carbon_total),
            },
        ]
    }
}

pub fn summarize(
    temperature: &[TemperaturePoint],
    buildings: &[Building],
    flood: &[FloodPoint],
) -> AnalyticsSummary {
    summarize_with_area(
        temperature,
        buildings,
        flood,
        DEFAULT_AREA_PER_FLOOD_POINT_KM2,
    )
}

pub fn summarize_with_area(
    temperature: &[TemperaturePoint],
    buildings: &[Building],
    flood: &[FloodPoint],
    area_per_flood_point_km2: f64,
) -> AnalyticsSummary {
    let avg_temperature = if temperature.is_empty() {
        0.0
    } else {
        temperature.iter().map(|p| p.temperature).sum::<f64>() / temperature.len() as f64
    };
    AnalyticsSummary {
        avg_temperature,
        flood_risk_area: flood.len() as f64 * area_per_flood_point_km2,
        building_count: buildings.len(),
        carbon_total: buildings.iter().map(|b| b.carbon_footprint).sum(),
    }
}

pub fn summarize_dataset(dataset: &ClimateDataset) -> AnalyticsSummary {
    summarize(&dataset.temperature, &dataset.buildings, &dataset.flood)
}
