use crate::{
    dataset::FloodPoint,
    geo::{grid_cells, BoundingBox, Coordinate},
    rng::RandomSource,
};

use super::{Layer, LayerError, LayerGenerator};

pub const DEFAULT_FLOOD_STEP: f64 = 0.006;
pub const DEFAULT_INCLUSION_THRESHOLD: f64 = 0.15;

const COASTAL_LNG: f64 = 70.0;
const COASTAL_RISK: f64 = 0.3;
const INLAND_RISK: f64 = 0.1;
const ELEVATION_AMPLITUDE: f64 = 50.0;
const ELEVATION_FREQUENCY: f64 = 200.0;
const ELEVATION_NOISE: f64 = 20.0;
const SAFE_ELEVATION: f64 = 20.0;
const ELEVATION_SCALE: f64 = 30.0;
const RISK_NOISE: f64 = 0.2;
const MAX_RISK: f64 = 1.0;

/// Fine-grid flood risk filtered down to the cells worth drawing.
#[derive(Debug, Clone)]
pub struct FloodGenerator {
    step: f64,
    inclusion_threshold: f64,
}

impl FloodGenerator {
    pub fn new(step: f64, inclusion_threshold: f64) -> Self {
        Self {
            step,
            inclusion_threshold,
        }
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn inclusion_threshold(&self) -> f64 {
        self.inclusion_threshold
    }

    /// Ocean-facing longitude band proxy, not a coastline lookup.
    pub fn coastal_risk(center: Coordinate) -> f64 {
        if center.lng.abs() > COASTAL_LNG {
            COASTAL_RISK
        } else {
            INLAND_RISK
        }
    }

    /// Grid positions considered before filtering.
    pub fn candidate_cells(&self, bounds: &BoundingBox) -> Vec<Coordinate> {
        grid_cells(bounds, self.step)
    }

    pub fn sample(
        &self,
        bounds: &BoundingBox,
        center: Coordinate,
        rng: &mut dyn RandomSource,
    ) -> Vec<FloodPoint> {
        let coastal_risk = Self::coastal_risk(center);
        let mut points = Vec::new();
        for cell in self.candidate_cells(bounds) {
            let distance = cell.degree_distance(center);
            let elevation = (ELEVATION_FREQUENCY * distance).sin() * ELEVATION_AMPLITUDE
                + rng.uniform(ELEVATION_NOISE);
            let raw_risk = coastal_risk
                + ((SAFE_ELEVATION - elevation) / ELEVATION_SCALE).max(0.0)
                + rng.uniform(RISK_NOISE);
            // threshold applies to the unclamped value
            if raw_risk > self.inclusion_threshold {
                points.push(FloodPoint {
                    lat: cell.lat,
                    lng: cell.lng,
                    flood_risk: raw_risk.min(MAX_RISK),
                    elevation,
                });
            }
        }
        points
    }
}

impl Default for FloodGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_FLOOD_STEP, DEFAULT_INCLUSION_THRESHOLD)
    }
}

impl LayerGenerator for FloodGenerator {
    type Point = FloodPoint;

    fn layer(&self) -> Layer {
        Layer::Flood
    }

    fn generate(
        &self,
        bounds: &BoundingBox,
        center: Coordinate,
        rng: &mut dyn RandomSource,
    ) -> Result<Vec<FloodPoint>, LayerError> {
        Ok(self.sample(bounds, center, rng))
    }
}
