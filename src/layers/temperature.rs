use crate::{
    climate::base_temperature,
    dataset::TemperaturePoint,
    geo::{grid_cells, BoundingBox, Coordinate},
    rng::RandomSource,
};

use super::{Layer, LayerError, LayerGenerator};

pub const DEFAULT_TEMPERATURE_STEP: f64 = 0.008;

const LAT_WAVE_AMPLITUDE: f64 = 3.0;
const LNG_WAVE_AMPLITUDE: f64 = 2.0;
const WAVE_FREQUENCY: f64 = 100.0;
const TEMPERATURE_NOISE: f64 = 4.0;
const HEAT_INDEX_NOISE: f64 = 5.0;

/// Regular-grid temperature field around the viewport center.
#[derive(Debug, Clone)]
pub struct TemperatureGenerator {
    step: f64,
}

impl TemperatureGenerator {
    pub fn new(step: f64) -> Self {
        Self { step }
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn sample(
        &self,
        bounds: &BoundingBox,
        center: Coordinate,
        rng: &mut dyn RandomSource,
    ) -> Vec<TemperaturePoint> {
        let base = base_temperature(center.lat);
        grid_cells(bounds, self.step)
            .into_iter()
            .map(|cell| {
                let temperature = base
                    + (WAVE_FREQUENCY * (cell.lat - center.lat)).sin() * LAT_WAVE_AMPLITUDE
                    + (WAVE_FREQUENCY * (cell.lng - center.lng)).cos() * LNG_WAVE_AMPLITUDE
                    + rng.uniform(TEMPERATURE_NOISE);
                let heat_index = temperature + rng.uniform(HEAT_INDEX_NOISE);
                TemperaturePoint {
                    lat: cell.lat,
                    lng: cell.lng,
                    temperature,
                    heat_index,
                }
            })
            .collect()
    }
}

impl Default for TemperatureGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPERATURE_STEP)
    }
}

impl LayerGenerator for TemperatureGenerator {
    type Point = TemperaturePoint;

    fn layer(&self) -> Layer {
        Layer::Temperature
    }

    fn generate(
        &self,
        bounds: &BoundingBox,
        center: Coordinate,
        rng: &mut dyn RandomSource,
    ) -> Result<Vec<TemperaturePoint>, LayerError> {
        Ok(self.sample(bounds, center, rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::derive_bounds;
    use crate::rng::{ScriptedSource, SeededSource};

    #[test]
    fn test_center_cell_exact_value() {
        let center = Coordinate::new(40.0, -74.0);
        // one grid cell at the southwest corner
        let bounds = BoundingBox {
            north: 40.001,
            south: 40.0,
            east: -73.999,
            west: -74.0,
        };
        let mut rng = ScriptedSource::new(vec![0.5, 0.2]);
        let points = TemperatureGenerator::default().sample(&bounds, center, &mut rng);

        assert_eq!(points.len(), 1);
        // 15 base + sin(0)*3 + cos(0)*2 + 0.5*4
        assert!((points[0].temperature - 19.0).abs() < 1e-9);
        assert!((points[0].heat_index - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_point_count_independent_of_noise() {
        let center = Coordinate::new(47.6, -122.3);
        let bounds = derive_bounds(center, 0.05);
        let generator = TemperatureGenerator::default();

        let a = generator.sample(&bounds, center, &mut SeededSource::new(1));
        let b = generator.sample(&bounds, center, &mut SeededSource::new(2));

        assert_eq!(a.len(), b.len());
        assert!(!a.is_empty());
        for (pa, pb) in a.iter().zip(&b) {
            assert_eq!((pa.lat, pa.lng), (pb.lat, pb.lng));
        }
    }

    #[test]
    fn test_points_inside_bounds() {
        let center = Coordinate::new(25.76, -80.19);
        let bounds = derive_bounds(center, 0.05);
        let generator = TemperatureGenerator::default();
        let points = generator.sample(&bounds, center, &mut SeededSource::new(9));

        for point in &points {
            assert!(bounds.contains_with_tolerance(point.position(), generator.step()));
            assert!(point.heat_index >= point.temperature);
        }
    }

    #[test]
    fn test_degenerate_bounds_yield_nothing() {
        let center = Coordinate::new(0.0, 0.0);
        let bounds = BoundingBox {
            north: -1.0,
            south: 1.0,
            east: 1.0,
            west: -1.0,
        };
        let generator = TemperatureGenerator::default();
        let points = generator.sample(&bounds, center, &mut SeededSource::new(3));
        assert!(points.is_empty());

        let flat = BoundingBox {
            north: 0.0,
            south: 0.0,
            east: 1.0,
            west: -1.0,
        };
        assert!(generator.sample(&flat, center, &mut SeededSource::new(3)).is_empty());
    }
}
