use crate::{
    dataset::{Building, BuildingType},
    geo::{BoundingBox, Coordinate},
    rng::RandomSource,
};

use super::{Layer, LayerError, LayerGenerator};

pub const DEFAULT_BUILDING_COUNT: u32 = 60;

const MIN_HEIGHT: f64 = 10.0;
const TALLEST: f64 = 120.0;
const HEIGHT_SPREAD: f64 = 80.0;
const MIN_FOOTPRINT_SIDE: f64 = 15.0;
const FOOTPRINT_SPREAD: f64 = 25.0;
const CARBON_PER_METER: f64 = 0.8;
const CARBON_NOISE: f64 = 15.0;
const COMMERCIAL_ABOVE: f64 = 50.0;
const FIRST_YEAR: u16 = 1950;
const YEAR_SPREAD: f64 = 70.0;

/// Scatters a fixed number of buildings uniformly over the bounds.
///
/// The count does not scale with the area of the box.
#[derive(Debug, Clone)]
pub struct BuildingGenerator {
    count: u32,
}

impl BuildingGenerator {
    pub fn new(count: u32) -> Self {
        Self { count }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn classify(height: f64) -> BuildingType {
        if height > COMMERCIAL_ABOVE {
            BuildingType::Commercial
        } else {
            BuildingType::Residential
        }
    }

    pub fn sample(
        &self,
        bounds: &BoundingBox,
        _center: Coordinate,
        rng: &mut dyn RandomSource,
    ) -> Vec<Building> {
        if !bounds.is_well_formed() {
            return Vec::new();
        }
        (0..self.count)
            .map(|id| {
                let lat = bounds.south + rng.uniform(bounds.height());
                let lng = bounds.west + rng.uniform(bounds.width());
                let height = (TALLEST - rng.uniform(HEIGHT_SPREAD)).max(MIN_HEIGHT);
                let width = MIN_FOOTPRINT_SIDE + rng.uniform(FOOTPRINT_SPREAD);
                let depth = MIN_FOOTPRINT_SIDE + rng.uniform(FOOTPRINT_SPREAD);
                let carbon_footprint = height * CARBON_PER_METER + rng.uniform(CARBON_NOISE);
                let energy_efficiency = rng.next_unit();
                let year_built = FIRST_YEAR + rng.uniform(YEAR_SPREAD).floor() as u16;
                Building {
                    id,
                    lat,
                    lng,
                    height,
                    width,
                    depth,
                    carbon_footprint,
                    energy_efficiency,
                    building_type: Self::classify(height),
                    year_built,
                }
            })
            .collect()
    }
}

impl Default for BuildingGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_BUILDING_COUNT)
    }
}

impl LayerGenerator for BuildingGenerator {
    type Point = Building;

    fn layer(&self) -> Layer {
        Layer::Buildings
    }

    fn generate(
        &self,
        bounds: &BoundingBox,
        center: Coordinate,
        rng: &mut dyn RandomSource,
    ) -> Result<Vec<Building>, LayerError> {
        Ok(self.sample(bounds, center, rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::derive_bounds;
    use crate::rng::{ScriptedSource, SeededSource};

    #[test]
    fn test_fixed_count_and_ranges() {
        let center = Coordinate::new(42.3601, -71.0589);
        let bounds = derive_bounds(center, 0.05);
        let buildings =
            BuildingGenerator::default().sample(&bounds, center, &mut SeededSource::new(5));

        assert_eq!(buildings.len(), 60);
        for (index, building) in buildings.iter().enumerate() {
            assert_eq!(building.id as usize, index);
            assert!(building.height >= 10.0);
            assert!(building.width >= 15.0 && building.width < 40.0);
            assert!(building.depth >= 15.0 && building.depth < 40.0);
            assert!(building.carbon_footprint >= 0.0);
            assert!((0.0..1.0).contains(&building.energy_efficiency));
            assert!((1950..2020).contains(&building.year_built));
            assert_eq!(
                building.building_type == BuildingType::Commercial,
                building.height > 50.0
            );
            assert!(building.lat >= bounds.south && building.lat <= bounds.north);
            assert!(building.lng >= bounds.west && building.lng <= bounds.east);
        }
    }

    #[test]
    fn test_scripted_building() {
        let center = Coordinate::new(0.5, 0.5);
        let bounds = BoundingBox {
            north: 1.0,
            south: 0.0,
            east: 1.0,
            west: 0.0,
        };
        let mut rng = ScriptedSource::new(vec![0.25, 0.75, 0.5, 0.2, 0.4, 0.0, 0.9, 0.5]);
        let buildings = BuildingGenerator::new(1).sample(&bounds, center, &mut rng);
        let building = &buildings[0];

        assert_eq!(building.lat, 0.25);
        assert_eq!(building.lng, 0.75);
        assert_eq!(building.height, 80.0);
        assert_eq!(building.width, 20.0);
        assert_eq!(building.depth, 25.0);
        assert_eq!(building.carbon_footprint, 64.0);
        assert_eq!(building.energy_efficiency, 0.9);
        assert_eq!(building.year_built, 1985);
        assert_eq!(building.building_type, BuildingType::Commercial);
    }

    #[test]
    fn test_classify_threshold() {
        assert_eq!(BuildingGenerator::classify(40.8), BuildingType::Residential);
        assert_eq!(BuildingGenerator::classify(50.0), BuildingType::Residential);
        assert_eq!(BuildingGenerator::classify(50.1), BuildingType::Commercial);
    }

    #[test]
    fn test_count_ignores_area() {
        let center = Coordinate::new(39.7392, -104.9903);
        let generator = BuildingGenerator::new(12);
        for margin in [0.001, 0.05, 2.0] {
            let bounds = derive_bounds(center, margin);
            assert_eq!(generator.sample(&bounds, center, &mut SeededSource::new(1)).len(), 12);
        }
    }

    #[test]
    fn test_zero_area_bounds_place_nothing() {
        let center = Coordinate::new(40.0, -74.0);
        let flat = BoundingBox {
            north: 40.0,
            south: 40.0,
            east: -73.9,
            west: -74.0,
        };
        let mut rng = SeededSource::new(2);
        assert!(BuildingGenerator::default().sample(&flat, center, &mut rng).is_empty());
    }
}
