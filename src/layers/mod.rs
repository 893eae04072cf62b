//! Layer generators
//!
//! Each generator synthesizes one overlay for a bounding box. They read only
//! their inputs and the random stream they are handed, so the coordinator can
//! run all three at once.

mod buildings;
mod flood;
mod temperature;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    geo::{BoundingBox, Coordinate},
    rng::RandomSource,
};

pub use buildings::BuildingGenerator;
pub use flood::FloodGenerator;
pub use temperature::TemperatureGenerator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    Temperature,
    Flood,
    Buildings,
}

impl Layer {
    pub const ALL: [Layer; 3] = [Layer::Temperature, Layer::Flood, Layer::Buildings];

    pub fn name(self) -> &'static str {
        match self {
            Layer::Temperature => "temperature",
            Layer::Flood => "flood",
            Layer::Buildings => "buildings",
        }
    }

    pub(crate) fn stream_id(self) -> u32 {
        match self {
            Layer::Temperature => 1,
            Layer::Flood => 2,
            Layer::Buildings => 3,
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Layer {
    type Err = LayerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "temperature" => Ok(Layer::Temperature),
            "flood" | "flood_risk" | "flood-risk" => Ok(Layer::Flood),
            "buildings" | "building" => Ok(Layer::Buildings),
            other => Err(LayerError::UnknownLayer(other.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum LayerError {
    #[error("{layer} generation failed: {message}")]
    Generation { layer: Layer, message: String },

    #[error("unknown layer '{0}'")]
    UnknownLayer(String),
}

impl LayerError {
    pub fn generation(layer: Layer, message: impl Into<String>) -> Self {
        LayerError::Generation {
            layer,
            message: message.into(),
        }
    }
}

pub trait LayerGenerator: Send + Sync {
    type Point: Send + 'static;

    fn layer(&self) -> Layer;

    fn generate(
        &self,
        bounds: &BoundingBox,
        center: Coordinate,
        rng: &mut dyn RandomSource,
    ) -> Result<Vec<Self::Point>, LayerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_parse() {
        assert_eq!("Temperature".parse::<Layer>().unwrap(), Layer::Temperature);
        assert_eq!("flood-risk".parse::<Layer>().unwrap(), Layer::Flood);
        assert_eq!("buildings".parse::<Layer>().unwrap(), Layer::Buildings);
        assert!("wind".parse::<Layer>().is_err());
    }

    #[test]
    fn test_layer_round_trips_through_name() {
        for layer in Layer::ALL {
            assert_eq!(layer.name().parse::<Layer>().unwrap(), layer);
        }
    }
}
