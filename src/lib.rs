pub mod analytics;
pub mod climate;
pub mod config;
pub mod coordinator;
pub mod dataset;
pub mod geo;
pub mod geocoding;
pub mod layers;
pub mod report;
pub mod rng;
pub mod web;

pub use analytics::{summarize, summarize_dataset, AnalyticsSummary};
pub use config::EngineConfig;
pub use coordinator::{CoordinatorBuilder, DataCoordinator, RefreshError, RefreshReport};
pub use dataset::ClimateDataset;
pub use geo::{derive_bounds, BoundingBox, Coordinate, Viewport};
