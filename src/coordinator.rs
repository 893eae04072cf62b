//! Data coordinator - runs the three layer generators for a viewport and
//! publishes the combined dataset plus its analytics.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use log::{debug, info, warn};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::{self, JoinError, JoinHandle};

use crate::{
    analytics::{summarize_with_area, AnalyticsSummary},
    config::EngineConfig,
    dataset::{Building, ClimateDataset, FloodPoint, TemperaturePoint},
    geo::{BoundingBox, Coordinate, Viewport},
    geocoding::Location,
    layers::{Layer, LayerError, LayerGenerator},
    rng::{RandomSource, RngManager},
};

pub type TemperatureLayer = Arc<dyn LayerGenerator<Point = TemperaturePoint>>;
pub type FloodLayer = Arc<dyn LayerGenerator<Point = FloodPoint>>;
pub type BuildingLayer = Arc<dyn LayerGenerator<Point = Building>>;

/// What consumers see: the latest published round and whether one is running.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinatorState {
    pub location: Option<String>,
    pub viewport: Option<Viewport>,
    pub dataset: ClimateDataset,
    pub summary: AnalyticsSummary,
    /// Token of the round that produced `dataset`; 0 before the first one.
    pub token: u64,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerTiming {
    pub layer: Layer,
    pub points: usize,
    pub duration_ms: f64,
}

#[derive(Clone, Debug)]
pub struct RefreshReport {
    pub token: u64,
    pub viewport: Viewport,
    pub dataset: ClimateDataset,
    pub summary: AnalyticsSummary,
    pub timings: Vec<LayerTiming>,
}

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("refresh round {token} failed while generating the {layer} layer")]
    RefreshFailed {
        token: u64,
        layer: Layer,
        #[source]
        source: LayerError,
    },

    #[error("refresh round {token} lost its {layer} task")]
    TaskJoin {
        token: u64,
        layer: Layer,
        #[source]
        source: JoinError,
    },

    #[error("refresh round {token} was superseded by round {latest}")]
    Superseded { token: u64, latest: u64 },
}

pub struct CoordinatorBuilder {
    config: EngineConfig,
    rng: Option<RngManager>,
    temperature: Option<TemperatureLayer>,
    flood: Option<FloodLayer>,
    buildings: Option<BuildingLayer>,
}

impl CoordinatorBuilder {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            rng: None,
            temperature: None,
            flood: None,
            buildings: None,
        }
    }

    pub fn with_rng(mut self, rng: RngManager) -> Self {
        self.rng = Some(rng);
        self
    }

    pub fn with_temperature(
        mut self,
        generator: impl LayerGenerator<Point = TemperaturePoint> + 'static,
    ) -> Self {
        self.temperature = Some(Arc::new(generator));
        self
    }

    pub fn with_flood(
        mut self,
        generator: impl LayerGenerator<Point = FloodPoint> + 'static,
    ) -> Self {
        self.flood = Some(Arc::new(generator));
        self
    }

    pub fn with_buildings(
        mut self,
        generator: impl LayerGenerator<Point = Building> + 'static,
    ) -> Self {
        self.buildings = Some(Arc::new(generator));
        self
    }

    /// Layers not supplied explicitly are built from the config.
    pub fn build(self) -> DataCoordinator {
        let config = self.config;
        let rng = self
            .rng
            .unwrap_or_else(|| RngManager::from_seed(config.rng.seed));
        let temperature = self
            .temperature
            .unwrap_or_else(|| Arc::new(config.temperature_generator()) as TemperatureLayer);
        let flood = self
            .flood
            .unwrap_or_else(|| Arc::new(config.flood_generator()) as FloodLayer);
        let buildings = self
            .buildings
            .unwrap_or_else(|| Arc::new(config.building_generator()) as BuildingLayer);
        let (state, _) = watch::channel(CoordinatorState::default());

        DataCoordinator {
            config,
            rng,
            temperature,
            flood,
            buildings,
            latest_token: AtomicU64::new(0),
            state,
        }
    }
}

pub struct DataCoordinator {
    config: EngineConfig,
    rng: RngManager,
    temperature: TemperatureLayer,
    flood: FloodLayer,
    buildings: BuildingLayer,
    latest_token: AtomicU64,
    state: watch::Sender<CoordinatorState>,
}

impl DataCoordinator {
    pub fn new(config: EngineConfig) -> Self {
        CoordinatorBuilder::new(config).build()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> CoordinatorState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CoordinatorState> {
        self.state.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().dataset.loading
    }

    pub fn latest_token(&self) -> u64 {
        self.latest_token.load(Ordering::SeqCst)
    }

    pub fn viewport_for(&self, center: Coordinate, zoom: u8) -> Viewport {
        Viewport::new(center, zoom, self.config.viewport.margin)
    }

    /// Replace the viewport and regenerate every layer for it. The published
    /// location name is dropped, the new view is not tied to a place.
    pub async fn set_viewport(
        &self,
        center: Coordinate,
        zoom: u8,
    ) -> Result<RefreshReport, RefreshError> {
        let viewport = self.viewport_for(center, zoom);
        self.run_round(viewport, None).await
    }

    pub async fn select_location(
        &self,
        location: &Location,
    ) -> Result<RefreshReport, RefreshError> {
        let zoom = self.config.viewport.default_zoom;
        let viewport = self.viewport_for(location.coordinate(), zoom);
        self.run_round(viewport, Some(location.name.clone())).await
    }

    /// Re-run the published viewport, keeping its location name.
    pub async fn refresh_current(&self) -> Option<Result<RefreshReport, RefreshError>> {
        let viewport = self.state.borrow().viewport?;
        Some(self.refresh(viewport).await)
    }

    pub async fn refresh_default(&self) -> Result<RefreshReport, RefreshError> {
        let location = Location {
            lat: self.config.viewport.default_center.lat,
            lng: self.config.viewport.default_center.lng,
            name: self.config.viewport.default_location.clone(),
        };
        self.select_location(&location).await
    }

    /// One refresh round over `viewport`, keeping the published location name.
    pub async fn refresh(&self, viewport: Viewport) -> Result<RefreshReport, RefreshError> {
        let location = self.state.borrow().location.clone();
        self.run_round(viewport, location).await
    }

    /// All three layers must finish before anything is published; only the
    /// most recently started round may publish. `viewport` and `location`
    /// land in the state together with the data they describe.
    async fn run_round(
        &self,
        viewport: Viewport,
        location: Option<String>,
    ) -> Result<RefreshReport, RefreshError> {
        let token = self.latest_token.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|state| state.dataset.loading = true);
        debug!(
            "refresh round {token} started for ({:.4}, {:.4})",
            viewport.center.lat, viewport.center.lng
        );

        let started = Instant::now();
        let bounds = viewport.bounds;
        let center = viewport.center;
        let temperature = spawn_layer(
            self.temperature.clone(),
            bounds,
            center,
            self.rng.stream(Layer::Temperature, token),
        );
        let flood = spawn_layer(
            self.flood.clone(),
            bounds,
            center,
            self.rng.stream(Layer::Flood, token),
        );
        let buildings = spawn_layer(
            self.buildings.clone(),
            bounds,
            center,
            self.rng.stream(Layer::Buildings, token),
        );

        let joined = tokio::try_join!(
            join_layer(token, Layer::Temperature, temperature),
            join_layer(token, Layer::Buildings, buildings),
            join_layer(token, Layer::Flood, flood),
        );

        let ((temperature, t_timing), (buildings, b_timing), (flood, f_timing)) = match joined {
            Ok(layers) => layers,
            Err(err) => {
                let cleared = self.state.send_if_modified(|state| {
                    if self.latest_token.load(Ordering::SeqCst) != token {
                        return false;
                    }
                    state.dataset.loading = false;
                    true
                });
                if cleared {
                    warn!("{err}; keeping previously published data");
                } else {
                    warn!("{err}; a newer round is already running");
                }
                return Err(err);
            }
        };

        let dataset = ClimateDataset::new(temperature, buildings, flood);
        let summary = summarize_with_area(
            &dataset.temperature,
            &dataset.buildings,
            &dataset.flood,
            self.config.flood.area_per_point_km2,
        );

        let published = self.state.send_if_modified(|state| {
            if self.latest_token.load(Ordering::SeqCst) != token {
                return false;
            }
            state.location = location;
            state.viewport = Some(viewport);
            state.dataset = dataset.clone();
            state.summary = summary;
            state.token = token;
            true
        });

        if !published {
            let latest = self.latest_token();
            warn!("discarding refresh round {token}; round {latest} is newer");
            return Err(RefreshError::Superseded { token, latest });
        }

        info!(
            "published refresh round {token}: {} temperature, {} flood, {} buildings in {:.1}ms",
            dataset.temperature.len(),
            dataset.flood.len(),
            dataset.buildings.len(),
            started.elapsed().as_secs_f64() * 1_000.0
        );

        Ok(RefreshReport {
            token,
            viewport,
            dataset,
            summary,
            timings: vec![t_timing, f_timing, b_timing],
        })
    }
}

fn spawn_layer<P: Send + 'static>(
    generator: Arc<dyn LayerGenerator<Point = P>>,
    bounds: BoundingBox,
    center: Coordinate,
    mut rng: Box<dyn RandomSource>,
) -> JoinHandle<Result<(Vec<P>, LayerTiming), LayerError>> {
    task::spawn_blocking(move || {
        let start = Instant::now();
        let points = generator.generate(&bounds, center, rng.as_mut())?;
        let timing = LayerTiming {
            layer: generator.layer(),
            points: points.len(),
            duration_ms: start.elapsed().as_secs_f64() * 1_000.0,
        };
        debug!(
            "{} layer produced {} points in {:.2}ms",
            timing.layer, timing.points, timing.duration_ms
        );
        Ok((points, timing))
    })
}

async fn join_layer<P>(
    token: u64,
    layer: Layer,
    handle: JoinHandle<Result<(Vec<P>, LayerTiming), LayerError>>,
) -> Result<(Vec<P>, LayerTiming), RefreshError> {
    match handle.await {
        Ok(Ok(generated)) => Ok(generated),
        Ok(Err(source)) => Err(RefreshError::RefreshFailed {
            token,
            layer,
            source,
        }),
        Err(source) => Err(RefreshError::TaskJoin {
            token,
            layer,
            source,
        }),
    }
}
