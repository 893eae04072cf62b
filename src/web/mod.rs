use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use log::{error, info};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio_stream::{wrappers::WatchStream, Stream, StreamExt};

use crate::{
    analytics::{AnalyticsSummary, MetricRow},
    coordinator::{CoordinatorState, DataCoordinator, LayerTiming, RefreshError, RefreshReport},
    geo::{Coordinate, Viewport},
    geocoding::{Location, LocationResolver},
    layers::Layer,
    report::AnalyticsReport,
};

#[derive(Clone)]
struct AppState {
    coordinator: Arc<DataCoordinator>,
    resolver: Arc<dyn LocationResolver>,
}

pub struct WebServerConfig {
    pub coordinator: Arc<DataCoordinator>,
    pub resolver: Arc<dyn LocationResolver>,
    pub host: String,
    pub port: u16,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    token: u64,
    viewport: Viewport,
    summary: AnalyticsSummary,
    metrics: Vec<MetricRow>,
    timings: Vec<LayerTiming>,
}

impl From<RefreshReport> for RefreshResponse {
    fn from(report: RefreshReport) -> Self {
        Self {
            token: report.token,
            viewport: report.viewport,
            metrics: report.summary.metrics(),
            summary: report.summary,
            timings: report.timings,
        }
    }
}

#[derive(Deserialize)]
struct SearchParams {
    q: String,
}

#[derive(Deserialize)]
struct ViewportRequest {
    lat: f64,
    lng: f64,
    zoom: Option<u8>,
}

#[derive(Deserialize)]
struct LocationRequest {
    query: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}

fn refresh_error_response(err: RefreshError) -> Response {
    match err {
        RefreshError::Superseded { .. } => error_response(StatusCode::CONFLICT, err.to_string()),
        other => {
            error!("refresh failed: {other:?}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
        }
    }
}

pub fn router(coordinator: Arc<DataCoordinator>, resolver: Arc<dyn LocationResolver>) -> Router {
    let state = AppState {
        coordinator,
        resolver,
    };
    Router::new()
        .route("/api/state", get(latest_state))
        .route("/api/search", get(search))
        .route("/api/viewport", post(set_viewport))
        .route("/api/location", post(select_location))
        .route("/api/refresh", post(refresh_current))
        .route("/api/report", get(latest_report))
        .route("/api/layers/:layer", get(layer_points))
        .route("/api/events", get(stream_events))
        .with_state(state)
}

pub async fn run(config: WebServerConfig) -> Result<()> {
    let WebServerConfig {
        coordinator,
        resolver,
        host,
        port,
    } = config;

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("invalid listen address {host}:{port}"))?;

    let app = router(coordinator, resolver);

    info!("serving climate layers at http://{addr} (Ctrl+C to stop)");

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutting down web server");
}

async fn latest_state(State(state): State<AppState>) -> Json<CoordinatorState> {
    Json(state.coordinator.state())
}

async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<Location>> {
    Json(state.resolver.search(&params.q))
}

async fn set_viewport(
    State(state): State<AppState>,
    Json(request): Json<ViewportRequest>,
) -> Response {
    let zoom = request
        .zoom
        .unwrap_or(state.coordinator.config().viewport.default_zoom);
    match state
        .coordinator
        .set_viewport(Coordinate::new(request.lat, request.lng), zoom)
        .await
    {
        Ok(report) => Json(RefreshResponse::from(report)).into_response(),
        Err(err) => refresh_error_response(err),
    }
}

async fn select_location(
    State(state): State<AppState>,
    Json(request): Json<LocationRequest>,
) -> Response {
    let Some(location) = state.resolver.search(&request.query).into_iter().next() else {
        return error_response(
            StatusCode::NOT_FOUND,
            format!("no location matches '{}'", request.query),
        );
    };
    match state.coordinator.select_location(&location).await {
        Ok(report) => Json(RefreshResponse::from(report)).into_response(),
        Err(err) => refresh_error_response(err),
    }
}

async fn refresh_current(State(state): State<AppState>) -> Response {
    match state.coordinator.refresh_current().await {
        Some(Ok(report)) => Json(RefreshResponse::from(report)).into_response(),
        Some(Err(err)) => refresh_error_response(err),
        None => error_response(StatusCode::NOT_FOUND, "no viewport has been published yet"),
    }
}

async fn latest_report(State(state): State<AppState>) -> Response {
    match AnalyticsReport::from_state(&state.coordinator.state()) {
        Some(report) => Json(report).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "no refresh round has been published yet"),
    }
}

async fn layer_points(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    let layer: Layer = match name.parse() {
        Ok(layer) => layer,
        Err(err) => return error_response(StatusCode::NOT_FOUND, err.to_string()),
    };
    let current = state.coordinator.state();
    match layer {
        Layer::Temperature => Json(current.dataset.temperature).into_response(),
        Layer::Flood => Json(current.dataset.flood).into_response(),
        Layer::Buildings => Json(current.dataset.buildings).into_response(),
    }
}

async fn stream_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.coordinator.subscribe();
    let stream = WatchStream::new(rx).filter_map(|snapshot| {
        serde_json::to_string(&snapshot)
            .ok()
            .map(|payload| Ok(Event::default().data(payload)))
    });
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(2))
            .text("keep-alive"),
    )
}
