use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;

use resilient_cities::{
    config::EngineConfig,
    coordinator::DataCoordinator,
    geocoding::{Location, LocationResolver, StaticGazetteer},
    report::{write_report, AnalyticsReport},
    web::{self, WebServerConfig},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Resilient Cities climate layer generator")]
struct Cli {
    /// Path to the engine YAML config (reference defaults when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// City to center on, resolved through the built-in gazetteer
    #[arg(long, conflicts_with_all = ["lat", "lng"])]
    location: Option<String>,

    /// Center latitude (requires --lng)
    #[arg(long, requires = "lng", allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Center longitude (requires --lat)
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lng: Option<f64>,

    /// Override the configured zoom level
    #[arg(long)]
    zoom: Option<u8>,

    /// Seed the random streams instead of drawing fresh entropy
    #[arg(long)]
    seed: Option<u64>,

    /// Directory to export the analytics report into
    #[arg(long)]
    export: Option<PathBuf>,

    /// Keep serving the HTTP API after the first round
    #[arg(long)]
    serve: bool,

    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(long, default_value_t = 8080)]
    port: u16,
}

fn resolve_location(
    cli: &Cli,
    config: &EngineConfig,
    resolver: &dyn LocationResolver,
) -> Result<Location> {
    if let (Some(lat), Some(lng)) = (cli.lat, cli.lng) {
        return Ok(Location {
            lat,
            lng,
            name: format!("{lat:.4}, {lng:.4}"),
        });
    }
    if let Some(query) = &cli.location {
        return match resolver.search(query).into_iter().next() {
            Some(location) => Ok(location),
            None => bail!("no location matches '{query}'"),
        };
    }
    Ok(Location {
        lat: config.viewport.default_center.lat,
        lng: config.viewport.default_center.lng,
        name: config.viewport.default_location.clone(),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_yaml(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.rng.seed = Some(seed);
    }
    if let Some(zoom) = cli.zoom {
        config.viewport.default_zoom = zoom;
    }

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    let resolver = Arc::new(StaticGazetteer::new());
    let location = resolve_location(&cli, &config, resolver.as_ref())?;
    info!(
        "centering on {} ({:.4}, {:.4})",
        location.name, location.lat, location.lng
    );

    let coordinator = Arc::new(DataCoordinator::new(config));
    let report = coordinator.select_location(&location).await?;

    println!("{} (round {})", location.name, report.token);
    for row in report.summary.metrics() {
        println!("  {:<20} {}", row.label, row.value);
    }

    if let Some(dir) = &cli.export {
        let exported = AnalyticsReport::from_refresh(location.name.clone(), &report);
        let path = write_report(dir, &exported)
            .with_context(|| format!("Failed to export report into {}", dir.display()))?;
        println!("Report written to {}", path.display());
    }

    if cli.serve {
        web::run(WebServerConfig {
            coordinator,
            resolver,
            host: cli.host.clone(),
            port: cli.port,
        })
        .await?;
    }

    Ok(())
}
