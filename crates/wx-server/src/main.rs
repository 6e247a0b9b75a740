//! Weather monitor
//!
//! Usage: `weather [CONFIG_DIR]`. Reads `configuration.yaml` from the config
//! directory (default: the working directory) and runs until Ctrl-C.
//!
//! Nothing in this binary produces sensor readings. An ingress adapter has
//! to publish them onto the bus created in `main` under the `rain`, `temp`,
//! `wind` and `humidity` topics; until one is wired in, only the daily
//! digest is ever sent. Alerts go out as `alert` events on the same bus.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wx_config::ServiceConfig;
use wx_event_bus::EventBus;
use wx_monitor::{
    BusAlertSink, DailySchedule, DailyScheduler, DigestBuilder, GraphiteClient, SensorFeed,
    TransitionDetector, WeatherEngine,
};

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let config_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    info!("Starting weather monitor (config: {:?})", config_dir);

    let config = ServiceConfig::load(&config_dir)
        .with_context(|| format!("loading configuration from {:?}", config_dir))?;
    let digest_at = config.weather.digest_time()?;

    // Sensor ingress and the alert notifier both attach here
    let bus = Arc::new(EventBus::new());
    let graphite = GraphiteClient::new(&config.graphite.host)?;

    let engine = WeatherEngine::new(
        TransitionDetector::new(config.weather.windy),
        DigestBuilder::new(graphite, config.weather.temperature_series.clone()),
        BusAlertSink::new(bus.clone(), config.alerts.target.clone()),
    );
    let shutdown = engine.shutdown_handle();

    let feed = SensorFeed::subscribe(&bus, config.weather.outside.clone());
    let ticker = DailyScheduler::new(DailySchedule::daily_at(digest_at));
    let task = engine.spawn(feed, ticker);

    info!(
        graphite = %config.graphite.host,
        digest_at = %digest_at,
        "Weather monitor is running"
    );

    tokio::signal::ctrl_c().await?;
    info!("Shutting down...");

    shutdown.shutdown();
    task.await?;

    Ok(())
}
