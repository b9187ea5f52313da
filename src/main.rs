use std::time::Duration;

use anyhow::Result;
use peer_energy_engine::{config, controller, telemetry};
use config::Config;
use controller::SimulationOrchestrator;
use telemetry::init_tracing;
use tracing::{info, warn};

const STATUS_LOG_EVERY: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cfg = Config::load()?;
    info!(
        households = cfg.simulation.household_count,
        tick_seconds = cfg.simulation.tick_seconds,
        weather = ?cfg.weather.provider,
        "starting peer energy engine"
    );

    let engine = SimulationOrchestrator::from_config(&cfg)?;
    if cfg.simulation.autostart {
        engine.start().await;
    } else {
        warn!("autostart disabled, engine idle until started");
    }

    let reporter = engine.clone();
    let status_task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(STATUS_LOG_EVERY);
        loop {
            interval.tick().await;
            match serde_json::to_string(&reporter.status()) {
                Ok(status) => info!(%status, "engine status"),
                Err(e) => warn!(error = %e, "failed to serialize status"),
            }
        }
    });

    telemetry::shutdown_signal().await;

    status_task.abort();
    engine.stop().await;
    warn!("shutdown complete");
    Ok(())
}
