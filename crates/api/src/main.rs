//! Accident Severity Service - Main Entry Point

use anyhow::Context;
use api::{init_logging, run_server, telemetry, AppState, ArtifactState, Settings};
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading settings")?;
    init_logging(&settings.logging).context("installing tracing subscriber")?;

    info!("=== Accident Severity Service v{} ===", env!("CARGO_PKG_VERSION"));

    let metrics = match telemetry::install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Prometheus recorder not installed: {}", e);
            None
        }
    };

    let artifacts = ArtifactState::load(&settings);
    match &artifacts {
        ArtifactState::Ready(_) => info!("System ready"),
        ArtifactState::Unavailable(reason) if settings.startup.fail_fast => {
            error!("Critical startup error: {}", reason);
            anyhow::bail!("failed to load fitted artifacts: {}", reason);
        }
        ArtifactState::Unavailable(reason) => {
            error!("Critical startup error, serving without a model: {}", reason);
        }
    }

    let state = Arc::new(AppState::new(settings, artifacts, metrics));
    run_server(state).await
}
