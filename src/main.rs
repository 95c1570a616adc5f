//! Static pixel server.
//!
//! Serves a 1x1 white PNG to every request on `0.0.0.0:8080`, logging each
//! served request. Set `PIXEL_SERVER_CONFIG` to a TOML file to change the
//! address or the response.

use std::process::ExitCode;

use pixel_server::config::{self, ObservabilityConfig};
use pixel_server::lifecycle::{self, signals, Shutdown};
use pixel_server::observability::logging;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match config::load_from_env() {
        Ok(config) => config,
        Err(e) => {
            logging::init(&ObservabilityConfig::default().log_filter);
            tracing::error!(error = %e, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    logging::init(&config.observability.log_filter);
    tracing::info!(
        bind_address = %config.listener.bind_address,
        status = config.response.status,
        "pixel-server v0.1.0 starting"
    );

    match config::render_config(&config) {
        Ok(rendered) => tracing::debug!(config = %rendered, "Effective configuration"),
        Err(e) => tracing::warn!(error = %e, "Failed to render configuration"),
    }

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    shutdown.trigger_on(signals::wait_for_termination());

    match lifecycle::launch(config, server_shutdown).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");
            ExitCode::FAILURE
        }
    }
}
