//! Coaching service
//!
//! Loads the dropout model and the user store, then serves the coaching
//! API until interrupted.

use anyhow::Result;
use coach_lib::StructuredLogger;
use coach_server::{api, startup, ServerConfig};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Missing .env is fine
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting coach-server");

    let config = ServerConfig::load()?;
    info!(
        addr = %config.bind_addr(),
        model_path = %config.model_path.display(),
        data_path = %config.data_path.display(),
        "Service configured"
    );

    let instance = std::env::var("HOSTNAME").unwrap_or_else(|_| "coach-server".to_string());
    let logger = StructuredLogger::new(instance);

    let state = startup::build_state(&config, logger.clone()).await?;
    logger.log_startup(
        SERVICE_VERSION,
        state.coach.model_version(),
        state.coach.message_strategy(),
    );

    let shutdown_logger = logger.clone();
    api::serve(&config.bind_addr(), state, async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown_logger.log_shutdown("SIGINT received");
        }
    })
    .await?;

    info!("Shutting down");
    Ok(())
}
