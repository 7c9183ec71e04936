//! Sales App - single-page sales prediction form
//!
//! Loads the trained model once at startup and serves the prediction
//! form over HTTP.

use anyhow::Result;
use predictor_lib::{observability::StructuredLogger, predictor};
use sales_app::{api, config};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting sales-app");

    let config = config::AppConfig::load()?;
    info!(model_path = %config.model_path.display(), "App configured");

    let logger = StructuredLogger::new(&config.instance);
    let gateway = predictor::global(config.gateway_config());
    logger.log_startup(APP_VERSION, gateway.model_path());

    // A missing or broken model halts the page but keeps the server up
    let app_state = Arc::new(api::AppState::bootstrap(gateway).await);

    let server = tokio::spawn(api::serve(config.bind_address(), app_state));

    tokio::select! {
        result = server => {
            result??;
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            logger.log_shutdown("SIGINT received");
        }
    }

    info!("Shutting down");
    Ok(())
}
