//! Products API - REST server for the product catalog

use axum_helpers::{create_cors_layer, create_production_app};
use core_config::tracing::{init_tracing, install_color_eyre};
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::{AppState, Storage};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    info!(
        backend = %config.storage.backend,
        "Starting {} v{}",
        config.app.name,
        config.app.version
    );

    let storage = Storage::connect(&config.storage, config.app.name).await?;

    // Initialize the application state
    let state = AppState {
        config: config.clone(),
        storage,
    };

    let cors = create_cors_layer(config.cors_allowed_origin.as_deref())?;
    let app = api::app(&state, cors);

    // Run REST server with graceful shutdown
    create_production_app(
        app,
        &config.server,
        Duration::from_secs(30),
        state.storage.close(),
    )
    .await?;

    info!("Products API shutdown complete");
    Ok(())
}
