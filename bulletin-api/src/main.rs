//! Bulletin API Server Entry Point
//!
//! Reads configuration from the environment, builds the dataset cache and
//! starts the Axum HTTP server.

use axum::Router;
use bulletin_api::telemetry::{init_tracing, TelemetryConfig};
use bulletin_api::{create_router, ApiError, ApiResult, AppState, ServerConfig};

#[tokio::main]
async fn main() -> ApiResult<()> {
    let telemetry_config = TelemetryConfig::default();
    init_tracing(&telemetry_config)?;

    let config = ServerConfig::from_env()?;
    let addr = config.bind_addr()?;

    if !config.data_dir_exists() {
        tracing::warn!(
            data_dir = %config.data_dir.display(),
            "Data directory does not exist; /readyz will report not_ready"
        );
    }

    tracing::info!(
        data_dir = %config.data_dir.display(),
        cache_ttl_secs = config.cache_ttl.as_secs(),
        refresh_mode = config.refresh_mode.as_str(),
        "Configuration loaded"
    );

    let state = AppState::new(config);
    let app: Router = create_router(state);

    tracing::info!(%addr, "Starting Bulletin API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
