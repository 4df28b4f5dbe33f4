//! HTTP routes.
//!
//! - `/healthz`, `/readyz` - probes
//! - `/api/{events,news,faq}` - datasets as JSON
//! - `/` - HTML overview
//! - `/metrics` - Prometheus scrape endpoint

pub mod content;
pub mod health;
pub mod index;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn,
    routing::get,
    Router,
};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::state::AppState;
use crate::telemetry::{metrics_handler, observability_middleware};

pub use content::create_router as content_router;
pub use health::create_router as health_router;
pub use index::create_router as index_router;

/// CORS preflight cache lifetime.
const CORS_MAX_AGE: Duration = Duration::from_secs(3600);

/// Build the full application router.
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config);

    Router::new()
        .merge(health_router())
        .merge(index_router())
        .nest("/api", content_router())
        .route("/metrics", get(metrics_handler))
        .fallback(not_found)
        .layer(from_fn(observability_middleware))
        .layer(cors)
        .with_state(state)
}

async fn not_found() -> ApiError {
    ApiError::not_found("No such endpoint")
}

fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE])
        .max_age(CORS_MAX_AGE);

    if config.cors_origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    cors.allow_origin(origins)
}
