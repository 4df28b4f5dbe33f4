//! Health Check Endpoints
//!
//! - /healthz - liveness, always 200
//! - /readyz - readiness, 200 iff the data directory exists
//!
//! Readiness only checks the directory. Individual dataset failures show up
//! on their own endpoints.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::ServerConfig;
use crate::state::AppState;

// ============================================================================
// TYPES
// ============================================================================

/// Probe response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResponse {
    pub status: ProbeStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeStatus {
    Ok,
    Ready,
    NotReady,
}

// ============================================================================
// HANDLERS
// ============================================================================

/// GET /healthz - Process liveness check
pub async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(ProbeResponse {
            status: ProbeStatus::Ok,
        }),
    )
}

/// GET /readyz - Readiness check (data directory present)
pub async fn readyz(State(config): State<Arc<ServerConfig>>) -> impl IntoResponse {
    if config.data_dir_exists() {
        (
            StatusCode::OK,
            Json(ProbeResponse {
                status: ProbeStatus::Ready,
            }),
        )
    } else {
        tracing::warn!(data_dir = %config.data_dir.display(), "Data directory missing");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ProbeResponse {
                status: ProbeStatus::NotReady,
            }),
        )
    }
}

// ============================================================================
// ROUTER SETUP
// ============================================================================

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_serialization() -> Result<(), String> {
        let body = |status| {
            serde_json::to_string(&ProbeResponse { status }).map_err(|e| e.to_string())
        };
        assert_eq!(body(ProbeStatus::Ok)?, r#"{"status":"ok"}"#);
        assert_eq!(body(ProbeStatus::Ready)?, r#"{"status":"ready"}"#);
        assert_eq!(body(ProbeStatus::NotReady)?, r#"{"status":"not_ready"}"#);
        Ok(())
    }
}
