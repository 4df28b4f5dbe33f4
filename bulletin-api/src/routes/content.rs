//! Dataset Endpoints
//!
//! `/api/events`, `/api/news` and `/api/faq` each return the normalized
//! dataset plus whether it came from the cache.

use axum::{extract::State, routing::get, Json, Router};
use bulletin_storage::{CacheRead, Dataset, DatasetKey};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::telemetry::METRICS;

// ============================================================================
// TYPES
// ============================================================================

/// Response body for every dataset endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentResponse {
    pub items: Vec<Value>,
    /// True iff the items were served without reading the file.
    pub cached: bool,
}

impl From<CacheRead<Arc<Dataset>>> for ContentResponse {
    fn from(read: CacheRead<Arc<Dataset>>) -> Self {
        let cached = read.was_cache_hit();
        Self {
            items: read.into_value().items.clone(),
            cached,
        }
    }
}

// ============================================================================
// SHARED LOADING
// ============================================================================

/// Read a dataset through the cache, recording metrics and mapping failures.
pub async fn load_dataset(state: &AppState, key: DatasetKey) -> ApiResult<CacheRead<Arc<Dataset>>> {
    let source = state.sources.get(key);
    match state.cache.get(key, source).await {
        Ok(read) => {
            if let Ok(metrics) = METRICS.as_ref() {
                metrics.record_cache_lookup(key, read.was_cache_hit());
            }
            Ok(read)
        }
        Err(err) => {
            if let Ok(metrics) = METRICS.as_ref() {
                metrics.record_refresh_failure(key);
            }
            Err(ApiError::dataset_failure(key, &err))
        }
    }
}

async fn serve(state: &AppState, key: DatasetKey) -> ApiResult<Json<ContentResponse>> {
    let read = load_dataset(state, key).await?;
    Ok(Json(ContentResponse::from(read)))
}

// ============================================================================
// HANDLERS
// ============================================================================

/// GET /api/events
pub async fn get_events(State(state): State<AppState>) -> ApiResult<Json<ContentResponse>> {
    serve(&state, DatasetKey::Events).await
}

/// GET /api/news
pub async fn get_news(State(state): State<AppState>) -> ApiResult<Json<ContentResponse>> {
    serve(&state, DatasetKey::News).await
}

/// GET /api/faq
pub async fn get_faq(State(state): State<AppState>) -> ApiResult<Json<ContentResponse>> {
    serve(&state, DatasetKey::Faq).await
}

// ============================================================================
// ROUTER SETUP
// ============================================================================

/// Dataset routes, nested under `/api`.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/events", get(get_events))
        .route("/news", get(get_news))
        .route("/faq", get(get_faq))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn test_content_response_shape() -> Result<(), String> {
        let dataset = Arc::new(Dataset::new(vec![json!({"id": 1})]));
        let read = CacheRead::from_source(dataset, Utc::now());
        let body = serde_json::to_string(&ContentResponse::from(read)).map_err(|e| e.to_string())?;
        assert_eq!(body, r#"{"items":[{"id":1}],"cached":false}"#);
        Ok(())
    }

    #[test]
    fn test_content_response_from_cache_hit() {
        let now = Utc::now();
        let read = CacheRead::from_cache(Arc::new(Dataset::empty()), now, now);
        let response = ContentResponse::from(read);
        assert!(response.cached);
        assert!(response.items.is_empty());
    }
}
