//! Prometheus Metrics Definitions
//!
//! Defines the Bulletin metrics and the /metrics scrape endpoint.

use axum::{http::StatusCode, response::IntoResponse};
use bulletin_storage::DatasetKey;
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};

use crate::error::{ApiError, ApiResult};

/// HTTP request latency buckets (seconds)
/// Covers: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 2.5s
const HTTP_LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5,
];

/// Global metrics instance - initialized on first use
pub static METRICS: Lazy<ApiResult<BulletinMetrics>> = Lazy::new(BulletinMetrics::new);

/// Container for all Bulletin metrics.
#[derive(Clone)]
pub struct BulletinMetrics {
    /// HTTP request counter - labels: method, path, status
    pub http_requests_total: CounterVec,

    /// HTTP request duration histogram - labels: method, path
    pub http_request_duration_seconds: HistogramVec,

    /// Cache lookups - labels: dataset, outcome (hit/miss)
    pub cache_lookups_total: CounterVec,

    /// Failed dataset loads - labels: dataset
    pub dataset_refresh_failures_total: CounterVec,
}

impl BulletinMetrics {
    /// Create and register all metrics with the default Prometheus registry.
    pub fn new() -> ApiResult<Self> {
        Ok(Self {
            http_requests_total: register_counter_vec!(
                "bulletin_http_requests_total",
                "Total number of HTTP requests",
                &["method", "path", "status"]
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register http_requests_total: {}", e)))?,

            http_request_duration_seconds: register_histogram_vec!(
                "bulletin_http_request_duration_seconds",
                "HTTP request duration in seconds",
                &["method", "path"],
                HTTP_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register http_request_duration_seconds: {}", e)))?,

            cache_lookups_total: register_counter_vec!(
                "bulletin_cache_lookups_total",
                "Dataset cache lookups by outcome",
                &["dataset", "outcome"]
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register cache_lookups_total: {}", e)))?,

            dataset_refresh_failures_total: register_counter_vec!(
                "bulletin_dataset_refresh_failures_total",
                "Dataset loads that failed",
                &["dataset"]
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register dataset_refresh_failures_total: {}", e)))?,
        })
    }

    /// Record an HTTP request.
    pub fn record_http_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let status = status.to_string();
        self.http_requests_total
            .with_label_values(&[method, path, status.as_str()])
            .inc();
        self.http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);
    }

    /// Record a successful cache lookup.
    pub fn record_cache_lookup(&self, dataset: DatasetKey, hit: bool) {
        let outcome = if hit { "hit" } else { "miss" };
        self.cache_lookups_total
            .with_label_values(&[dataset.as_str(), outcome])
            .inc();
    }

    /// Record a failed dataset load.
    pub fn record_refresh_failure(&self, dataset: DatasetKey) {
        self.dataset_refresh_failures_total
            .with_label_values(&[dataset.as_str()])
            .inc();
    }
}

/// GET /metrics - Prometheus text exposition.
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain")],
                format!("Failed to encode metrics: {}", e).into_bytes(),
            )
        }
    }
}
