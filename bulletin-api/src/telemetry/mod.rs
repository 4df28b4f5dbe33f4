//! Bulletin Telemetry
//!
//! Structured logging through tracing-subscriber and Prometheus metrics for
//! the HTTP layer. Everything works without an external collector.

pub mod metrics;
pub mod middleware;
pub mod tracer;

pub use metrics::{metrics_handler, BulletinMetrics, METRICS};
pub use middleware::observability_middleware;
pub use tracer::{init_tracing, LogFormat, TelemetryConfig};
