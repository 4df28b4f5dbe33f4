//! Bulletin API - HTTP layer for the Bulletin content server
//!
//! Serves the events, news and FAQ datasets as JSON and as an HTML page,
//! with liveness/readiness probes and Prometheus metrics. All dataset reads
//! go through the TTL cache in `bulletin-storage`.

pub mod config;
pub mod error;
pub mod macros;
pub mod routes;
pub mod state;
pub mod telemetry;

// Re-export commonly used types
pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use routes::content::ContentResponse;
pub use routes::create_router;
pub use routes::health::{ProbeResponse, ProbeStatus};
pub use state::AppState;
