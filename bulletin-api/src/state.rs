//! Shared application state for Axum routers.

use std::sync::Arc;

use bulletin_storage::{DatasetCache, SourceRegistry};

use crate::config::ServerConfig;

/// Application-wide state shared across all routes.
///
/// Built once at startup. The cache is the only mutable part and manages
/// its own synchronization.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Process-wide dataset cache.
    pub cache: Arc<DatasetCache>,
    /// File sources for every dataset, rooted at the data directory.
    pub sources: Arc<SourceRegistry>,
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Build state with a system-clock cache from the configuration.
    pub fn new(config: ServerConfig) -> Self {
        let cache = Arc::new(DatasetCache::new(config.cache_config()));
        Self::with_cache(config, cache)
    }

    /// Build state around an existing cache.
    pub fn with_cache(config: ServerConfig, cache: Arc<DatasetCache>) -> Self {
        let sources = Arc::new(SourceRegistry::new(config.data_dir.clone()));
        Self {
            config: Arc::new(config),
            cache,
            sources,
            start_time: std::time::Instant::now(),
        }
    }
}

crate::impl_from_ref!(Arc<ServerConfig>, config);
crate::impl_from_ref!(Arc<DatasetCache>, cache);
crate::impl_from_ref!(Arc<SourceRegistry>, sources);
crate::impl_from_ref!(std::time::Instant, start_time);
