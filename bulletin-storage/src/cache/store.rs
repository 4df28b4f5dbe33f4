//! The dataset cache.
//!
//! One slot per [`DatasetKey`], populated lazily on first read and replaced
//! whenever a read finds it stale. Entries are never evicted.

use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use super::freshness::{is_fresh, CacheRead};
use crate::clock::{Clock, SystemClock};
use crate::error::{SourceError, SourceResult};
use crate::key::DatasetKey;
use crate::normalize::{normalize, Dataset};
use crate::source::DataSource;

/// How concurrent refreshes of the same key are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshMode {
    /// No lock is held while loading. Concurrent stale readers may each load
    /// the source; the last writer wins. Loads are deterministic, so every
    /// writer stores the same data.
    #[default]
    Permissive,
    /// A per-key async mutex is held across check, load and store. At most
    /// one load per key is in flight; waiters are served the fresh value.
    SingleFlight,
}

impl RefreshMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefreshMode::Permissive => "permissive",
            RefreshMode::SingleFlight => "single-flight",
        }
    }
}

impl FromStr for RefreshMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "permissive" => Ok(RefreshMode::Permissive),
            "single-flight" | "single_flight" | "singleflight" => Ok(RefreshMode::SingleFlight),
            other => Err(format!("unknown refresh mode '{}'", other)),
        }
    }
}

/// Configuration for the dataset cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Process-wide TTL shared by every dataset.
    pub ttl: Duration,
    pub refresh_mode: RefreshMode,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            refresh_mode: RefreshMode::Permissive,
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_refresh_mode(mut self, mode: RefreshMode) -> Self {
        self.refresh_mode = mode;
        self
    }
}

/// Counters describing cache usage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Reads served from a fresh entry.
    pub hits: u64,
    /// Reads that loaded and stored a new value.
    pub refreshes: u64,
    /// Loads that failed and left the entry untouched.
    pub refresh_failures: u64,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    data: Option<Arc<Dataset>>,
    /// Only meaningful while `data` is present.
    computed_at: DateTime<Utc>,
}

impl Default for CacheEntry {
    fn default() -> Self {
        Self {
            data: None,
            computed_at: DateTime::<Utc>::MIN_UTC,
        }
    }
}

#[derive(Debug, Default)]
struct Slot {
    entry: RwLock<CacheEntry>,
    refresh: Mutex<()>,
}

impl Slot {
    fn read(&self) -> CacheEntry {
        self.entry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn store(&self, data: Arc<Dataset>, computed_at: DateTime<Utc>) {
        let mut entry = self.entry.write().unwrap_or_else(PoisonError::into_inner);
        *entry = CacheEntry {
            data: Some(data),
            computed_at,
        };
    }
}

/// TTL memoization of normalized datasets.
///
/// Constructed once at startup and shared behind an `Arc`.
pub struct DatasetCache {
    slots: [Slot; 3],
    config: CacheConfig,
    clock: Arc<dyn Clock>,
    hits: AtomicU64,
    refreshes: AtomicU64,
    refresh_failures: AtomicU64,
}

impl DatasetCache {
    /// Create an empty cache driven by the system clock.
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create an empty cache driven by the given clock.
    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            slots: Default::default(),
            config,
            clock,
            hits: AtomicU64::new(0),
            refreshes: AtomicU64::new(0),
            refresh_failures: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// The configured TTL.
    pub fn ttl(&self) -> Duration {
        self.config.ttl
    }

    /// Read a dataset using the configured TTL.
    pub async fn get<S>(&self, key: DatasetKey, source: &S) -> SourceResult<CacheRead<Arc<Dataset>>>
    where
        S: DataSource + ?Sized,
    {
        self.get_or_refresh(key, self.config.ttl, source).await
    }

    /// Return the cached dataset if fresh, otherwise load, normalize and store it.
    ///
    /// The clock is read once per call. A failed load is returned as-is and
    /// leaves the entry (data and timestamp) untouched.
    pub async fn get_or_refresh<S>(
        &self,
        key: DatasetKey,
        ttl: Duration,
        source: &S,
    ) -> SourceResult<CacheRead<Arc<Dataset>>>
    where
        S: DataSource + ?Sized,
    {
        if source.key() != key {
            return Err(SourceError::WrongDataset {
                expected: key,
                actual: source.key(),
            });
        }

        let now = self.clock.now();
        let slot = &self.slots[key.index()];

        if let Some(read) = self.lookup(slot, key, now, ttl) {
            return Ok(read);
        }

        match self.config.refresh_mode {
            RefreshMode::Permissive => self.refresh(slot, key, now, source).await,
            RefreshMode::SingleFlight => {
                let _guard = slot.refresh.lock().await;
                // Another task may have refreshed while we waited.
                if let Some(read) = self.lookup(slot, key, now, ttl) {
                    return Ok(read);
                }
                self.refresh(slot, key, now, source).await
            }
        }
    }

    /// Current entry for `key` without checking freshness or loading.
    pub fn snapshot(&self, key: DatasetKey) -> Option<CacheRead<Arc<Dataset>>> {
        let entry = self.slots[key.index()].read();
        let now = self.clock.now();
        entry
            .data
            .map(|data| CacheRead::from_cache(data, entry.computed_at, now))
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            refreshes: self.refreshes.load(Ordering::Relaxed),
            refresh_failures: self.refresh_failures.load(Ordering::Relaxed),
        }
    }

    fn lookup(
        &self,
        slot: &Slot,
        key: DatasetKey,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Option<CacheRead<Arc<Dataset>>> {
        let entry = slot.read();
        let data = entry.data?;
        if !is_fresh(entry.computed_at, now, ttl) {
            return None;
        }

        self.hits.fetch_add(1, Ordering::Relaxed);
        let read = CacheRead::from_cache(data, entry.computed_at, now);
        tracing::debug!(
            dataset = %key,
            age_ms = read.staleness().as_millis() as u64,
            "Dataset cache hit"
        );
        Some(read)
    }

    async fn refresh<S>(
        &self,
        slot: &Slot,
        key: DatasetKey,
        now: DateTime<Utc>,
        source: &S,
    ) -> SourceResult<CacheRead<Arc<Dataset>>>
    where
        S: DataSource + ?Sized,
    {
        let raw = match source.load().await {
            Ok(raw) => raw,
            Err(err) => {
                self.refresh_failures.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    dataset = %key,
                    source = %source.describe(),
                    error = %err,
                    "Dataset refresh failed"
                );
                return Err(err);
            }
        };

        let data = Arc::new(normalize(raw));
        slot.store(Arc::clone(&data), now);
        self.refreshes.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            dataset = %key,
            source = %source.describe(),
            items = data.len(),
            "Dataset refreshed"
        );

        Ok(CacheRead::from_source(data, now))
    }
}

impl std::fmt::Debug for DatasetCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatasetCache")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    #[test]
    fn test_refresh_mode_parsing() {
        assert_eq!("permissive".parse::<RefreshMode>(), Ok(RefreshMode::Permissive));
        assert_eq!("Single-Flight".parse::<RefreshMode>(), Ok(RefreshMode::SingleFlight));
        assert_eq!("single_flight".parse::<RefreshMode>(), Ok(RefreshMode::SingleFlight));
        assert!("eager".parse::<RefreshMode>().is_err());
        assert_eq!(RefreshMode::default(), RefreshMode::Permissive);
    }

    #[test]
    fn test_cache_config_builder() {
        let config = CacheConfig::new()
            .with_ttl(Duration::from_secs(5))
            .with_refresh_mode(RefreshMode::SingleFlight);
        assert_eq!(config.ttl, Duration::from_secs(5));
        assert_eq!(config.refresh_mode, RefreshMode::SingleFlight);
    }

    #[test]
    fn test_new_cache_is_empty() {
        let cache = DatasetCache::with_clock(CacheConfig::default(), Arc::new(ManualClock::default()));
        for key in DatasetKey::ALL {
            assert!(cache.snapshot(key).is_none());
        }
        assert_eq!(cache.stats(), CacheStats::default());
        assert_eq!(cache.ttl(), Duration::from_secs(60));
    }
}
