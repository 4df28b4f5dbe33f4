//! TTL cache layer with explicit staleness reporting.
//!
//! Every read states whether it was served from cache. Freshness is a pure
//! function of the entry's timestamp, one clock reading and the TTL, so the
//! boundary behaviour can be tested with a [`ManualClock`](crate::clock::ManualClock).
//!
//! # Example
//!
//! ```ignore
//! let cache = DatasetCache::new(CacheConfig::new().with_ttl(Duration::from_secs(60)));
//! let sources = SourceRegistry::new("data");
//!
//! let read = cache.get(DatasetKey::Events, sources.get(DatasetKey::Events)).await?;
//! if read.was_cache_hit() {
//!     tracing::debug!(age = ?read.staleness(), "served from cache");
//! }
//! ```

pub mod freshness;
pub mod store;

pub use freshness::{is_fresh, CacheRead};
pub use store::{CacheConfig, CacheStats, DatasetCache, RefreshMode};
