//! Freshness rules and read results.
//!
//! An entry is fresh while its age is strictly below the TTL. Reads return
//! a [`CacheRead`] so callers always know whether they got a cached value
//! and how old it is.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Returns true if a value computed at `computed_at` may still be served at `now`.
///
/// The window is closed-open: at exactly `ttl` of age the value is stale.
/// A `computed_at` in the future (clock stepped backwards) counts as fresh.
pub fn is_fresh(computed_at: DateTime<Utc>, now: DateTime<Utc>, ttl: Duration) -> bool {
    let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
    now.signed_duration_since(computed_at) < ttl
}

/// Age of a value, saturating at zero when the clock went backwards.
pub fn age(computed_at: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    now.signed_duration_since(computed_at)
        .to_std()
        .unwrap_or(Duration::ZERO)
}

/// Result of a cache read, carrying staleness metadata.
#[derive(Debug, Clone)]
pub struct CacheRead<T> {
    value: T,
    /// When the value was computed.
    cached_at: DateTime<Utc>,
    /// Clock reading taken for this lookup.
    read_at: DateTime<Utc>,
    was_cache_hit: bool,
}

impl<T> CacheRead<T> {
    /// A value served from the cache.
    pub fn from_cache(value: T, cached_at: DateTime<Utc>, read_at: DateTime<Utc>) -> Self {
        Self {
            value,
            cached_at,
            read_at,
            was_cache_hit: true,
        }
    }

    /// A value freshly loaded from its source.
    pub fn from_source(value: T, computed_at: DateTime<Utc>) -> Self {
        Self {
            value,
            cached_at: computed_at,
            read_at: computed_at,
            was_cache_hit: false,
        }
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn cached_at(&self) -> DateTime<Utc> {
        self.cached_at
    }

    /// How old the value was when this read happened.
    pub fn staleness(&self) -> Duration {
        age(self.cached_at, self.read_at)
    }

    pub fn was_cache_hit(&self) -> bool {
        self.was_cache_hit
    }

    pub fn was_cache_miss(&self) -> bool {
        !self.was_cache_hit
    }
}
