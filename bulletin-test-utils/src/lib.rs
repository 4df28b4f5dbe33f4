//! Bulletin Test Utilities
//!
//! Shared test infrastructure for the Bulletin workspace:
//! - Temporary data directories with sample dataset files
//! - Scripted, call-counting data sources
//! - Proptest generators for raw dataset documents
//! - Cache constructors driven by a manual clock

// Re-export test doubles from their source crate
pub use bulletin_storage::{ManualClock, SystemClock};

pub use bulletin_storage::{
    CacheConfig, CacheRead, DataSource, Dataset, DatasetCache, DatasetKey, RefreshMode,
    SourceError, SourceFormat, SourceRegistry, SourceResult,
};

use async_trait::async_trait;
use proptest::prelude::*;
use serde_json::{json, Map, Value};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tempfile::TempDir;

// ============================================================================
// DATA DIRECTORY FIXTURE
// ============================================================================

/// A temporary data directory, removed on drop.
pub struct DataDirFixture {
    dir: TempDir,
}

impl DataDirFixture {
    /// Empty data directory.
    pub fn new() -> std::io::Result<Self> {
        Ok(Self { dir: TempDir::new()? })
    }

    /// Data directory holding the sample files for every dataset.
    pub fn with_samples() -> std::io::Result<Self> {
        let fixture = Self::new()?;
        fixture.write_json(DatasetKey::Events, &sample_events())?;
        fixture.write_json(DatasetKey::News, &sample_news())?;
        fixture.write_raw(DatasetKey::Faq, SAMPLE_FAQ_YAML)?;
        Ok(fixture)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of the file backing `key`.
    pub fn file(&self, key: DatasetKey) -> PathBuf {
        self.dir.path().join(key.file_name())
    }

    /// Write `value` as the dataset file for `key`.
    ///
    /// YAML datasets are written as JSON text, which is valid YAML.
    pub fn write_json(&self, key: DatasetKey, value: &Value) -> std::io::Result<()> {
        let text = serde_json::to_string_pretty(value)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        self.write_raw(key, &text)
    }

    /// Write raw file content for `key`.
    pub fn write_raw(&self, key: DatasetKey, content: &str) -> std::io::Result<()> {
        std::fs::write(self.file(key), content)
    }

    /// Delete the file backing `key`.
    pub fn remove(&self, key: DatasetKey) -> std::io::Result<()> {
        std::fs::remove_file(self.file(key))
    }

    pub fn registry(&self) -> SourceRegistry {
        SourceRegistry::new(self.dir.path())
    }
}

/// Sample events document.
pub fn sample_events() -> Value {
    json!({
        "items": [
            {"id": 1, "title": "Open day", "date": "2024-05-01"},
            {"id": 2, "title": "Workshop", "date": "2024-06-12"}
        ]
    })
}

/// Sample news document.
pub fn sample_news() -> Value {
    json!({
        "items": [
            {"id": 10, "headline": "New site launched"}
        ]
    })
}

/// Sample FAQ document in YAML.
pub const SAMPLE_FAQ_YAML: &str = "\
items:
  - q: How often is content refreshed?
    a: Every cache window.
  - q: Can I post content?
    a: No, the site is read-only.
";

// ============================================================================
// SCRIPTED DATA SOURCE
// ============================================================================

/// Data source replaying scripted results and counting loads.
///
/// When the script is exhausted every load returns the fallback value.
pub struct ScriptedSource {
    key: DatasetKey,
    fallback: Value,
    script: Mutex<VecDeque<SourceResult<Value>>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(key: DatasetKey, fallback: Value) -> Self {
        Self {
            key,
            fallback,
            script: Mutex::new(VecDeque::new()),
            delay: None,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Sleep for `delay` inside every load, to widen race windows.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue the result of the next unscripted load.
    pub fn push(&self, result: SourceResult<Value>) {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(result);
    }

    /// Queue a missing-file failure.
    pub fn push_missing(&self) {
        self.push(Err(SourceError::MissingFile {
            path: PathBuf::from(self.key.file_name()),
        }));
    }

    /// Number of loads so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of loads that were running at the same time.
    pub fn max_concurrent_loads(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataSource for ScriptedSource {
    fn key(&self) -> DatasetKey {
        self.key
    }

    fn describe(&self) -> String {
        format!("scripted:{}", self.key)
    }

    async fn load(&self) -> SourceResult<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        let next = self
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        next.unwrap_or_else(|| Ok(self.fallback.clone()))
    }
}

// ============================================================================
// CACHE CONSTRUCTORS
// ============================================================================

/// Cache driven by a manual clock, plus a handle to that clock.
pub fn test_cache(ttl: Duration, mode: RefreshMode) -> (Arc<DatasetCache>, ManualClock) {
    let clock = ManualClock::default();
    let config = CacheConfig::new().with_ttl(ttl).with_refresh_mode(mode);
    let cache = Arc::new(DatasetCache::with_clock(config, Arc::new(clock.clone())));
    (cache, clock)
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

/// Strategy for opaque dataset items.
pub fn arb_item() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(|n| json!(n)),
        "[a-zA-Z ]{0,16}".prop_map(Value::String),
        (any::<u32>(), "[a-z]{1,10}").prop_map(|(id, title)| json!({"id": id, "title": title})),
    ]
}

/// Strategy for well-formed dataset documents.
pub fn arb_items_document() -> impl Strategy<Value = (Value, Vec<Value>)> {
    prop::collection::vec(arb_item(), 0..8).prop_map(|items| {
        let mut map = Map::new();
        map.insert("items".to_string(), Value::Array(items.clone()));
        (Value::Object(map), items)
    })
}

/// Strategy for documents that normalize to an empty dataset.
pub fn arb_malformed_document() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        Just(json!([])),
        Just(json!({})),
        "[a-z]{0,8}".prop_map(|s| json!({"items": s})),
        any::<i64>().prop_map(|n| json!({"items": n})),
        prop::collection::vec(arb_item(), 0..4).prop_map(Value::Array),
        arb_item().prop_map(|item| json!({"other": item})),
    ]
}
