//! Bulletin Storage - datasets, sources and the TTL cache
//!
//! Loads the server's datasets from a data directory, normalizes them into
//! item lists and memoizes each one for a process-wide TTL.

pub mod cache;
pub mod clock;
pub mod error;
pub mod key;
pub mod normalize;
pub mod source;

pub use cache::{is_fresh, CacheConfig, CacheRead, CacheStats, DatasetCache, RefreshMode};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{SourceError, SourceResult};
pub use key::DatasetKey;
pub use normalize::{normalize, Dataset};
pub use source::{DataSource, FileSource, SourceFormat, SourceRegistry};
