//! Dataset keys.
//!
//! The set of datasets is closed: each key owns one cache slot and one
//! source file in the data directory.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::source::SourceFormat;

/// Identifies a dataset and its cache slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKey {
    Events,
    News,
    Faq,
}

impl DatasetKey {
    /// Every dataset, in page order.
    pub const ALL: [DatasetKey; 3] = [DatasetKey::Events, DatasetKey::News, DatasetKey::Faq];

    /// Lowercase name used in routes, logs and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetKey::Events => "events",
            DatasetKey::News => "news",
            DatasetKey::Faq => "faq",
        }
    }

    /// Name of the backing file inside the data directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            DatasetKey::Events => "events.json",
            DatasetKey::News => "news.json",
            DatasetKey::Faq => "faq.yaml",
        }
    }

    /// Format of the backing file.
    pub fn format(&self) -> SourceFormat {
        match self {
            DatasetKey::Events | DatasetKey::News => SourceFormat::Json,
            DatasetKey::Faq => SourceFormat::Yaml,
        }
    }

    /// Human-readable title for rendered pages.
    pub fn title(&self) -> &'static str {
        match self {
            DatasetKey::Events => "Events",
            DatasetKey::News => "News",
            DatasetKey::Faq => "FAQ",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            DatasetKey::Events => 0,
            DatasetKey::News => 1,
            DatasetKey::Faq => 2,
        }
    }
}

impl fmt::Display for DatasetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
