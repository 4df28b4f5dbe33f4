//! Data sources: where a dataset's raw value comes from.
//!
//! The cache never reads files itself. It asks a [`DataSource`] for a raw
//! value whenever an entry is empty or stale, so tests can substitute
//! scripted sources and the server wires one [`FileSource`] per dataset.

use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{SourceError, SourceResult};
use crate::key::DatasetKey;

/// On-disk format of a data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// Strict JSON.
    Json,
    /// YAML, converted into a JSON value tree.
    Yaml,
}

impl SourceFormat {
    /// Guess the format from a file extension. Anything not YAML is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => SourceFormat::Yaml,
            _ => SourceFormat::Json,
        }
    }

    /// Parse file content into a generic value.
    pub fn parse(&self, path: &Path, content: &str) -> SourceResult<Value> {
        match self {
            SourceFormat::Json => serde_json::from_str(content)
                .map_err(|e| SourceError::parse(path, *self, e.to_string())),
            // An empty YAML stream is a null document.
            SourceFormat::Yaml if content.trim().is_empty() => Ok(Value::Null),
            SourceFormat::Yaml => {
                let mut value = serde_yaml::from_str::<serde_yaml::Value>(content)
                    .map_err(|e| SourceError::parse(path, *self, e.to_string()))?;
                // Resolve `<<: *anchor` merge keys into their mappings.
                value
                    .apply_merge()
                    .map_err(|e| SourceError::parse(path, *self, e.to_string()))?;
                Ok(yaml_to_json(value))
            }
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFormat::Json => f.write_str("JSON"),
            SourceFormat::Yaml => f.write_str("YAML"),
        }
    }
}

/// Convert a YAML tree into JSON.
///
/// Scalar mapping keys are stringified, tags are dropped in favour of the
/// tagged value and non-finite floats become `null`.
fn yaml_to_json(value: serde_yaml::Value) -> Value {
    use serde_yaml::Value as Yaml;

    match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            }
        }
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(seq) => Value::Array(seq.into_iter().map(yaml_to_json).collect()),
        Yaml::Mapping(mapping) => {
            let mut map = Map::with_capacity(mapping.len());
            for (k, v) in mapping {
                map.insert(yaml_key(k), yaml_to_json(v));
            }
            Value::Object(map)
        }
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

fn yaml_key(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        serde_yaml::Value::Null => "null".to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        other => yaml_to_json(other).to_string(),
    }
}

/// Produces the raw value for one dataset.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// The dataset this source feeds.
    fn key(&self) -> DatasetKey;

    /// Short description for logs (usually a path).
    fn describe(&self) -> String;

    /// Load and parse the raw value. Called only on a cache miss.
    async fn load(&self) -> SourceResult<Value>;
}

/// A dataset backed by a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSource {
    key: DatasetKey,
    path: PathBuf,
    format: SourceFormat,
}

impl FileSource {
    pub fn new(key: DatasetKey, path: impl Into<PathBuf>, format: SourceFormat) -> Self {
        Self {
            key,
            path: path.into(),
            format,
        }
    }

    /// The conventional file for `key` inside `data_dir`.
    pub fn for_dataset(data_dir: &Path, key: DatasetKey) -> Self {
        Self::new(key, data_dir.join(key.file_name()), key.format())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> SourceFormat {
        self.format
    }
}

#[async_trait]
impl DataSource for FileSource {
    fn key(&self) -> DatasetKey {
        self.key
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn load(&self) -> SourceResult<Value> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| SourceError::from_io(&self.path, e))?;
        self.format.parse(&self.path, &content)
    }
}

/// One [`FileSource`] per dataset, rooted at the data directory.
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    data_dir: PathBuf,
    sources: [FileSource; 3],
}

impl SourceRegistry {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        let sources = DatasetKey::ALL.map(|key| FileSource::for_dataset(&data_dir, key));
        Self { data_dir, sources }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Source for the given dataset.
    pub fn get(&self, key: DatasetKey) -> &FileSource {
        &self.sources[key.index()]
    }
}
