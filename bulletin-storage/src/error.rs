//! Error types for dataset loading.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::key::DatasetKey;
use crate::source::SourceFormat;

/// Failure to produce a raw value from a data source.
///
/// Shape problems are not errors: they are absorbed by the normalizer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("Data file not found: {}", path.display())]
    MissingFile { path: PathBuf },

    #[error("Failed to parse {format} file {}: {reason}", path.display())]
    Parse {
        path: PathBuf,
        format: SourceFormat,
        reason: String,
    },

    #[error("Failed to read {}: {reason}", path.display())]
    Io { path: PathBuf, reason: String },

    /// A source was handed to the cache under another dataset's key.
    #[error("Source for {actual} used to load {expected}")]
    WrongDataset {
        expected: DatasetKey,
        actual: DatasetKey,
    },
}

impl SourceError {
    /// Classify an I/O error raised while reading `path`.
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => SourceError::MissingFile {
                path: path.to_path_buf(),
            },
            io::ErrorKind::InvalidData => SourceError::Parse {
                path: path.to_path_buf(),
                format: SourceFormat::from_path(path),
                reason: err.to_string(),
            },
            _ => SourceError::Io {
                path: path.to_path_buf(),
                reason: err.to_string(),
            },
        }
    }

    pub fn parse(path: &Path, format: SourceFormat, reason: impl Into<String>) -> Self {
        SourceError::Parse {
            path: path.to_path_buf(),
            format,
            reason: reason.into(),
        }
    }

    /// The file the failure refers to, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            SourceError::MissingFile { path }
            | SourceError::Parse { path, .. }
            | SourceError::Io { path, .. } => Some(path),
            SourceError::WrongDataset { .. } => None,
        }
    }

    pub fn is_missing_file(&self) -> bool {
        matches!(self, SourceError::MissingFile { .. })
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, SourceError::Parse { .. })
    }
}

/// Result type for dataset loading.
pub type SourceResult<T> = Result<T, SourceError>;
