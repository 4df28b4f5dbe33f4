//! Error Types for the Bulletin API
//!
//! This module defines error handling for the HTTP layer:
//! - ApiError struct for structured error responses
//! - ErrorCode enum for categorizing errors
//! - IntoResponse implementation for Axum HTTP responses
//!
//! All errors are serialized as JSON with appropriate HTTP status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bulletin_storage::{DatasetKey, SourceError};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::ConfigError;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Request contains invalid input data
    InvalidInput,

    /// No route matches the request
    NotFound,

    /// A dataset file is missing or unreadable
    DatasetUnavailable,

    /// A dataset file exists but does not parse
    DatasetInvalid,

    /// Internal server error
    InternalError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::DatasetUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::DatasetInvalid | ErrorCode::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get a default message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::InvalidInput => "Invalid input data",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::DatasetUnavailable => "Dataset is unavailable",
            ErrorCode::DatasetInvalid => "Dataset could not be parsed",
            ErrorCode::InternalError => "Internal server error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Structured error response for API operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Create a new API error with the given code, using the default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self::new(code, code.default_message())
    }

    /// Add additional details to the error.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Map a failed dataset load to a response.
    ///
    /// Missing or unreadable files are 503, unparsable files and miswired
    /// sources are 500. The filesystem path stays in the logs and is not
    /// echoed to clients.
    pub fn dataset_failure(key: DatasetKey, err: &SourceError) -> Self {
        let (code, message) = match err {
            SourceError::MissingFile { .. } => (
                ErrorCode::DatasetUnavailable,
                format!("{} data file not found", key.title()),
            ),
            SourceError::Parse { format, .. } => (
                ErrorCode::DatasetInvalid,
                format!("{} data file is not valid {}", key.title(), format),
            ),
            SourceError::Io { .. } => (
                ErrorCode::DatasetUnavailable,
                format!("{} data file could not be read", key.title()),
            ),
            SourceError::WrongDataset { .. } => {
                tracing::error!(dataset = %key, error = %err, "Dataset source misconfigured");
                (
                    ErrorCode::InternalError,
                    ErrorCode::InternalError.default_message().to_string(),
                )
            }
        };
        Self::new(code, message).with_details(serde_json::json!({ "dataset": key.as_str() }))
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self);
        (status, body).into_response()
    }
}

// ============================================================================
// CONVERSIONS
// ============================================================================

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::invalid_input(err.to_string())
    }
}

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use bulletin_storage::SourceFormat;
    use std::path::PathBuf;

    #[test]
    fn test_error_code_status_mapping() {
        assert_eq!(ErrorCode::InvalidInput.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorCode::DatasetUnavailable.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ErrorCode::DatasetInvalid.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_code_serializes_screaming_snake() -> Result<(), String> {
        let json = serde_json::to_string(&ErrorCode::DatasetUnavailable)
            .map_err(|e| e.to_string())?;
        assert_eq!(json, "\"DATASET_UNAVAILABLE\"");
        Ok(())
    }

    #[test]
    fn test_missing_file_maps_to_unavailable() {
        let err = SourceError::MissingFile {
            path: PathBuf::from("/srv/data/events.json"),
        };
        let api = ApiError::dataset_failure(DatasetKey::Events, &err);

        assert_eq!(api.code, ErrorCode::DatasetUnavailable);
        assert_eq!(api.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(!api.message.contains("/srv/data"));
        assert_eq!(api.details, Some(serde_json::json!({"dataset": "events"})));
    }

    #[test]
    fn test_parse_error_maps_to_invalid() {
        let err = SourceError::Parse {
            path: PathBuf::from("faq.yaml"),
            format: SourceFormat::Yaml,
            reason: "bad indentation".to_string(),
        };
        let api = ApiError::dataset_failure(DatasetKey::Faq, &err);

        assert_eq!(api.code, ErrorCode::DatasetInvalid);
        assert_eq!(api.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.message, "FAQ data file is not valid YAML");
    }

    #[test]
    fn test_wrong_dataset_maps_to_internal_error() {
        let err = SourceError::WrongDataset {
            expected: DatasetKey::Events,
            actual: DatasetKey::News,
        };
        let api = ApiError::dataset_failure(DatasetKey::Events, &err);
        assert_eq!(api.code, ErrorCode::InternalError);
        assert_eq!(api.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_io_error_maps_to_unavailable() {
        let err = SourceError::Io {
            path: PathBuf::from("news.json"),
            reason: "permission denied".to_string(),
        };
        let api = ApiError::dataset_failure(DatasetKey::News, &err);
        assert_eq!(api.code, ErrorCode::DatasetUnavailable);
    }

    #[test]
    fn test_details_omitted_when_absent() -> Result<(), String> {
        let json = serde_json::to_value(ApiError::from_code(ErrorCode::NotFound))
            .map_err(|e| e.to_string())?;
        assert!(json.get("details").is_none());
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Resource not found");
        Ok(())
    }
}
