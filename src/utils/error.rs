//! Error types and handling
//!
//! Engine-level failures are reported as [`AuditError`]; HTTP handlers convert
//! them into [`AppError`], which renders a consistent JSON response body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

/// Failures of audit writes and store reads
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuditError {
    /// The event store is unreachable or rejected the write
    #[error("Storage error: {0}")]
    Storage(String),

    /// A record is missing a required field
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AuditError {
    pub fn storage(msg: impl Into<String>) -> Self {
        AuditError::Storage(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AuditError::Validation(msg.into())
    }
}

impl From<sqlx::Error> for AuditError {
    fn from(err: sqlx::Error) -> Self {
        AuditError::Storage(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AuditError {
    fn from(err: validator::ValidationErrors) -> Self {
        AuditError::Validation(err.to_string())
    }
}

/// Which half of a paired activity/change write was lost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingWrite {
    Activity,
    Change,
}

/// Non-fatal divergence between an activity and its change records
///
/// The successful writes are kept; this only reports what is missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialAuditWriteWarning {
    pub change_set_id: Uuid,
    pub missing: MissingWrite,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,
    pub reason: String,
}

impl std::fmt::Display for PartialAuditWriteWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.missing, &self.field_name) {
            (MissingWrite::Change, Some(field)) => write!(
                f,
                "change record for field '{}' of change set {} was not written: {}",
                field, self.change_set_id, self.reason
            ),
            (MissingWrite::Change, None) => write!(
                f,
                "change record of change set {} was not written: {}",
                self.change_set_id, self.reason
            ),
            (MissingWrite::Activity, _) => write!(
                f,
                "activity record of change set {} was not written: {}",
                self.change_set_id, self.reason
            ),
        }
    }
}

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// Resource not found (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request - invalid input (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Unprocessable entity - validation failed (422)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Event store failure (503)
    #[error("Storage error: {0}")]
    Storage(String),
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        AppError::BadRequest(msg.into())
    }
}

/// Error response body
#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    /// Error type identifier
    pub error: String,
    /// Human-readable error message
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, should_log) = match &self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found", false),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request", false),
            AppError::ValidationError(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "validation_error", false)
            }
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", true),
            AppError::Storage(_) => (StatusCode::SERVICE_UNAVAILABLE, "storage_error", true),
        };

        if should_log {
            error!(error = %self, error_type = error_type, "Request error");
        }

        let body = ErrorResponse::new(error_type, self.to_string());

        (status, Json(body)).into_response()
    }
}

impl From<AuditError> for AppError {
    fn from(err: AuditError) -> Self {
        match err {
            AuditError::Storage(msg) => AppError::Storage(msg),
            AuditError::Validation(msg) => AppError::ValidationError(msg),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
