//! Response types for the time bucketing API.
//!
//! This module defines the success bodies, the error response structure and
//! the mapping from [`EngineError`] to HTTP status codes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::batch::{BatchOutcome, DeferredWeek, SkippedShift};
use crate::error::EngineError;
use crate::models::{AuditWarning, PayrollBatch};

/// Body returned by a successful `POST /batches`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRunResponse {
    /// The new batch id.
    pub batch_id: Uuid,
    /// The committed batch row.
    pub batch: PayrollBatch,
    /// Shifts snapshotted.
    pub included: usize,
    /// Earlier-paid shifts given an overtime adjustment.
    pub adjusted: usize,
    /// Shifts left out, with reasons.
    pub skipped: Vec<SkippedShift>,
    /// Employee-weeks whose overtime waits for the next period.
    pub deferred_weeks: Vec<DeferredWeek>,
    /// Included shifts whose remaining minutes the next period's run pays.
    pub awaiting_next_period: Vec<i64>,
    /// Total overtime minutes placed.
    pub overtime_minutes: i64,
    /// Configuration gaps the run worked around.
    pub warnings: Vec<AuditWarning>,
}

impl From<BatchOutcome> for BatchRunResponse {
    fn from(outcome: BatchOutcome) -> Self {
        Self {
            batch_id: outcome.batch.id,
            included: outcome.included_count(),
            adjusted: outcome.adjustments.len(),
            overtime_minutes: outcome.overtime_minutes(),
            batch: outcome.batch,
            skipped: outcome.skipped,
            deferred_weeks: outcome.deferred_weeks,
            awaiting_next_period: outcome.awaiting_next_period,
            warnings: outcome.warnings,
        }
    }
}

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// A 400 with the given error body.
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

fn internal(code: &str, message: &str, details: String) -> ApiErrorResponse {
    ApiErrorResponse {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        error: ApiError::with_details(code, message, details),
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        match error {
            EngineError::ConfigNotFound { path } => internal(
                "CONFIG_ERROR",
                "Configuration error",
                format!("Configuration file not found: {}", path),
            ),
            EngineError::ConfigParseError { path, message } => internal(
                "CONFIG_ERROR",
                "Configuration parse error",
                format!("Failed to parse {}: {}", path, message),
            ),
            EngineError::InvalidTimezone { value } => internal(
                "CONFIG_ERROR",
                "Invalid payroll timezone",
                format!("'{}' is not a known IANA timezone", value),
            ),
            EngineError::InvalidSettings { field, message } => internal(
                "CONFIG_ERROR",
                "Invalid settings",
                format!("{}: {}", field, message),
            ),
            err @ EngineError::InvalidPeriod { .. } => ApiErrorResponse::bad_request(
                ApiError::with_details(
                    "INVALID_PERIOD",
                    err.to_string(),
                    "No batch was created and no shifts were locked",
                ),
            ),
            EngineError::ShiftNotFound { shift_id } => ApiErrorResponse {
                status: StatusCode::NOT_FOUND,
                error: ApiError::new("SHIFT_NOT_FOUND", format!("Shift not found: {}", shift_id)),
            },
            EngineError::BatchNotFound { batch_id } => ApiErrorResponse {
                status: StatusCode::NOT_FOUND,
                error: ApiError::new("BATCH_NOT_FOUND", format!("Payroll batch not found: {}", batch_id)),
            },
            err @ (EngineError::CorruptRecord { .. }
            | EngineError::Database(_)
            | EngineError::Migration(_)
            | EngineError::Serialization(_)) => internal(
                "STORAGE_ERROR",
                "Payroll run failed and was rolled back",
                err.to_string(),
            ),
        }
    }
}
