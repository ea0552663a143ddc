//! HTTP request handlers for the time bucketing API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::batch::{self, BatchRequest};

use super::request::RunBatchRequest;
use super::response::{ApiError, ApiErrorResponse, BatchRunResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/batches", post(run_batch_handler))
        .route("/batches/:batch_id", get(get_batch_handler))
        .route("/shifts/:shift_id/unlock", post(unlock_shift_handler))
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(api_error: ApiErrorResponse) -> Response {
    json_response(api_error.status, api_error.error)
}

fn json_rejection_error(correlation_id: Uuid, rejection: JsonRejection) -> ApiError {
    match rejection {
        JsonRejection::JsonDataError(err) => {
            // The body text carries serde's message
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    }
}

fn path_rejection_error(correlation_id: Uuid, rejection: PathRejection) -> Response {
    let body_text = rejection.body_text();
    warn!(
        correlation_id = %correlation_id,
        error = %body_text,
        "Invalid path parameter"
    );
    json_response(
        StatusCode::BAD_REQUEST,
        ApiError::new("INVALID_ID", body_text),
    )
}

/// Handler for `POST /batches`.
///
/// Runs a payroll batch for the requested month and returns its summary.
async fn run_batch_handler(
    State(state): State<AppState>,
    payload: Result<Json<RunBatchRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing batch run request");

    let request: BatchRequest = match payload {
        Ok(Json(req)) => req.into(),
        Err(rejection) => {
            let error = json_rejection_error(correlation_id, rejection);
            return json_response(StatusCode::BAD_REQUEST, error);
        }
    };

    if request.run_by.trim().is_empty() {
        warn!(correlation_id = %correlation_id, "Batch run rejected without run_by");
        return json_response(
            StatusCode::BAD_REQUEST,
            ApiError::validation_error("run_by must not be empty"),
        );
    }

    let settings = match state.load_settings() {
        Ok(settings) => settings,
        Err(err) => {
            error!(correlation_id = %correlation_id, error = %err, "Settings could not be loaded");
            return error_response(err.into());
        }
    };

    let start_time = Instant::now();
    match batch::run_batch(state.pool(), &settings, &request).await {
        Ok(outcome) => {
            info!(
                correlation_id = %correlation_id,
                batch_id = %outcome.batch.id,
                period = %request.period,
                included = outcome.included_count(),
                skipped = outcome.skipped_count(),
                duration_ms = start_time.elapsed().as_millis() as u64,
                "Batch run completed successfully"
            );
            json_response(StatusCode::CREATED, BatchRunResponse::from(outcome))
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                period = %request.period,
                error = %err,
                "Batch run failed"
            );
            error_response(err.into())
        }
    }
}

/// Handler for `GET /batches/{id}`.
async fn get_batch_handler(
    State(state): State<AppState>,
    batch_id: Result<Path<Uuid>, PathRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let batch_id = match batch_id {
        Ok(Path(id)) => id,
        Err(rejection) => return path_rejection_error(correlation_id, rejection),
    };
    info!(correlation_id = %correlation_id, batch_id = %batch_id, "Loading batch report");

    match batch::load_batch_report(state.pool(), batch_id).await {
        Ok(report) => json_response(StatusCode::OK, report),
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                batch_id = %batch_id,
                error = %err,
                "Batch report failed"
            );
            error_response(err.into())
        }
    }
}

/// Handler for `POST /shifts/{id}/unlock`.
async fn unlock_shift_handler(
    State(state): State<AppState>,
    shift_id: Result<Path<i64>, PathRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let shift_id = match shift_id {
        Ok(Path(id)) => id,
        Err(rejection) => return path_rejection_error(correlation_id, rejection),
    };
    info!(correlation_id = %correlation_id, shift_id, "Processing unlock request");

    match batch::unlock_shift(state.pool(), shift_id).await {
        Ok(shift) => json_response(StatusCode::OK, shift),
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                shift_id,
                error = %err,
                "Unlock failed"
            );
            error_response(err.into())
        }
    }
}
