//! HTTP API module for the time bucketing engine.
//!
//! Exposes batch runs, batch reports and shift unlocking over axum.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::RunBatchRequest;
pub use response::{ApiError, ApiErrorResponse, BatchRunResponse};
pub use state::AppState;
