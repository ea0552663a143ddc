//! Request types for the time bucketing API.

use serde::{Deserialize, Serialize};

use crate::batch::BatchRequest;

/// Request body for `POST /batches`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunBatchRequest {
    /// Target month, "YYYY-MM".
    pub period: String,
    /// Identity of whoever triggers the run.
    pub run_by: String,
    /// Optional note stored on the batch.
    #[serde(default)]
    pub note: Option<String>,
}

impl From<RunBatchRequest> for BatchRequest {
    fn from(req: RunBatchRequest) -> Self {
        Self {
            period: req.period.trim().to_string(),
            run_by: req.run_by,
            note: req.note.filter(|n| !n.trim().is_empty()),
        }
    }
}
