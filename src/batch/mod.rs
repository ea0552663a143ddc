//! Payroll batch runs.
//!
//! [`run_batch`] is the in-process entry point used by the HTTP layer. The
//! read helpers here serve the audit and report surfaces.

mod breakdown;
mod history;
mod orchestrator;
mod outcome;
mod selection;

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{PayrollBatch, Shift, ShiftSnapshot};
use crate::storage::{batches, shifts};

pub use breakdown::{adjustment_row, adjustment_snapshot, build_snapshot, initial_snapshot};
pub use history::{PaidDay, PaidHistory};
pub use orchestrator::{SHIFT_LOOKBACK_DAYS, run_batch};
pub use outcome::{BatchOutcome, BatchRequest, DeferredWeek, SkipReason, SkippedShift};
pub use selection::{Eligibility, assess_shift};

/// A stored batch with its snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    /// The batch row.
    pub batch: PayrollBatch,
    /// Its snapshots, ordered by shift id.
    pub snapshots: Vec<ShiftSnapshot>,
}

/// Loads a batch and its snapshots.
pub async fn load_batch_report(pool: &SqlitePool, batch_id: Uuid) -> EngineResult<BatchReport> {
    let mut conn = pool.acquire().await?;
    let batch = batches::get_batch(&mut conn, batch_id)
        .await?
        .ok_or(EngineError::BatchNotFound { batch_id })?;
    let snapshots = batches::list_snapshots(&mut conn, batch_id).await?;

    Ok(BatchReport { batch, snapshots })
}

/// Clears a shift's lock so a future batch may include it again.
pub async fn unlock_shift(pool: &SqlitePool, shift_id: i64) -> EngineResult<Shift> {
    let mut conn = pool.acquire().await?;
    shifts::unlock_shift(&mut conn, shift_id).await
}
