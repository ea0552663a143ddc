//! Batch request and outcome types.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{AuditWarning, PayrollBatch, ShiftSnapshot};

/// What to run and who is running it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRequest {
    /// Target month as "YYYY-MM" in the payroll timezone.
    pub period: String,
    /// Identity recorded as the batch owner and lock owner.
    pub run_by: String,
    /// Free-text note stored on the batch.
    #[serde(default)]
    pub note: Option<String>,
}

/// Why a shift was left out of a batch.
///
/// # Example
///
/// ```
/// use timebucket_engine::batch::SkipReason;
///
/// assert_eq!(SkipReason::MissingClockOut.to_string(), "missing clock-out");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// The shift is still open.
    MissingClockOut,
    /// No manager approval yet.
    NotApproved,
    /// Another batch owns the shift's lock.
    AlreadyLocked {
        /// The owning batch.
        batch_id: Uuid,
    },
    /// An earlier batch for the same period already carries the shift.
    AlreadySnapshotted {
        /// The earlier batch.
        batch_id: Uuid,
    },
    /// Manager edits moved the shift out of the period.
    OutsidePeriod,
    /// Nothing payable remains after rounding, clipping and breaks.
    NoPayableMinutes,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingClockOut => write!(f, "missing clock-out"),
            SkipReason::NotApproved => write!(f, "not approved"),
            SkipReason::AlreadyLocked { batch_id } => write!(f, "already locked by batch {}", batch_id),
            SkipReason::AlreadySnapshotted { batch_id } => {
                write!(f, "already included in batch {} for this period", batch_id)
            }
            SkipReason::OutsidePeriod => write!(f, "edited times fall outside the period"),
            SkipReason::NoPayableMinutes => write!(f, "no payable minutes"),
        }
    }
}

/// A shift excluded from the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedShift {
    /// The skipped shift.
    pub shift_id: i64,
    /// Its employee.
    pub employee_id: i64,
    /// Why it was skipped.
    #[serde(flatten)]
    pub reason: SkipReason,
}

/// An employee-week whose overtime waits for the next period's run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeferredWeek {
    /// The employee.
    pub employee_id: i64,
    /// First local date of the week.
    pub week_start: NaiveDate,
}

/// Summary of a committed batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    /// The committed batch.
    pub batch: PayrollBatch,
    /// One calculated snapshot per included shift.
    pub snapshots: Vec<ShiftSnapshot>,
    /// Overtime adjustments to shifts earlier batches paid.
    pub adjustments: Vec<ShiftSnapshot>,
    /// Shifts left out, with reasons.
    pub skipped: Vec<SkippedShift>,
    /// Employee-weeks not finalized for overtime in this run.
    pub deferred_weeks: Vec<DeferredWeek>,
    /// Included shifts whose minutes past the period end are paid by the
    /// next period's run.
    pub awaiting_next_period: Vec<i64>,
    /// Configuration gaps the run worked around.
    pub warnings: Vec<AuditWarning>,
}

impl BatchOutcome {
    /// Number of shifts snapshotted.
    pub fn included_count(&self) -> usize {
        self.snapshots.len()
    }

    /// Number of shifts skipped.
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// Total overtime minutes placed by the batch, adjustments included.
    pub fn overtime_minutes(&self) -> i64 {
        self.snapshots
            .iter()
            .chain(&self.adjustments)
            .map(|s| s.overtime_minutes)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_reason_messages() {
        let batch_id = Uuid::nil();
        assert_eq!(SkipReason::NotApproved.to_string(), "not approved");
        assert_eq!(
            SkipReason::AlreadyLocked { batch_id }.to_string(),
            "already locked by batch 00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_skipped_shift_serializes_flat() {
        let skipped = SkippedShift {
            shift_id: 4,
            employee_id: 9,
            reason: SkipReason::MissingClockOut,
        };
        let json = serde_json::to_value(&skipped).unwrap();
        assert_eq!(json["shift_id"], 4);
        assert_eq!(json["reason"], "missing_clock_out");
    }

    #[test]
    fn test_batch_request_note_defaults_to_none() {
        let request: BatchRequest =
            serde_json::from_str(r#"{"period":"2026-01","run_by":"payroll"}"#).unwrap();
        assert_eq!(request.note, None);
    }
}
