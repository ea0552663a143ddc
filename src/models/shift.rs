//! Shift model and manager edits.
//!
//! Shifts are captured by attendance devices and never mutated by the
//! engine except for their lock fields. Manager corrections live in
//! [`ShiftEdit`] rows; the latest one determines the shift's effective times.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A clock-in/clock-out attendance record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    /// Unique identifier for the shift.
    pub id: i64,
    /// The employee who worked the shift.
    pub employee_id: i64,
    /// Captured clock-in instant.
    pub clock_in_utc: DateTime<Utc>,
    /// Captured clock-out instant; `None` while the shift is open.
    pub clock_out_utc: Option<DateTime<Utc>>,
    /// Manager-entered break minutes that replace the computed break.
    pub break_override_minutes: Option<i64>,
    /// Whether a manager approved the shift for payroll.
    pub approved: bool,
    /// When the shift was locked by a batch.
    pub locked_at: Option<DateTime<Utc>>,
    /// Who ran the batch that locked the shift.
    pub locked_by: Option<String>,
    /// The batch that owns the lock.
    pub lock_batch_id: Option<Uuid>,
}

/// A manager correction to a shift's punches.
///
/// Fields left `None` keep the value from the previous edit or the
/// original punch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftEdit {
    /// The edited shift.
    pub shift_id: i64,
    /// Corrected clock-in instant.
    pub clock_in_utc: Option<DateTime<Utc>>,
    /// Corrected clock-out instant.
    pub clock_out_utc: Option<DateTime<Utc>>,
    /// Who made the edit.
    pub edited_by: String,
    /// When the edit was made.
    pub edited_at: DateTime<Utc>,
}

/// The clock-in/out pair used for payroll after applying manager edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectiveTimes {
    /// Effective clock-in.
    pub clock_in: DateTime<Utc>,
    /// Effective clock-out, if the shift is closed.
    pub clock_out: Option<DateTime<Utc>>,
}

impl Shift {
    /// Returns true once a batch owns this shift.
    pub fn is_locked(&self) -> bool {
        self.lock_batch_id.is_some()
    }

    /// Applies edits in chronological order on top of the captured punches.
    ///
    /// # Example
    ///
    /// ```
    /// use timebucket_engine::models::{Shift, ShiftEdit};
    /// use chrono::{TimeZone, Utc};
    ///
    /// let shift = Shift {
    ///     id: 1,
    ///     employee_id: 7,
    ///     clock_in_utc: Utc.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).unwrap(),
    ///     clock_out_utc: None,
    ///     break_override_minutes: None,
    ///     approved: true,
    ///     locked_at: None,
    ///     locked_by: None,
    ///     lock_batch_id: None,
    /// };
    /// let edit = ShiftEdit {
    ///     shift_id: 1,
    ///     clock_in_utc: None,
    ///     clock_out_utc: Some(Utc.with_ymd_and_hms(2026, 1, 15, 17, 0, 0).unwrap()),
    ///     edited_by: "manager".to_string(),
    ///     edited_at: Utc.with_ymd_and_hms(2026, 1, 16, 8, 0, 0).unwrap(),
    /// };
    ///
    /// let times = shift.effective_times(&[edit]);
    /// assert_eq!(times.clock_in, shift.clock_in_utc);
    /// assert!(times.clock_out.is_some());
    /// ```
    pub fn effective_times(&self, edits: &[ShiftEdit]) -> EffectiveTimes {
        let mut ordered: Vec<&ShiftEdit> =
            edits.iter().filter(|e| e.shift_id == self.id).collect();
        ordered.sort_by_key(|e| e.edited_at);

        ordered.into_iter().fold(
            EffectiveTimes {
                clock_in: self.clock_in_utc,
                clock_out: self.clock_out_utc,
            },
            |times, edit| EffectiveTimes {
                clock_in: edit.clock_in_utc.unwrap_or(times.clock_in),
                clock_out: edit.clock_out_utc.or(times.clock_out),
            },
        )
    }
}
