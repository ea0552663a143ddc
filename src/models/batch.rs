//! Payroll batch and period models.

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculation::local_midnight_utc;
use crate::error::{EngineError, EngineResult};

/// Lifecycle state of a payroll batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    /// The batch row exists inside an uncommitted run.
    Processing,
    /// The run committed; snapshots and locks are final.
    Completed,
}

impl BatchStatus {
    /// Stored representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchStatus::Processing => "processing",
            BatchStatus::Completed => "completed",
        }
    }

    /// Parses the stored representation.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "processing" => Some(BatchStatus::Processing),
            "completed" => Some(BatchStatus::Completed),
            _ => None,
        }
    }
}

/// Immutable record of one payroll run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollBatch {
    /// Unique batch id.
    pub id: Uuid,
    /// First local date of the period (inclusive).
    pub period_start: NaiveDate,
    /// Last local date of the period (inclusive).
    pub period_end: NaiveDate,
    /// When the run started.
    pub run_at: DateTime<Utc>,
    /// Identity of whoever triggered the run.
    pub run_by: String,
    /// Batch status.
    pub status: BatchStatus,
    /// Free-text note.
    pub note: Option<String>,
}

/// A calendar month in the payroll timezone with its UTC window.
///
/// # Example
///
/// ```
/// use timebucket_engine::models::PayrollPeriod;
/// use chrono::{NaiveDate, TimeZone, Utc};
///
/// let period = PayrollPeriod::parse("2026-03", chrono_tz::Europe::London).unwrap();
/// assert_eq!(period.first_day, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
/// assert_eq!(period.last_day, NaiveDate::from_ymd_opt(2026, 3, 31).unwrap());
/// // London is on BST by the end of March.
/// assert_eq!(period.end_utc, Utc.with_ymd_and_hms(2026, 3, 31, 23, 0, 0).unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollPeriod {
    /// First local date (inclusive).
    pub first_day: NaiveDate,
    /// Last local date (inclusive).
    pub last_day: NaiveDate,
    /// Local midnight starting the period, in UTC.
    pub start_utc: DateTime<Utc>,
    /// Local midnight after the last day, in UTC (exclusive).
    pub end_utc: DateTime<Utc>,
}

impl PayrollPeriod {
    /// Parses a "YYYY-MM" month label.
    pub fn parse(value: &str, tz: Tz) -> EngineResult<Self> {
        let invalid = || EngineError::InvalidPeriod {
            value: value.to_string(),
        };

        let (year, month) = value.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        let first_day = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;

        Self::month_starting(first_day, tz).ok_or_else(invalid)
    }

    /// The month containing `date`.
    pub fn containing(date: NaiveDate, tz: Tz) -> Option<Self> {
        Self::month_starting(date.with_day(1)?, tz)
    }

    fn month_starting(first_day: NaiveDate, tz: Tz) -> Option<Self> {
        let next_first = first_day.checked_add_months(Months::new(1))?;
        Some(Self {
            first_day,
            last_day: next_first.pred_opt()?,
            start_utc: local_midnight_utc(tz, first_day),
            end_utc: local_midnight_utc(tz, next_first),
        })
    }

    /// "YYYY-MM" label of the period.
    pub fn label(&self) -> String {
        self.first_day.format("%Y-%m").to_string()
    }

    /// Returns true if the instant lies inside `[start_utc, end_utc)`.
    pub fn contains_instant(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start_utc && instant < self.end_utc
    }

    /// Returns true if `[start, end)` overlaps the period window.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start < self.end_utc && end > self.start_utc
    }
}
