//! Shift snapshot models.
//!
//! A [`ShiftSnapshot`] is the immutable, auditable per-shift result of a
//! payroll batch. All quantities are whole minutes.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The payable classification of a minute of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    /// Ordinary time.
    Normal,
    /// Work on a configured weekend day.
    Weekend,
    /// Work on a bank holiday.
    BankHoliday,
    /// Minutes above the weekly contract threshold.
    Overtime,
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Bucket::Normal => write!(f, "normal"),
            Bucket::Weekend => write!(f, "weekend"),
            Bucket::BankHoliday => write!(f, "bank_holiday"),
            Bucket::Overtime => write!(f, "overtime"),
        }
    }
}

/// Minute totals per bucket.
///
/// # Example
///
/// ```
/// use timebucket_engine::models::Buckets;
///
/// let buckets = Buckets { normal: 400, weekend: 0, bank_holiday: 60, overtime: 20 };
/// assert_eq!(buckets.total(), 480);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Buckets {
    /// Normal minutes.
    pub normal: i64,
    /// Weekend minutes.
    pub weekend: i64,
    /// Bank-holiday minutes.
    pub bank_holiday: i64,
    /// Overtime minutes.
    pub overtime: i64,
}

impl Buckets {
    /// Sum of all four buckets.
    pub fn total(&self) -> i64 {
        self.normal + self.weekend + self.bank_holiday + self.overtime
    }

    /// Returns the minutes held in one bucket.
    pub fn get(&self, bucket: Bucket) -> i64 {
        match bucket {
            Bucket::Normal => self.normal,
            Bucket::Weekend => self.weekend,
            Bucket::BankHoliday => self.bank_holiday,
            Bucket::Overtime => self.overtime,
        }
    }

    /// Adds minutes to one bucket.
    pub fn add(&mut self, bucket: Bucket, minutes: i64) {
        match bucket {
            Bucket::Normal => self.normal += minutes,
            Bucket::Weekend => self.weekend += minutes,
            Bucket::BankHoliday => self.bank_holiday += minutes,
            Bucket::Overtime => self.overtime += minutes,
        }
    }

    /// Absorbs any difference between the bucket sum and `paid_minutes` into `normal`.
    pub fn reconciled(mut self, paid_minutes: i64) -> Self {
        self.normal += paid_minutes - self.total();
        self
    }
}

impl std::ops::AddAssign for Buckets {
    fn add_assign(&mut self, other: Self) {
        self.normal += other.normal;
        self.weekend += other.weekend;
        self.bank_holiday += other.bank_holiday;
        self.overtime += other.overtime;
    }
}

/// One local day of a shift, for audit display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayBreakdown {
    /// Local calendar date.
    pub date: NaiveDate,
    /// UTC end of the shift's minutes on this day.
    pub ends_at: DateTime<Utc>,
    /// Worked minutes on this day.
    pub worked: i64,
    /// Break minutes deducted on this day.
    pub break_deducted: i64,
    /// Paid break minutes added back on this day.
    pub break_added: i64,
    /// Paid minutes on this day.
    pub paid: i64,
    /// Normal minutes.
    pub normal: i64,
    /// Weekend minutes.
    pub weekend: i64,
    /// Bank-holiday minutes.
    pub bank_holiday: i64,
    /// Overtime minutes.
    pub overtime: i64,
}

impl DayBreakdown {
    /// Bucket totals for this day.
    pub fn buckets(&self) -> Buckets {
        Buckets {
            normal: self.normal,
            weekend: self.weekend,
            bank_holiday: self.bank_holiday,
            overtime: self.overtime,
        }
    }

    /// Adds another row for the same day onto this one.
    pub fn absorb(&mut self, other: &DayBreakdown) {
        self.worked += other.worked;
        self.break_deducted += other.break_deducted;
        self.break_added += other.break_added;
        self.paid += other.paid;
        self.normal += other.normal;
        self.weekend += other.weekend;
        self.bank_holiday += other.bank_holiday;
        self.overtime += other.overtime;
        self.ends_at = self.ends_at.max(other.ends_at);
    }
}

/// What a snapshot row records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotKind {
    /// The shift's calculated minutes for the batch period.
    Calculated,
    /// Bucket deltas moving minutes an earlier batch paid into overtime.
    ///
    /// Paid and worked minutes are zero; the bucket deltas sum to zero.
    OvertimeAdjustment,
}

impl SnapshotKind {
    /// Stored representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SnapshotKind::Calculated => "calculated",
            SnapshotKind::OvertimeAdjustment => "overtime_adjustment",
        }
    }

    /// Parses the stored representation.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "calculated" => Some(SnapshotKind::Calculated),
            "overtime_adjustment" => Some(SnapshotKind::OvertimeAdjustment),
            _ => None,
        }
    }
}

/// The stored result for one shift in one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftSnapshot {
    /// Owning batch.
    pub batch_id: Uuid,
    /// Source shift.
    pub shift_id: i64,
    /// Calculated minutes or an overtime adjustment.
    pub kind: SnapshotKind,
    /// Employee who worked the shift.
    pub employee_id: i64,
    /// Worked minutes (after rounding and period clipping).
    pub worked_minutes: i64,
    /// Break minutes applied to the shift, paid or not.
    pub break_minutes: i64,
    /// Paid minutes.
    pub paid_minutes: i64,
    /// Normal minutes.
    pub normal_minutes: i64,
    /// Weekend minutes.
    pub weekend_minutes: i64,
    /// Bank-holiday minutes.
    pub bank_holiday_minutes: i64,
    /// Overtime minutes.
    pub overtime_minutes: i64,
    /// Per-local-day breakdown.
    pub day_breakdown: Vec<DayBreakdown>,
}

impl ShiftSnapshot {
    /// Bucket totals for the shift.
    pub fn buckets(&self) -> Buckets {
        Buckets {
            normal: self.normal_minutes,
            weekend: self.weekend_minutes,
            bank_holiday: self.bank_holiday_minutes,
            overtime: self.overtime_minutes,
        }
    }

    /// Returns true if the buckets sum to paid minutes for the shift and every day.
    pub fn reconciles(&self) -> bool {
        self.buckets().total() == self.paid_minutes
            && self.day_breakdown.iter().all(|d| d.buckets().total() == d.paid)
    }
}
