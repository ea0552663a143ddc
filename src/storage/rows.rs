//! Database row types and their conversions to domain models.
//!
//! Decimals are stored as TEXT so that contract hours keep their exact
//! value; batch ids use sqlx's native UUID encoding.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    BankHoliday, BatchStatus, BreakTier, DayBreakdown, PayProfile, PayrollBatch, Shift,
    ShiftEdit, ShiftSnapshot, SnapshotKind,
};

fn parse_decimal(table: &str, column: &str, value: &str) -> EngineResult<Decimal> {
    Decimal::from_str(value.trim()).map_err(|e| EngineError::CorruptRecord {
        table: table.to_string(),
        message: format!("{} '{}' is not a decimal: {}", column, value, e),
    })
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct ShiftRow {
    pub id: i64,
    pub employee_id: i64,
    pub clock_in_utc: DateTime<Utc>,
    pub clock_out_utc: Option<DateTime<Utc>>,
    pub break_override_minutes: Option<i64>,
    pub approved: bool,
    pub locked_at: Option<DateTime<Utc>>,
    pub locked_by: Option<String>,
    pub lock_batch_id: Option<Uuid>,
}

impl From<ShiftRow> for Shift {
    fn from(row: ShiftRow) -> Self {
        Self {
            id: row.id,
            employee_id: row.employee_id,
            clock_in_utc: row.clock_in_utc,
            clock_out_utc: row.clock_out_utc,
            break_override_minutes: row.break_override_minutes,
            approved: row.approved,
            locked_at: row.locked_at,
            locked_by: row.locked_by,
            lock_batch_id: row.lock_batch_id,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct ShiftEditRow {
    pub shift_id: i64,
    pub clock_in_utc: Option<DateTime<Utc>>,
    pub clock_out_utc: Option<DateTime<Utc>>,
    pub edited_by: String,
    pub edited_at: DateTime<Utc>,
}

impl From<ShiftEditRow> for ShiftEdit {
    fn from(row: ShiftEditRow) -> Self {
        Self {
            shift_id: row.shift_id,
            clock_in_utc: row.clock_in_utc,
            clock_out_utc: row.clock_out_utc,
            edited_by: row.edited_by,
            edited_at: row.edited_at,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct PayProfileRow {
    pub employee_id: i64,
    pub contract_hours_per_week: String,
    pub break_minutes_default: Option<i64>,
    pub break_minutes_day: Option<i64>,
    pub break_minutes_night: Option<i64>,
    pub break_is_paid: bool,
    pub min_hours_for_break: String,
    pub night_start: String,
    pub night_end: String,
}

impl TryFrom<PayProfileRow> for PayProfile {
    type Error = EngineError;

    fn try_from(row: PayProfileRow) -> EngineResult<Self> {
        Ok(Self {
            employee_id: row.employee_id,
            contract_hours_per_week: parse_decimal(
                "pay_profiles",
                "contract_hours_per_week",
                &row.contract_hours_per_week,
            )?,
            break_minutes_default: row.break_minutes_default,
            break_minutes_day: row.break_minutes_day,
            break_minutes_night: row.break_minutes_night,
            break_is_paid: row.break_is_paid,
            min_hours_for_break: parse_decimal(
                "pay_profiles",
                "min_hours_for_break",
                &row.min_hours_for_break,
            )?,
            night_start: row.night_start,
            night_end: row.night_end,
        })
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct BreakTierRow {
    pub min_worked_minutes: i64,
    pub break_minutes: i64,
}

impl From<BreakTierRow> for BreakTier {
    fn from(row: BreakTierRow) -> Self {
        Self {
            min_worked_minutes: row.min_worked_minutes,
            break_minutes: row.break_minutes,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct BankHolidayRow {
    pub date: NaiveDate,
    pub name: Option<String>,
    pub paid_hours_cap: Option<String>,
}

impl TryFrom<BankHolidayRow> for BankHoliday {
    type Error = EngineError;

    fn try_from(row: BankHolidayRow) -> EngineResult<Self> {
        let paid_hours_cap = row
            .paid_hours_cap
            .as_deref()
            .map(|cap| parse_decimal("bank_holidays", "paid_hours_cap", cap))
            .transpose()?;
        Ok(Self {
            date: row.date,
            name: row.name,
            paid_hours_cap,
        })
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct PayrollBatchRow {
    pub id: Uuid,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub run_at: DateTime<Utc>,
    pub run_by: String,
    pub status: String,
    pub note: Option<String>,
}

impl TryFrom<PayrollBatchRow> for PayrollBatch {
    type Error = EngineError;

    fn try_from(row: PayrollBatchRow) -> EngineResult<Self> {
        let status = BatchStatus::parse(&row.status).ok_or_else(|| EngineError::CorruptRecord {
            table: "payroll_batches".to_string(),
            message: format!("unknown status '{}'", row.status),
        })?;
        Ok(Self {
            id: row.id,
            period_start: row.period_start,
            period_end: row.period_end,
            run_at: row.run_at,
            run_by: row.run_by,
            status,
            note: row.note,
        })
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct ShiftSnapshotRow {
    pub batch_id: Uuid,
    pub shift_id: i64,
    pub kind: String,
    pub employee_id: i64,
    pub worked_minutes: i64,
    pub break_minutes: i64,
    pub paid_minutes: i64,
    pub normal_minutes: i64,
    pub weekend_minutes: i64,
    pub bank_holiday_minutes: i64,
    pub overtime_minutes: i64,
    pub day_breakdown: String,
}

impl TryFrom<ShiftSnapshotRow> for ShiftSnapshot {
    type Error = EngineError;

    fn try_from(row: ShiftSnapshotRow) -> EngineResult<Self> {
        let kind = SnapshotKind::parse(&row.kind).ok_or_else(|| EngineError::CorruptRecord {
            table: "shift_snapshots".to_string(),
            message: format!("unknown snapshot kind '{}'", row.kind),
        })?;
        let day_breakdown: Vec<DayBreakdown> = serde_json::from_str(&row.day_breakdown)?;
        Ok(Self {
            batch_id: row.batch_id,
            shift_id: row.shift_id,
            kind,
            employee_id: row.employee_id,
            worked_minutes: row.worked_minutes,
            break_minutes: row.break_minutes,
            paid_minutes: row.paid_minutes,
            normal_minutes: row.normal_minutes,
            weekend_minutes: row.weekend_minutes,
            bank_holiday_minutes: row.bank_holiday_minutes,
            overtime_minutes: row.overtime_minutes,
            day_breakdown,
        })
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct PeriodSnapshotRow {
    pub period_start: NaiveDate,
    #[sqlx(flatten)]
    pub snapshot: ShiftSnapshotRow,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile_row(hours: &str) -> PayProfileRow {
        PayProfileRow {
            employee_id: 3,
            contract_hours_per_week: hours.to_string(),
            break_minutes_default: Some(30),
            break_minutes_day: None,
            break_minutes_night: None,
            break_is_paid: false,
            min_hours_for_break: "6".to_string(),
            night_start: "22:00".to_string(),
            night_end: "06:00".to_string(),
        }
    }

    #[test]
    fn test_profile_row_parses_decimal_text() {
        let profile = PayProfile::try_from(profile_row("37.5")).unwrap();
        assert_eq!(profile.contract_hours_per_week, Decimal::new(375, 1));
        assert_eq!(profile.weekly_threshold_minutes(), 2250);
    }

    #[test]
    fn test_profile_row_rejects_garbage_hours() {
        let result = PayProfile::try_from(profile_row("lots"));
        assert!(matches!(
            result,
            Err(EngineError::CorruptRecord { ref table, .. }) if table == "pay_profiles"
        ));
    }

    #[test]
    fn test_batch_row_rejects_unknown_status() {
        let row = PayrollBatchRow {
            id: Uuid::new_v4(),
            period_start: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            period_end: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
            run_at: Utc::now(),
            run_by: "payroll".to_string(),
            status: "exploded".to_string(),
            note: None,
        };
        assert!(PayrollBatch::try_from(row).is_err());
    }

    #[test]
    fn test_snapshot_row_decodes_breakdown_json() {
        let row = ShiftSnapshotRow {
            batch_id: Uuid::new_v4(),
            shift_id: 1,
            kind: "calculated".to_string(),
            employee_id: 2,
            worked_minutes: 480,
            break_minutes: 30,
            paid_minutes: 450,
            normal_minutes: 450,
            weekend_minutes: 0,
            bank_holiday_minutes: 0,
            overtime_minutes: 0,
            day_breakdown: r#"[{"date":"2026-01-14","ends_at":"2026-01-14T17:00:00Z","worked":480,"break_deducted":30,"break_added":0,"paid":450,"normal":450,"weekend":0,"bank_holiday":0,"overtime":0}]"#.to_string(),
        };
        let snapshot = ShiftSnapshot::try_from(row).unwrap();
        assert_eq!(snapshot.day_breakdown.len(), 1);
        assert!(snapshot.reconciles());
    }

    #[test]
    fn test_snapshot_row_with_bad_json_is_an_error() {
        let row = ShiftSnapshotRow {
            batch_id: Uuid::new_v4(),
            shift_id: 1,
            kind: "calculated".to_string(),
            employee_id: 2,
            worked_minutes: 0,
            break_minutes: 0,
            paid_minutes: 0,
            normal_minutes: 0,
            weekend_minutes: 0,
            bank_holiday_minutes: 0,
            overtime_minutes: 0,
            day_breakdown: "not json".to_string(),
        };
        assert!(matches!(
            ShiftSnapshot::try_from(row),
            Err(EngineError::Serialization(_))
        ));
    }

    #[test]
    fn test_snapshot_row_rejects_unknown_kind() {
        let row = ShiftSnapshotRow {
            batch_id: Uuid::new_v4(),
            shift_id: 1,
            kind: "manual".to_string(),
            employee_id: 2,
            worked_minutes: 0,
            break_minutes: 0,
            paid_minutes: 0,
            normal_minutes: 0,
            weekend_minutes: 0,
            bank_holiday_minutes: 0,
            overtime_minutes: 0,
            day_breakdown: "[]".to_string(),
        };
        assert!(matches!(
            ShiftSnapshot::try_from(row),
            Err(EngineError::CorruptRecord { ref table, .. }) if table == "shift_snapshots"
        ));
    }
}
