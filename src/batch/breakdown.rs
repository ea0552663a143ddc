//! Snapshot and per-day breakdown construction.
//!
//! Totals are always summed from the same rows that are stored as the day
//! breakdown, so the two can never disagree.

use uuid::Uuid;

use crate::calculation::ShiftCalculation;
use crate::models::{Buckets, DayBreakdown, ShiftSnapshot, SnapshotKind};

/// Builds a snapshot from a shift calculation and its final segment buckets.
///
/// `segment_buckets` is indexed like `calculation.segments`; a missing entry
/// falls back to the segment's pre-overtime buckets.
pub fn build_snapshot(
    batch_id: Uuid,
    calculation: &ShiftCalculation,
    segment_buckets: &[Buckets],
) -> ShiftSnapshot {
    let day_breakdown: Vec<DayBreakdown> = calculation
        .segments
        .iter()
        .enumerate()
        .map(|(index, segment)| {
            let buckets = segment_buckets.get(index).copied().unwrap_or(segment.buckets);
            segment.breakdown(buckets)
        })
        .collect();

    let mut totals = Buckets::default();
    for day in &day_breakdown {
        totals += day.buckets();
    }
    let totals = totals.reconciled(calculation.paid_minutes);

    ShiftSnapshot {
        batch_id,
        shift_id: calculation.shift_id,
        kind: SnapshotKind::Calculated,
        employee_id: calculation.employee_id,
        worked_minutes: calculation.worked_minutes,
        break_minutes: calculation.break_minutes,
        paid_minutes: calculation.paid_minutes,
        normal_minutes: totals.normal,
        weekend_minutes: totals.weekend,
        bank_holiday_minutes: totals.bank_holiday,
        overtime_minutes: totals.overtime,
        day_breakdown,
    }
}

/// Initial snapshot with overtime still zero.
pub fn initial_snapshot(batch_id: Uuid, calculation: &ShiftCalculation) -> ShiftSnapshot {
    build_snapshot(batch_id, calculation, &[])
}

/// Bucket deltas for one earlier-paid day moving into overtime.
pub fn adjustment_row(day: &DayBreakdown, before: Buckets, after: Buckets) -> DayBreakdown {
    DayBreakdown {
        date: day.date,
        ends_at: day.ends_at,
        worked: 0,
        break_deducted: 0,
        break_added: 0,
        paid: 0,
        normal: after.normal - before.normal,
        weekend: after.weekend - before.weekend,
        bank_holiday: after.bank_holiday - before.bank_holiday,
        overtime: after.overtime - before.overtime,
    }
}

/// Overtime adjustment snapshot for a shift an earlier batch paid.
///
/// Worked and paid minutes stay zero; the bucket totals are the sums of the
/// day deltas and therefore sum to zero themselves.
pub fn adjustment_snapshot(
    batch_id: Uuid,
    shift_id: i64,
    employee_id: i64,
    mut day_breakdown: Vec<DayBreakdown>,
) -> ShiftSnapshot {
    day_breakdown.sort_by_key(|day| day.date);
    let mut totals = Buckets::default();
    for day in &day_breakdown {
        totals += day.buckets();
    }

    ShiftSnapshot {
        batch_id,
        shift_id,
        kind: SnapshotKind::OvertimeAdjustment,
        employee_id,
        worked_minutes: 0,
        break_minutes: 0,
        paid_minutes: 0,
        normal_minutes: totals.normal,
        weekend_minutes: totals.weekend,
        bank_holiday_minutes: totals.bank_holiday,
        overtime_minutes: totals.overtime,
        day_breakdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::{BankHolidayLedger, PipelineContext, compute_shift};
    use crate::config::Settings;
    use crate::models::{HolidayCalendar, Shift};
    use chrono::{TimeZone, Utc};

    fn overnight_calculation() -> ShiftCalculation {
        let settings = Settings {
            timezone: chrono_tz::UTC,
            ..Settings::default()
        };
        // Friday 20:00 into Saturday 06:00 with a 45 minute override
        let shift = Shift {
            id: 11,
            employee_id: 3,
            clock_in_utc: Utc.with_ymd_and_hms(2026, 1, 16, 20, 0, 0).unwrap(),
            clock_out_utc: Some(Utc.with_ymd_and_hms(2026, 1, 17, 6, 0, 0).unwrap()),
            break_override_minutes: Some(45),
            approved: true,
            locked_at: None,
            locked_by: None,
            lock_batch_id: None,
        };
        let calendar = HolidayCalendar::default();
        let ctx = PipelineContext {
            settings: &settings,
            tiers: &[],
            calendar: &calendar,
            window: None,
        };
        let mut ledger = BankHolidayLedger::new();
        compute_shift(
            &shift,
            shift.clock_in_utc,
            shift.clock_out_utc.unwrap(),
            None,
            &ctx,
            &mut ledger,
        )
    }

    #[test]
    fn test_initial_snapshot_has_no_overtime() {
        let calc = overnight_calculation();
        let snapshot = initial_snapshot(Uuid::nil(), &calc);

        assert_eq!(snapshot.worked_minutes, 600);
        assert_eq!(snapshot.break_minutes, 45);
        assert_eq!(snapshot.paid_minutes, 555);
        assert_eq!(snapshot.overtime_minutes, 0);
        assert_eq!(snapshot.day_breakdown.len(), 2);
        // 45 over 240/360: floor(18) on Friday, 27 on Saturday
        assert_eq!(snapshot.day_breakdown[0].break_deducted, 18);
        assert_eq!(snapshot.day_breakdown[1].break_deducted, 27);
        assert_eq!(snapshot.normal_minutes, 222);
        assert_eq!(snapshot.weekend_minutes, 333);
        assert!(snapshot.reconciles());
    }

    #[test]
    fn test_final_buckets_flow_into_totals_and_rows() {
        let calc = overnight_calculation();
        let mut saturday = calc.segments[1].buckets;
        saturday.weekend -= 100;
        saturday.overtime += 100;

        let snapshot = build_snapshot(Uuid::nil(), &calc, &[calc.segments[0].buckets, saturday]);
        assert_eq!(snapshot.overtime_minutes, 100);
        assert_eq!(snapshot.day_breakdown[1].overtime, 100);
        assert_eq!(snapshot.weekend_minutes, 233);
        assert!(snapshot.reconciles());
    }

    #[test]
    fn test_adjustment_snapshot_carries_only_deltas() {
        let calc = overnight_calculation();
        let paid = initial_snapshot(Uuid::nil(), &calc);
        let saturday = &paid.day_breakdown[1];
        let before = saturday.buckets();
        let after = Buckets {
            weekend: before.weekend - 120,
            overtime: 120,
            ..before
        };

        let snapshot = adjustment_snapshot(
            Uuid::nil(),
            calc.shift_id,
            calc.employee_id,
            vec![adjustment_row(saturday, before, after)],
        );
        assert_eq!(snapshot.kind, SnapshotKind::OvertimeAdjustment);
        assert_eq!(snapshot.paid_minutes, 0);
        assert_eq!(snapshot.overtime_minutes, 120);
        assert_eq!(snapshot.weekend_minutes, -120);
        assert_eq!(snapshot.day_breakdown[0].date, saturday.date);
        assert!(snapshot.reconciles());
    }
}
