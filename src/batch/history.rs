//! Minutes earlier batches already paid.
//!
//! Read back in run order, a calculated snapshot replaces whatever came
//! before it for the same shift and day, and an overtime adjustment adds
//! onto it. The result is each shift-day's current standing, which weekly
//! overtime and the bank-holiday cap build on.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::NaiveDate;

use crate::calculation::{BankHolidayLedger, PayrollWeek, SegmentOrigin, WeekSegment, week_start_for};
use crate::config::Settings;
use crate::models::{DayBreakdown, HolidayCalendar, SnapshotKind};
use crate::storage::batches::PeriodSnapshot;

/// One shift-day as earlier batches left it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaidDay {
    /// Employee who worked the shift.
    pub employee_id: i64,
    /// Period of the batch that calculated the day.
    pub period_start: NaiveDate,
    /// Calculated row with any later adjustments folded in.
    pub row: DayBreakdown,
}

impl PaidDay {
    /// Bank-holiday minutes this day holds against the employee's daily cap.
    ///
    /// Overtime converts bank-holiday minutes first, so overtime on the day
    /// is counted as cap usage up to the day's paid minutes.
    pub fn bank_holiday_claim(&self) -> i64 {
        (self.row.bank_holiday + self.row.overtime).min(self.row.paid).max(0)
    }
}

/// Paid shift-days keyed by shift and local date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaidHistory {
    days: BTreeMap<(i64, NaiveDate), PaidDay>,
}

impl PaidHistory {
    /// Folds snapshots, oldest run first, keeping rows dated `from..=to`.
    pub fn from_snapshots(snapshots: &[PeriodSnapshot], from: NaiveDate, to: NaiveDate) -> Self {
        let mut days: BTreeMap<(i64, NaiveDate), PaidDay> = BTreeMap::new();

        for stored in snapshots {
            let snapshot = &stored.snapshot;
            for row in snapshot.day_breakdown.iter().filter(|r| r.date >= from && r.date <= to) {
                let key = (snapshot.shift_id, row.date);
                match snapshot.kind {
                    SnapshotKind::Calculated => {
                        days.insert(
                            key,
                            PaidDay {
                                employee_id: snapshot.employee_id,
                                period_start: stored.period_start,
                                row: row.clone(),
                            },
                        );
                    }
                    SnapshotKind::OvertimeAdjustment => {
                        days.entry(key)
                            .and_modify(|day| day.row.absorb(row))
                            .or_insert_with(|| PaidDay {
                                employee_id: snapshot.employee_id,
                                period_start: stored.period_start,
                                row: row.clone(),
                            });
                    }
                }
            }
        }

        Self { days }
    }

    /// Number of shift-days held.
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Returns true if nothing has been paid in range.
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// The standing of one shift-day.
    pub fn day(&self, shift_id: i64, date: NaiveDate) -> Option<&PaidDay> {
        self.days.get(&(shift_id, date))
    }

    /// Drops days of `shift_ids` calculated for the period starting `period_start`.
    ///
    /// Those shifts are being calculated again for that period.
    pub fn supersede_period(&mut self, shift_ids: &HashSet<i64>, period_start: NaiveDate) {
        self.days.retain(|(shift_id, _), day| {
            !(shift_ids.contains(shift_id) && day.period_start == period_start)
        });
    }

    /// Drops the given shift-days.
    pub fn supersede_days(&mut self, keys: &HashSet<(i64, NaiveDate)>) {
        self.days.retain(|key, _| !keys.contains(key));
    }

    /// Records every paid bank-holiday day against the ledger.
    pub fn seed_ledger(&self, ledger: &mut BankHolidayLedger, calendar: &HolidayCalendar) {
        for ((_, date), day) in &self.days {
            if calendar.is_bank_holiday(*date) {
                let claim = day.bank_holiday_claim();
                if claim > 0 {
                    ledger.record(day.employee_id, *date, claim);
                }
            }
        }
    }

    /// Employee-weeks holding paid days, by the first local date of the week.
    pub fn employee_weeks(&self, settings: &Settings) -> BTreeSet<(i64, NaiveDate)> {
        self.days
            .iter()
            .map(|((_, date), day)| (day.employee_id, week_start_for(*date, settings.week_start_day)))
            .collect()
    }

    /// Allocator input for the employee's paid days inside `week`.
    pub fn week_segments(&self, employee_id: i64, week: &PayrollWeek) -> Vec<WeekSegment> {
        let last_day = week.last_day();
        self.days
            .iter()
            .filter(|((_, date), day)| {
                day.employee_id == employee_id && *date >= week.start && *date <= last_day
            })
            .map(|((shift_id, date), day)| WeekSegment {
                origin: SegmentOrigin::Paid {
                    shift_id: *shift_id,
                    date: *date,
                },
                utc_end: day.row.ends_at,
                paid_minutes: day.row.paid,
                buckets: day.row.buckets(),
            })
            .collect()
    }
}
