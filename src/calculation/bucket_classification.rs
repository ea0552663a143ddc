//! Non-stacking bucket classification of day segments.
//!
//! Each segment's paid minutes land in exactly one of bank-holiday, weekend
//! or normal, in that priority order. The only split is the bank-holiday
//! cap: minutes beyond an employee's daily cap fall through to weekend or
//! normal by the remaining rules. Overtime is not assigned here.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::config::Settings;
use crate::models::{Buckets, HolidayCalendar};

/// Tracks bank-holiday minutes already paid per employee per day.
///
/// The cap is per employee per day, so it must be shared across every
/// segment of every shift the employee worked on that date.
#[derive(Debug, Clone, Default)]
pub struct BankHolidayLedger {
    used: HashMap<(i64, NaiveDate), i64>,
}

impl BankHolidayLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Minutes still payable as bank holiday; `None` when uncapped.
    pub fn remaining(&self, employee_id: i64, date: NaiveDate, cap: Option<i64>) -> Option<i64> {
        let used = self.used.get(&(employee_id, date)).copied().unwrap_or(0);
        cap.map(|cap| (cap - used).max(0))
    }

    /// Records minutes paid as bank holiday.
    pub fn record(&mut self, employee_id: i64, date: NaiveDate, minutes: i64) {
        *self.used.entry((employee_id, date)).or_insert(0) += minutes;
    }
}

/// Classifies one segment's paid minutes.
///
/// # Example
///
/// ```
/// use timebucket_engine::calculation::{classify_segment, BankHolidayLedger};
/// use timebucket_engine::config::Settings;
/// use timebucket_engine::models::{BankHoliday, HolidayCalendar};
/// use chrono::NaiveDate;
///
/// let christmas = NaiveDate::from_ymd_opt(2026, 12, 25).unwrap();
/// let calendar = HolidayCalendar::new(vec![BankHoliday {
///     date: christmas,
///     name: None,
///     paid_hours_cap: None,
/// }]);
/// let settings = Settings { bank_holiday_daily_cap_minutes: Some(720), ..Settings::default() };
/// let mut ledger = BankHolidayLedger::new();
///
/// let buckets = classify_segment(1, christmas, 840, &settings, &calendar, &mut ledger);
/// assert_eq!(buckets.bank_holiday, 720);
/// assert_eq!(buckets.normal, 120);
/// ```
pub fn classify_segment(
    employee_id: i64,
    date: NaiveDate,
    paid_minutes: i64,
    settings: &Settings,
    calendar: &HolidayCalendar,
    ledger: &mut BankHolidayLedger,
) -> Buckets {
    let mut buckets = Buckets::default();
    let mut remaining = paid_minutes.max(0);

    if settings.pays_bank_holidays() && calendar.is_bank_holiday(date) {
        let cap = calendar.cap_minutes(date, settings.bank_holiday_daily_cap_minutes);
        let bank_holiday = match ledger.remaining(employee_id, date, cap) {
            Some(allowance) => remaining.min(allowance),
            None => remaining,
        };
        ledger.record(employee_id, date, bank_holiday);
        buckets.bank_holiday = bank_holiday;
        remaining -= bank_holiday;
    }

    if settings.is_weekend(date) {
        buckets.weekend = remaining;
    } else {
        buckets.normal = remaining;
    }

    buckets.reconciled(paid_minutes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BankHoliday;
    use rust_decimal::Decimal;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn calendar() -> HolidayCalendar {
        HolidayCalendar::new(vec![
            // Friday
            BankHoliday {
                date: date(2026, 12, 25),
                name: Some("Christmas Day".to_string()),
                paid_hours_cap: None,
            },
            // Saturday
            BankHoliday {
                date: date(2026, 12, 26),
                name: Some("Boxing Day".to_string()),
                paid_hours_cap: Some(Decimal::new(4, 0)),
            },
        ])
    }

    fn settings_with_cap(cap: Option<i64>) -> Settings {
        Settings {
            bank_holiday_daily_cap_minutes: cap,
            ..Settings::default()
        }
    }

    // ==========================================================================
    // BC-001: Weekday non-holiday is normal
    // ==========================================================================
    #[test]
    fn test_bc_001_weekday_is_normal() {
        let mut ledger = BankHolidayLedger::new();
        let buckets = classify_segment(
            1,
            date(2026, 12, 23),
            480,
            &Settings::default(),
            &calendar(),
            &mut ledger,
        );
        assert_eq!(buckets.normal, 480);
        assert_eq!(buckets.total(), 480);
    }

    // ==========================================================================
    // BC-002: Saturday is weekend
    // ==========================================================================
    #[test]
    fn test_bc_002_weekend_day_is_weekend() {
        let mut ledger = BankHolidayLedger::new();
        let buckets = classify_segment(
            1,
            date(2026, 12, 19),
            300,
            &Settings::default(),
            &calendar(),
            &mut ledger,
        );
        assert_eq!(buckets.weekend, 300);
        assert_eq!(buckets.normal, 0);
    }

    // ==========================================================================
    // BC-003: 14h on a holiday with a 12h cap: 12h holiday, 2h normal
    // ==========================================================================
    #[test]
    fn test_bc_003_bank_holiday_cap_overflow_to_normal() {
        let mut ledger = BankHolidayLedger::new();
        let buckets = classify_segment(
            1,
            date(2026, 12, 25),
            14 * 60,
            &settings_with_cap(Some(12 * 60)),
            &calendar(),
            &mut ledger,
        );
        assert_eq!(buckets.bank_holiday, 12 * 60);
        assert_eq!(buckets.normal, 2 * 60);
        assert_eq!(buckets.weekend, 0);
    }

    #[test]
    fn test_holiday_on_weekend_overflows_to_weekend() {
        // Boxing Day 2026 is a Saturday with its own 4h cap
        let mut ledger = BankHolidayLedger::new();
        let buckets = classify_segment(
            1,
            date(2026, 12, 26),
            360,
            &settings_with_cap(Some(720)),
            &calendar(),
            &mut ledger,
        );
        assert_eq!(buckets.bank_holiday, 240);
        assert_eq!(buckets.weekend, 120);
    }

    #[test]
    fn test_cap_is_shared_across_segments_for_same_employee_day() {
        let mut ledger = BankHolidayLedger::new();
        let settings = settings_with_cap(Some(600));
        let first = classify_segment(1, date(2026, 12, 25), 360, &settings, &calendar(), &mut ledger);
        let second = classify_segment(1, date(2026, 12, 25), 360, &settings, &calendar(), &mut ledger);
        let other_employee =
            classify_segment(2, date(2026, 12, 25), 360, &settings, &calendar(), &mut ledger);

        assert_eq!(first.bank_holiday, 360);
        assert_eq!(second.bank_holiday, 240);
        assert_eq!(second.normal, 120);
        assert_eq!(other_employee.bank_holiday, 360);
    }

    #[test]
    fn test_unpaid_bank_holidays_fall_through() {
        let mut ledger = BankHolidayLedger::new();
        let settings = Settings {
            bank_holiday_paid: false,
            ..Settings::default()
        };
        let buckets =
            classify_segment(1, date(2026, 12, 25), 480, &settings, &calendar(), &mut ledger);
        assert_eq!(buckets.bank_holiday, 0);
        assert_eq!(buckets.normal, 480);
    }

    #[test]
    fn test_disabled_calendar_treats_holiday_as_ordinary_day() {
        let mut ledger = BankHolidayLedger::new();
        let settings = Settings {
            bank_holiday_enabled: false,
            ..Settings::default()
        };
        let buckets =
            classify_segment(1, date(2026, 12, 26), 480, &settings, &calendar(), &mut ledger);
        assert_eq!(buckets.bank_holiday, 0);
        assert_eq!(buckets.weekend, 480);
    }

    #[test]
    fn test_uncapped_holiday_takes_everything() {
        let mut ledger = BankHolidayLedger::new();
        let buckets = classify_segment(
            1,
            date(2026, 12, 25),
            900,
            &Settings::default(),
            &calendar(),
            &mut ledger,
        );
        assert_eq!(buckets.bank_holiday, 900);
    }
}
