//! Bank holiday calendar.
//!
//! This module contains the [`BankHoliday`] and [`HolidayCalendar`] types
//! used by bucket classification. Dates are local calendar dates in the
//! payroll timezone.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::pay_profile::hours_to_minutes;

/// A bank holiday on a local calendar date.
///
/// # Example
///
/// ```
/// use timebucket_engine::models::BankHoliday;
/// use chrono::NaiveDate;
///
/// let holiday = BankHoliday {
///     date: NaiveDate::from_ymd_opt(2026, 12, 25).unwrap(),
///     name: Some("Christmas Day".to_string()),
///     paid_hours_cap: None,
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankHoliday {
    /// The local date of the holiday.
    pub date: NaiveDate,
    /// The holiday's name, if recorded.
    #[serde(default)]
    pub name: Option<String>,
    /// Maximum paid bank-holiday hours per employee on this day.
    #[serde(default)]
    pub paid_hours_cap: Option<Decimal>,
}

/// Lookup table of bank holidays by date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolidayCalendar {
    holidays: HashMap<NaiveDate, BankHoliday>,
}

impl HolidayCalendar {
    /// Builds a calendar; a later entry for the same date replaces an earlier one.
    pub fn new(holidays: impl IntoIterator<Item = BankHoliday>) -> Self {
        Self {
            holidays: holidays.into_iter().map(|h| (h.date, h)).collect(),
        }
    }

    /// Checks if a given local date is a bank holiday.
    pub fn is_bank_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains_key(&date)
    }

    /// Returns the holiday on a date, if any.
    pub fn get(&self, date: NaiveDate) -> Option<&BankHoliday> {
        self.holidays.get(&date)
    }

    /// Daily bank-holiday cap in minutes for a date.
    ///
    /// The holiday's own cap takes precedence over `default_cap_minutes`.
    /// `None` means uncapped.
    pub fn cap_minutes(&self, date: NaiveDate, default_cap_minutes: Option<i64>) -> Option<i64> {
        self.holidays
            .get(&date)
            .and_then(|h| h.paid_hours_cap)
            .map(hours_to_minutes)
            .or(default_cap_minutes)
    }

    /// Number of holidays in the calendar.
    pub fn len(&self) -> usize {
        self.holidays.len()
    }

    /// Returns true if the calendar holds no holidays.
    pub fn is_empty(&self) -> bool {
        self.holidays.is_empty()
    }
}
