//! Pay profile and break tier models.
//!
//! A [`PayProfile`] carries the contract terms the engine needs for one
//! employee. Profiles are maintained by the employee/contract surfaces and
//! read-only here.

use chrono::NaiveTime;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Per-employee contract terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayProfile {
    /// The employee this profile belongs to.
    pub employee_id: i64,
    /// Contracted hours per week; zero disables overtime.
    pub contract_hours_per_week: Decimal,
    /// Break minutes used when no day/night specific value is set.
    pub break_minutes_default: Option<i64>,
    /// Break minutes for shifts classified as day shifts.
    pub break_minutes_day: Option<i64>,
    /// Break minutes for shifts classified as night shifts.
    pub break_minutes_night: Option<i64>,
    /// Whether break minutes are paid (deducted and added back).
    pub break_is_paid: bool,
    /// Minimum worked hours before any break applies.
    pub min_hours_for_break: Decimal,
    /// Night window start, "HH:MM" local time.
    pub night_start: String,
    /// Night window end, "HH:MM" local time; wraps past midnight when not after start.
    pub night_end: String,
}

impl PayProfile {
    /// Weekly overtime threshold in minutes (contract hours × 60).
    ///
    /// # Example
    ///
    /// ```
    /// use timebucket_engine::models::PayProfile;
    /// use rust_decimal::Decimal;
    ///
    /// let profile = PayProfile {
    ///     employee_id: 1,
    ///     contract_hours_per_week: Decimal::new(375, 1), // 37.5
    ///     break_minutes_default: None,
    ///     break_minutes_day: None,
    ///     break_minutes_night: None,
    ///     break_is_paid: false,
    ///     min_hours_for_break: Decimal::ZERO,
    ///     night_start: "22:00".to_string(),
    ///     night_end: "06:00".to_string(),
    /// };
    /// assert_eq!(profile.weekly_threshold_minutes(), 2250);
    /// ```
    pub fn weekly_threshold_minutes(&self) -> i64 {
        hours_to_minutes(self.contract_hours_per_week)
    }

    /// Minimum worked minutes before a break applies.
    pub fn min_minutes_for_break(&self) -> i64 {
        hours_to_minutes(self.min_hours_for_break)
    }

    /// Parses the profile's night window, `None` if either bound is malformed.
    pub fn night_window(&self) -> Option<NightWindow> {
        NightWindow::parse(&self.night_start, &self.night_end)
    }
}

/// Converts decimal hours to whole minutes, rounding half away from zero.
/// Negative values clamp to zero.
pub fn hours_to_minutes(hours: Decimal) -> i64 {
    (hours * Decimal::from(60))
        .round()
        .to_i64()
        .unwrap_or(0)
        .max(0)
}

/// A local-time night window, e.g. 22:00–06:00.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NightWindow {
    /// Window start (local time).
    pub start: NaiveTime,
    /// Window end (local time).
    pub end: NaiveTime,
}

impl Default for NightWindow {
    /// The fallback window, 22:00–06:00.
    fn default() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(22, 0, 0).unwrap_or(NaiveTime::MIN),
            end: NaiveTime::from_hms_opt(6, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

impl NightWindow {
    /// Parses "HH:MM" or "HH:MM:SS" bounds.
    pub fn parse(start: &str, end: &str) -> Option<Self> {
        Some(Self {
            start: parse_clock_time(start)?,
            end: parse_clock_time(end)?,
        })
    }

    /// Returns true if the window crosses local midnight.
    pub fn wraps_midnight(&self) -> bool {
        self.end <= self.start
    }
}

fn parse_clock_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
}

/// One row of the break tier table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakTier {
    /// Worked minutes at which this tier starts to apply.
    pub min_worked_minutes: i64,
    /// Break minutes for this tier.
    pub break_minutes: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(night_start: &str, night_end: &str) -> PayProfile {
        PayProfile {
            employee_id: 1,
            contract_hours_per_week: Decimal::new(40, 0),
            break_minutes_default: Some(30),
            break_minutes_day: None,
            break_minutes_night: None,
            break_is_paid: false,
            min_hours_for_break: Decimal::new(6, 0),
            night_start: night_start.to_string(),
            night_end: night_end.to_string(),
        }
    }

    #[test]
    fn test_weekly_threshold_from_whole_hours() {
        assert_eq!(profile("22:00", "06:00").weekly_threshold_minutes(), 2400);
    }

    #[test]
    fn test_zero_contract_hours_gives_zero_threshold() {
        let mut p = profile("22:00", "06:00");
        p.contract_hours_per_week = Decimal::ZERO;
        assert_eq!(p.weekly_threshold_minutes(), 0);
    }

    #[test]
    fn test_fractional_hours_round_to_minutes() {
        // 4.125 hours = 247.5 minutes, rounds to 248
        assert_eq!(hours_to_minutes(Decimal::new(4125, 3)), 248);
        assert_eq!(hours_to_minutes(Decimal::new(-3, 0)), 0);
    }

    #[test]
    fn test_min_minutes_for_break() {
        assert_eq!(profile("22:00", "06:00").min_minutes_for_break(), 360);
    }

    #[test]
    fn test_night_window_parses_both_formats() {
        let window = profile("21:30", "05:45:00").night_window().unwrap();
        assert_eq!(window.start, NaiveTime::from_hms_opt(21, 30, 0).unwrap());
        assert_eq!(window.end, NaiveTime::from_hms_opt(5, 45, 0).unwrap());
        assert!(window.wraps_midnight());
    }

    #[test]
    fn test_malformed_night_window_is_none() {
        assert!(profile("late", "06:00").night_window().is_none());
        assert!(profile("22:00", "25:00").night_window().is_none());
    }

    #[test]
    fn test_default_night_window() {
        let window = NightWindow::default();
        assert_eq!(window.start, NaiveTime::from_hms_opt(22, 0, 0).unwrap());
        assert_eq!(window.end, NaiveTime::from_hms_opt(6, 0, 0).unwrap());
    }

    #[test]
    fn test_deserialize_profile_with_decimal_strings() {
        let json = r#"{
            "employee_id": 3,
            "contract_hours_per_week": "37.5",
            "break_minutes_default": 30,
            "break_minutes_day": null,
            "break_minutes_night": 45,
            "break_is_paid": true,
            "min_hours_for_break": "4.5",
            "night_start": "22:00",
            "night_end": "06:00"
        }"#;
        let p: PayProfile = serde_json::from_str(json).unwrap();
        assert_eq!(p.weekly_threshold_minutes(), 2250);
        assert_eq!(p.min_minutes_for_break(), 270);
        assert_eq!(p.break_minutes_night, Some(45));
    }
}
