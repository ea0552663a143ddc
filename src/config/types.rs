//! Configuration types for time bucketing.
//!
//! [`SettingsFile`] mirrors the YAML document one-to-one and is lenient: every
//! field has a default. [`Settings`] is the validated value the engine runs
//! on, produced once per batch invocation and passed by reference.

use chrono::{Datelike, NaiveDate, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// How shifts that straddle a calendar-month boundary are attributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthBoundaryMode {
    /// Shift minutes are clipped to the calendar month at local midnight.
    #[default]
    Midnight,
    /// The whole shift belongs to the month containing its start.
    EndOfShift,
}

/// Raw settings as stored in the settings YAML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsFile {
    /// IANA name of the payroll timezone.
    pub timezone: String,
    /// First day of the payroll week (e.g. "Mon", "sunday").
    pub week_start_day: String,
    /// Month-boundary attribution mode.
    pub month_boundary_mode: MonthBoundaryMode,
    /// Whether clock punches are snapped to a grid.
    pub rounding_enabled: bool,
    /// Rounding grid in minutes.
    pub round_increment_minutes: u32,
    /// Maximum distance, in minutes, a punch may be moved.
    pub round_grace_minutes: u32,
    /// Percentage of shift minutes inside the night window that makes a night shift.
    pub night_threshold_percent: u32,
    /// Days of the week paid into the weekend bucket.
    pub weekend_days: Vec<String>,
    /// Whether the bank-holiday calendar is consulted at all.
    pub bank_holiday_enabled: bool,
    /// Whether bank-holiday minutes are paid into their own bucket.
    pub bank_holiday_paid: bool,
    /// Maximum bank-holiday minutes per employee per day.
    pub bank_holiday_daily_cap_minutes: Option<u32>,
}

impl Default for SettingsFile {
    fn default() -> Self {
        Self {
            timezone: "Europe/London".to_string(),
            week_start_day: "Mon".to_string(),
            month_boundary_mode: MonthBoundaryMode::Midnight,
            rounding_enabled: false,
            round_increment_minutes: 15,
            round_grace_minutes: 5,
            night_threshold_percent: 50,
            weekend_days: vec!["Sat".to_string(), "Sun".to_string()],
            bank_holiday_enabled: true,
            bank_holiday_paid: true,
            bank_holiday_daily_cap_minutes: None,
        }
    }
}

/// Clock-punch rounding rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundingRule {
    /// Grid size in minutes.
    pub increment_minutes: u32,
    /// Grace window in minutes.
    pub grace_minutes: u32,
}

/// Validated process-wide settings, read at batch start.
///
/// # Example
///
/// ```
/// use timebucket_engine::config::{MonthBoundaryMode, Settings};
/// use chrono::Weekday;
///
/// let settings = Settings::from_yaml_str(
///     "timezone: Europe/Berlin\nweek_start_day: Sun\nmonth_boundary_mode: end_of_shift\n",
/// )
/// .unwrap();
/// assert_eq!(settings.timezone, chrono_tz::Europe::Berlin);
/// assert_eq!(settings.week_start_day, Weekday::Sun);
/// assert_eq!(settings.month_boundary_mode, MonthBoundaryMode::EndOfShift);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Payroll timezone.
    pub timezone: Tz,
    /// First day of the payroll week.
    pub week_start_day: Weekday,
    /// Month-boundary attribution mode.
    pub month_boundary_mode: MonthBoundaryMode,
    /// Rounding rule, `None` when rounding is disabled.
    pub rounding: Option<RoundingRule>,
    /// Night-shift classification threshold, 0 to 100.
    pub night_threshold_percent: u32,
    /// Days of the week paid into the weekend bucket.
    pub weekend_days: Vec<Weekday>,
    /// Whether the bank-holiday calendar is consulted.
    pub bank_holiday_enabled: bool,
    /// Whether bank-holiday minutes go into their own bucket.
    pub bank_holiday_paid: bool,
    /// Settings-wide bank-holiday cap in minutes per employee per day.
    pub bank_holiday_daily_cap_minutes: Option<i64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::Europe::London,
            week_start_day: Weekday::Mon,
            month_boundary_mode: MonthBoundaryMode::Midnight,
            rounding: None,
            night_threshold_percent: 50,
            weekend_days: vec![Weekday::Sat, Weekday::Sun],
            bank_holiday_enabled: true,
            bank_holiday_paid: true,
            bank_holiday_daily_cap_minutes: None,
        }
    }
}

impl Settings {
    /// Parses and validates settings from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> EngineResult<Self> {
        let file: SettingsFile =
            serde_yaml::from_str(yaml).map_err(|e| EngineError::ConfigParseError {
                path: "<inline>".to_string(),
                message: e.to_string(),
            })?;
        Self::try_from(file)
    }

    /// Returns true if the local date falls on a configured weekend day.
    pub fn is_weekend(&self, date: NaiveDate) -> bool {
        self.weekend_days.contains(&date.weekday())
    }

    /// Returns true if bank-holiday minutes are paid into their own bucket.
    pub fn pays_bank_holidays(&self) -> bool {
        self.bank_holiday_enabled && self.bank_holiday_paid
    }
}

impl TryFrom<SettingsFile> for Settings {
    type Error = EngineError;

    fn try_from(file: SettingsFile) -> EngineResult<Self> {
        let timezone: Tz =
            file.timezone
                .trim()
                .parse()
                .map_err(|_| EngineError::InvalidTimezone {
                    value: file.timezone.clone(),
                })?;

        let week_start_day = parse_weekday("week_start_day", &file.week_start_day)?;

        let weekend_days = file
            .weekend_days
            .iter()
            .map(|day| parse_weekday("weekend_days", day))
            .collect::<EngineResult<Vec<_>>>()?;

        if file.night_threshold_percent > 100 {
            return Err(EngineError::InvalidSettings {
                field: "night_threshold_percent".to_string(),
                message: format!("must be between 0 and 100, got {}", file.night_threshold_percent),
            });
        }

        let rounding = if file.rounding_enabled {
            if file.round_increment_minutes == 0 {
                return Err(EngineError::InvalidSettings {
                    field: "round_increment_minutes".to_string(),
                    message: "must be greater than zero when rounding is enabled".to_string(),
                });
            }
            Some(RoundingRule {
                increment_minutes: file.round_increment_minutes,
                grace_minutes: file.round_grace_minutes,
            })
        } else {
            None
        };

        Ok(Self {
            timezone,
            week_start_day,
            month_boundary_mode: file.month_boundary_mode,
            rounding,
            night_threshold_percent: file.night_threshold_percent,
            weekend_days,
            bank_holiday_enabled: file.bank_holiday_enabled,
            bank_holiday_paid: file.bank_holiday_paid,
            bank_holiday_daily_cap_minutes: file.bank_holiday_daily_cap_minutes.map(i64::from),
        })
    }
}

fn parse_weekday(field: &str, value: &str) -> EngineResult<Weekday> {
    value
        .trim()
        .parse::<Weekday>()
        .map_err(|_| EngineError::InvalidSettings {
            field: field.to_string(),
            message: format!("unknown weekday '{}'", value),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_file_validates_to_default_settings() {
        let settings = Settings::try_from(SettingsFile::default()).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let settings = Settings::from_yaml_str("{}").unwrap();
        assert_eq!(settings.timezone, chrono_tz::Europe::London);
        assert_eq!(settings.week_start_day, Weekday::Mon);
        assert!(settings.rounding.is_none());
        assert_eq!(settings.night_threshold_percent, 50);
    }

    #[test]
    fn test_invalid_timezone_is_fatal() {
        let result = Settings::from_yaml_str("timezone: Mars/Olympus");
        match result {
            Err(EngineError::InvalidTimezone { value }) => assert_eq!(value, "Mars/Olympus"),
            other => panic!("Expected InvalidTimezone, got {:?}", other),
        }
    }

    #[test]
    fn test_rounding_enabled_carries_rule() {
        let settings = Settings::from_yaml_str(
            "rounding_enabled: true\nround_increment_minutes: 10\nround_grace_minutes: 3\n",
        )
        .unwrap();
        assert_eq!(
            settings.rounding,
            Some(RoundingRule {
                increment_minutes: 10,
                grace_minutes: 3
            })
        );
    }

    #[test]
    fn test_rounding_with_zero_increment_is_rejected() {
        let result =
            Settings::from_yaml_str("rounding_enabled: true\nround_increment_minutes: 0\n");
        assert!(matches!(result, Err(EngineError::InvalidSettings { .. })));
    }

    #[test]
    fn test_night_threshold_above_100_is_rejected() {
        let result = Settings::from_yaml_str("night_threshold_percent: 120");
        assert!(matches!(result, Err(EngineError::InvalidSettings { .. })));
    }

    #[test]
    fn test_weekend_days_parse_long_and_short_names() {
        let settings = Settings::from_yaml_str("weekend_days: [friday, Sat]").unwrap();
        assert_eq!(settings.weekend_days, vec![Weekday::Fri, Weekday::Sat]);
        // 2026-01-16 is a Friday
        assert!(settings.is_weekend(NaiveDate::from_ymd_opt(2026, 1, 16).unwrap()));
        assert!(!settings.is_weekend(NaiveDate::from_ymd_opt(2026, 1, 18).unwrap()));
    }

    #[test]
    fn test_unknown_weekday_is_rejected() {
        let result = Settings::from_yaml_str("week_start_day: Funday");
        match result {
            Err(EngineError::InvalidSettings { field, .. }) => assert_eq!(field, "week_start_day"),
            other => panic!("Expected InvalidSettings, got {:?}", other),
        }
    }

    #[test]
    fn test_bank_holiday_pay_requires_enabled_and_paid() {
        let settings =
            Settings::from_yaml_str("bank_holiday_enabled: true\nbank_holiday_paid: false\n")
                .unwrap();
        assert!(!settings.pays_bank_holidays());
    }

    #[test]
    fn test_month_boundary_mode_serialization() {
        assert_eq!(
            serde_json::to_string(&MonthBoundaryMode::EndOfShift).unwrap(),
            "\"end_of_shift\""
        );
        assert_eq!(
            serde_json::to_string(&MonthBoundaryMode::Midnight).unwrap(),
            "\"midnight\""
        );
    }
}
