//! Settings loading functionality.
//!
//! This module provides the [`SettingsLoader`] type for loading engine
//! settings from a YAML file.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{EngineError, EngineResult};

use super::types::{Settings, SettingsFile};

/// Loads engine settings from disk.
///
/// The settings file is a flat YAML mapping; any omitted field takes its
/// default:
///
/// ```text
/// timezone: Europe/London
/// week_start_day: Mon
/// month_boundary_mode: midnight      # or end_of_shift
/// rounding_enabled: true
/// round_increment_minutes: 15
/// round_grace_minutes: 5
/// night_threshold_percent: 50
/// weekend_days: [Sat, Sun]
/// bank_holiday_enabled: true
/// bank_holiday_paid: true
/// bank_holiday_daily_cap_minutes: 720
/// ```
///
/// # Example
///
/// ```no_run
/// use timebucket_engine::config::SettingsLoader;
///
/// let settings = SettingsLoader::load("./config/settings.yaml")?;
/// println!("Payroll timezone: {}", settings.timezone);
/// # Ok::<(), timebucket_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SettingsLoader;

impl SettingsLoader {
    /// Loads and validates settings from the specified file.
    ///
    /// Returns an error if the file is missing, is not valid YAML, names an
    /// unknown timezone, or carries an out-of-range value.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Settings> {
        let path = path.as_ref();
        let file = Self::load_yaml(path)?;
        let settings = Settings::try_from(file)?;
        debug!(
            path = %path.display(),
            timezone = %settings.timezone,
            mode = ?settings.month_boundary_mode,
            "Loaded settings"
        );
        Ok(settings)
    }

    /// Loads and parses the raw settings document.
    fn load_yaml(path: &Path) -> EngineResult<SettingsFile> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }
}
