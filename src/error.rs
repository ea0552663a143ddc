//! Error types for the time bucketing engine.
//!
//! Only fatal conditions live here. Per-shift skips and recoverable
//! configuration gaps are reported as values on the batch outcome
//! (see [`crate::batch::SkipReason`] and [`crate::models::AuditWarning`]).

use thiserror::Error;
use uuid::Uuid;

/// The main error type for the time bucketing engine.
///
/// Any of these raised while a batch is running aborts the batch and rolls
/// its transaction back.
///
/// # Example
///
/// ```
/// use timebucket_engine::error::EngineError;
///
/// let error = EngineError::InvalidPeriod {
///     value: "2026-13".to_string(),
/// };
/// assert_eq!(error.to_string(), "Invalid payroll period '2026-13': expected YYYY-MM");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// The payroll timezone is not a known IANA zone.
    #[error("Invalid timezone in settings: {value}")]
    InvalidTimezone {
        /// The rejected timezone name.
        value: String,
    },

    /// A settings value is outside its allowed range.
    #[error("Invalid setting '{field}': {message}")]
    InvalidSettings {
        /// The offending settings field.
        field: String,
        /// What is wrong with it.
        message: String,
    },

    /// The requested payroll period could not be parsed.
    #[error("Invalid payroll period '{value}': expected YYYY-MM")]
    InvalidPeriod {
        /// The rejected period string.
        value: String,
    },

    /// No shift exists with the given id.
    #[error("Shift not found: {shift_id}")]
    ShiftNotFound {
        /// The id that was looked up.
        shift_id: i64,
    },

    /// No batch exists with the given id.
    #[error("Payroll batch not found: {batch_id}")]
    BatchNotFound {
        /// The id that was looked up.
        batch_id: Uuid,
    },

    /// A stored row could not be turned back into a domain value.
    #[error("Corrupt stored record in '{table}': {message}")]
    CorruptRecord {
        /// The table the row came from.
        table: String,
        /// A description of the problem.
        message: String,
    },

    /// The database or the enclosing transaction failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migrations could not be applied.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A day breakdown could not be serialized or deserialized.
    #[error("Breakdown serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/settings.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/settings.yaml"
        );
    }

    #[test]
    fn test_invalid_timezone_displays_value() {
        let error = EngineError::InvalidTimezone {
            value: "Mars/Olympus".to_string(),
        };
        assert_eq!(error.to_string(), "Invalid timezone in settings: Mars/Olympus");
    }

    #[test]
    fn test_invalid_settings_displays_field_and_message() {
        let error = EngineError::InvalidSettings {
            field: "night_threshold_percent".to_string(),
            message: "must be between 0 and 100".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid setting 'night_threshold_percent': must be between 0 and 100"
        );
    }

    #[test]
    fn test_shift_not_found_displays_id() {
        let error = EngineError::ShiftNotFound { shift_id: 42 };
        assert_eq!(error.to_string(), "Shift not found: 42");
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_sqlx_error_converts_with_question_mark() {
        fn fails() -> EngineResult<()> {
            Err(sqlx::Error::RowNotFound)?;
            Ok(())
        }

        assert!(matches!(fails(), Err(EngineError::Database(_))));
    }
}
