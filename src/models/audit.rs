//! Audit warnings raised during a batch run.

use serde::{Deserialize, Serialize};

/// A warning generated during calculation.
///
/// Warnings record configuration gaps the engine worked around with a
/// documented default. They never stop a run.
///
/// # Example
///
/// ```
/// use timebucket_engine::models::AuditWarning;
///
/// let warning = AuditWarning::missing_pay_profile(12);
/// assert_eq!(warning.code, "missing_pay_profile");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

impl AuditWarning {
    /// No pay profile exists; overtime is disabled for the employee.
    pub fn missing_pay_profile(employee_id: i64) -> Self {
        Self {
            code: "missing_pay_profile".to_string(),
            message: format!(
                "Employee {} has no pay profile; overtime disabled and default night window used",
                employee_id
            ),
            severity: "medium".to_string(),
        }
    }

    /// The profile's night window could not be parsed.
    pub fn malformed_night_window(employee_id: i64, start: &str, end: &str) -> Self {
        Self {
            code: "malformed_night_window".to_string(),
            message: format!(
                "Employee {} night window '{}'-'{}' is malformed; using 22:00-06:00",
                employee_id, start, end
            ),
            severity: "low".to_string(),
        }
    }

    /// No break tier matched the worked minutes.
    pub fn no_break_tier(shift_id: i64, worked_minutes: i64) -> Self {
        Self {
            code: "no_break_tier".to_string(),
            message: format!(
                "Shift {} worked {} minutes but no break tier applies; break set to 0",
                shift_id, worked_minutes
            ),
            severity: "low".to_string(),
        }
    }
}
