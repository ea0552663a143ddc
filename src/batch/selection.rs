//! Which shifts a batch includes.

use chrono::{DateTime, Utc};

use crate::batch::SkipReason;
use crate::config::MonthBoundaryMode;
use crate::models::{EffectiveTimes, PayrollPeriod, Shift};

/// Verdict for one candidate shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    /// Include using these effective punches.
    Include {
        /// Effective clock-in.
        clock_in: DateTime<Utc>,
        /// Effective clock-out.
        clock_out: DateTime<Utc>,
    },
    /// Report the shift as skipped.
    Skip(SkipReason),
    /// The shift belongs to another period; say nothing about it.
    Ignore,
}

fn belongs_to_period(
    clock_in: DateTime<Utc>,
    clock_out: Option<DateTime<Utc>>,
    period: &PayrollPeriod,
    mode: MonthBoundaryMode,
) -> bool {
    match mode {
        MonthBoundaryMode::EndOfShift => period.contains_instant(clock_in),
        MonthBoundaryMode::Midnight => {
            period.contains_instant(clock_in)
                || clock_out.is_some_and(|out| period.overlaps(clock_in, out))
        }
    }
}

/// Decides whether a shift takes part in a run for `period`.
///
/// Attribution follows the effective times. A shift whose captured punch
/// belonged to the period but whose edits moved it out is reported rather
/// than silently dropped.
///
/// # Example
///
/// ```
/// use timebucket_engine::batch::{assess_shift, Eligibility, SkipReason};
/// use timebucket_engine::config::MonthBoundaryMode;
/// use timebucket_engine::models::{PayrollPeriod, Shift};
/// use chrono::{TimeZone, Utc};
///
/// let period = PayrollPeriod::parse("2026-01", chrono_tz::UTC).unwrap();
/// let shift = Shift {
///     id: 1,
///     employee_id: 2,
///     clock_in_utc: Utc.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).unwrap(),
///     clock_out_utc: None,
///     break_override_minutes: None,
///     approved: true,
///     locked_at: None,
///     locked_by: None,
///     lock_batch_id: None,
/// };
///
/// let verdict = assess_shift(&shift, shift.effective_times(&[]), &period, MonthBoundaryMode::Midnight);
/// assert_eq!(verdict, Eligibility::Skip(SkipReason::MissingClockOut));
/// ```
pub fn assess_shift(
    shift: &Shift,
    times: EffectiveTimes,
    period: &PayrollPeriod,
    mode: MonthBoundaryMode,
) -> Eligibility {
    let Some(clock_out) = times.clock_out else {
        return if period.contains_instant(times.clock_in) {
            Eligibility::Skip(SkipReason::MissingClockOut)
        } else {
            Eligibility::Ignore
        };
    };

    if !belongs_to_period(times.clock_in, Some(clock_out), period, mode) {
        let captured = belongs_to_period(shift.clock_in_utc, shift.clock_out_utc, period, mode);
        return if captured {
            Eligibility::Skip(SkipReason::OutsidePeriod)
        } else {
            Eligibility::Ignore
        };
    }

    if !shift.approved {
        return Eligibility::Skip(SkipReason::NotApproved);
    }

    if let Some(batch_id) = shift.lock_batch_id {
        return Eligibility::Skip(SkipReason::AlreadyLocked { batch_id });
    }

    Eligibility::Include {
        clock_in: times.clock_in,
        clock_out,
    }
}
