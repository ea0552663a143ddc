//! Break deduction and night-shift classification.
//!
//! ## Break source priority
//!
//! 1. Manager override recorded on the shift
//! 2. Employee night- or day-specific break minutes, by classification
//! 3. Employee default break minutes
//! 4. Break tier table, by worked minutes
//!
//! Whatever the source, a shift shorter than the employee's minimum hours
//! for a break gets no break, and a break never exceeds worked minutes.
//! Paid breaks are deducted and added back, so paid minutes are unchanged
//! while the break itself is still tracked.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::models::{BreakTier, NightWindow, PayProfile};

use super::day_segmentation::local_to_utc;

/// Where a shift's break minutes came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakSource {
    /// Manager override on the shift.
    ManagerOverride,
    /// Employee night-shift break rule.
    NightRule,
    /// Employee day-shift break rule.
    DayRule,
    /// Employee default break minutes.
    ProfileDefault,
    /// Break tier table.
    Tier,
    /// No tier matched; break is zero.
    NoTier,
    /// Worked time is below the minimum for a break; break is zero.
    BelowMinimumHours,
}

/// Break computation for one shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakOutcome {
    /// Worked minutes of the whole shift.
    pub worked_minutes: i64,
    /// Minutes overlapping the night window.
    pub night_minutes: i64,
    /// Whether the shift met the night threshold.
    pub is_night_shift: bool,
    /// Break minutes applied.
    pub break_minutes: i64,
    /// Minutes deducted from worked time.
    pub deducted_minutes: i64,
    /// Minutes added back because the break is paid.
    pub added_back_minutes: i64,
    /// `worked - deducted + added_back`, never negative.
    pub paid_minutes: i64,
    /// Which rule supplied the break.
    pub source: BreakSource,
}

/// Everything the break calculator needs about one shift.
#[derive(Debug, Clone, Copy)]
pub struct BreakContext<'a> {
    /// Effective (rounded) clock-in.
    pub clock_in: DateTime<Utc>,
    /// Effective (rounded) clock-out.
    pub clock_out: DateTime<Utc>,
    /// Manager break override on the shift.
    pub override_minutes: Option<i64>,
    /// Employee profile, if one exists.
    pub profile: Option<&'a PayProfile>,
    /// Night window to classify against.
    pub night_window: NightWindow,
    /// Night-shift threshold percentage.
    pub night_threshold_percent: u32,
    /// Payroll timezone.
    pub tz: Tz,
}

/// Computes break minutes for a shift.
///
/// # Example
///
/// ```
/// use timebucket_engine::calculation::{calculate_break, BreakContext, BreakSource};
/// use timebucket_engine::models::{BreakTier, NightWindow};
/// use chrono::{TimeZone, Utc};
///
/// let tiers = [
///     BreakTier { min_worked_minutes: 240, break_minutes: 15 },
///     BreakTier { min_worked_minutes: 360, break_minutes: 30 },
/// ];
/// let ctx = BreakContext {
///     clock_in: Utc.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).unwrap(),
///     clock_out: Utc.with_ymd_and_hms(2026, 1, 15, 17, 0, 0).unwrap(),
///     override_minutes: None,
///     profile: None,
///     night_window: NightWindow::default(),
///     night_threshold_percent: 50,
///     tz: chrono_tz::UTC,
/// };
///
/// let outcome = calculate_break(&ctx, &tiers);
/// assert_eq!(outcome.source, BreakSource::Tier);
/// assert_eq!(outcome.break_minutes, 30);
/// assert_eq!(outcome.paid_minutes, 450);
/// ```
pub fn calculate_break(ctx: &BreakContext<'_>, tiers: &[BreakTier]) -> BreakOutcome {
    let worked_minutes = (ctx.clock_out - ctx.clock_in).num_minutes().max(0);
    let night_minutes =
        night_overlap_minutes(ctx.clock_in, ctx.clock_out, ctx.night_window, ctx.tz);
    let is_night_shift =
        is_night_shift(worked_minutes, night_minutes, ctx.night_threshold_percent);

    let min_minutes = ctx.profile.map(|p| p.min_minutes_for_break()).unwrap_or(0);

    let (break_minutes, source) = if worked_minutes < min_minutes {
        (0, BreakSource::BelowMinimumHours)
    } else {
        select_break(ctx, tiers, worked_minutes, is_night_shift)
    };

    let break_minutes = break_minutes.clamp(0, worked_minutes);
    let break_is_paid = ctx.profile.is_some_and(|p| p.break_is_paid);
    let deducted_minutes = break_minutes;
    let added_back_minutes = if break_is_paid { break_minutes } else { 0 };

    BreakOutcome {
        worked_minutes,
        night_minutes,
        is_night_shift,
        break_minutes,
        deducted_minutes,
        added_back_minutes,
        paid_minutes: (worked_minutes - deducted_minutes + added_back_minutes).max(0),
        source,
    }
}

fn select_break(
    ctx: &BreakContext<'_>,
    tiers: &[BreakTier],
    worked_minutes: i64,
    is_night_shift: bool,
) -> (i64, BreakSource) {
    if let Some(minutes) = ctx.override_minutes {
        return (minutes, BreakSource::ManagerOverride);
    }

    if let Some(profile) = ctx.profile {
        let shift_rule = if is_night_shift {
            profile.break_minutes_night.map(|m| (m, BreakSource::NightRule))
        } else {
            profile.break_minutes_day.map(|m| (m, BreakSource::DayRule))
        };
        if let Some(rule) = shift_rule {
            return rule;
        }
        if let Some(minutes) = profile.break_minutes_default {
            return (minutes, BreakSource::ProfileDefault);
        }
    }

    match lookup_break_tier(tiers, worked_minutes) {
        Some(tier) => (tier.break_minutes, BreakSource::Tier),
        None => (0, BreakSource::NoTier),
    }
}

/// Finds the tier with the highest `min_worked_minutes` not exceeding `worked_minutes`.
pub fn lookup_break_tier(tiers: &[BreakTier], worked_minutes: i64) -> Option<&BreakTier> {
    tiers
        .iter()
        .filter(|t| t.min_worked_minutes <= worked_minutes)
        .max_by_key(|t| t.min_worked_minutes)
}

/// Returns true when night minutes are at least `threshold_percent` of worked minutes.
pub fn is_night_shift(worked_minutes: i64, night_minutes: i64, threshold_percent: u32) -> bool {
    worked_minutes > 0 && night_minutes * 100 >= i64::from(threshold_percent) * worked_minutes
}

/// Minutes of `[start, end)` that fall inside the nightly window.
///
/// The window repeats every local day; when it ends at or before its start
/// it runs into the following day.
pub fn night_overlap_minutes(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    window: NightWindow,
    tz: Tz,
) -> i64 {
    if start >= end {
        return 0;
    }

    let first_day = start.with_timezone(&tz).date_naive() - Duration::days(1);
    let last_day = end.with_timezone(&tz).date_naive();

    let overlap_seconds: i64 = first_day
        .iter_days()
        .take_while(|day| *day <= last_day)
        .map(|day| {
            let (window_start, window_end) = night_window_utc(day, window, tz);
            let overlap_start = start.max(window_start);
            let overlap_end = end.min(window_end);
            (overlap_end - overlap_start).num_seconds().max(0)
        })
        .sum();

    overlap_seconds / 60
}

fn night_window_utc(
    day: NaiveDate,
    window: NightWindow,
    tz: Tz,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let end_day = if window.wraps_midnight() {
        day + Duration::days(1)
    } else {
        day
    };
    (
        local_to_utc(tz, day.and_time(window.start)),
        local_to_utc(tz, end_day.and_time(window.end)),
    )
}
