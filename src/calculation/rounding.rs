//! Clock-punch rounding.
//!
//! A punch is snapped to the nearest grid line of the configured increment
//! only when that line is within the grace window. The grid is laid over the
//! local minute-of-day, so zones with half-hour offsets round to local
//! quarter-hours rather than UTC ones. The stored punch is never touched;
//! the rounded value is only used for payroll calculation.

use chrono::{DateTime, Duration, Timelike, Utc};
use chrono_tz::Tz;

use crate::config::RoundingRule;

/// Rounds a punch according to `rule`.
///
/// Snaps down when the distance to the grid line below is within grace and
/// no larger than the distance to the line above (ties favour the line
/// below). Otherwise snaps up when the line above is within grace.
/// Otherwise returns the punch unchanged.
///
/// # Example
///
/// ```
/// use timebucket_engine::calculation::round_timestamp;
/// use timebucket_engine::config::RoundingRule;
/// use chrono::{TimeZone, Utc};
///
/// let rule = RoundingRule { increment_minutes: 15, grace_minutes: 5 };
/// let tz = chrono_tz::UTC;
///
/// let early = Utc.with_ymd_and_hms(2026, 1, 15, 8, 3, 0).unwrap();
/// assert_eq!(round_timestamp(early, rule, tz), Utc.with_ymd_and_hms(2026, 1, 15, 8, 0, 0).unwrap());
///
/// let outside_grace = Utc.with_ymd_and_hms(2026, 1, 15, 8, 7, 0).unwrap();
/// assert_eq!(round_timestamp(outside_grace, rule, tz), outside_grace);
/// ```
pub fn round_timestamp(instant: DateTime<Utc>, rule: RoundingRule, tz: Tz) -> DateTime<Utc> {
    if rule.increment_minutes == 0 {
        return instant;
    }

    let local = instant.with_timezone(&tz);
    let grid_seconds = i64::from(rule.increment_minutes) * 60;
    let seconds_into_grid = i64::from(local.num_seconds_from_midnight()) % grid_seconds;

    let to_floor =
        Duration::seconds(seconds_into_grid) + Duration::nanoseconds(i64::from(local.nanosecond()));
    if to_floor == Duration::zero() {
        return instant;
    }

    let to_ceil = Duration::seconds(grid_seconds) - to_floor;
    let grace = Duration::minutes(i64::from(rule.grace_minutes));

    if to_floor <= grace && to_floor <= to_ceil {
        instant - to_floor
    } else if to_ceil <= grace {
        instant + to_ceil
    } else {
        instant
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, h, m, s).unwrap()
    }

    fn rule(increment: u32, grace: u32) -> RoundingRule {
        RoundingRule {
            increment_minutes: increment,
            grace_minutes: grace,
        }
    }

    // ==========================================================================
    // RD-001: 08:07 with 15/5 stays unchanged (7 > 5 and 8 > 5)
    // ==========================================================================
    #[test]
    fn test_rd_001_outside_grace_is_unchanged() {
        assert_eq!(round_timestamp(utc(8, 7, 0), rule(15, 5), chrono_tz::UTC), utc(8, 7, 0));
    }

    // ==========================================================================
    // RD-002: 08:03 snaps down to 08:00
    // ==========================================================================
    #[test]
    fn test_rd_002_within_grace_snaps_down() {
        assert_eq!(round_timestamp(utc(8, 3, 0), rule(15, 5), chrono_tz::UTC), utc(8, 0, 0));
    }

    // ==========================================================================
    // RD-003: 08:13 snaps up to 08:15
    // ==========================================================================
    #[test]
    fn test_rd_003_within_grace_snaps_up() {
        assert_eq!(round_timestamp(utc(8, 13, 0), rule(15, 5), chrono_tz::UTC), utc(8, 15, 0));
    }

    #[test]
    fn test_tie_favours_floor() {
        // 08:05 is 5 from 08:00 and 5 from 08:10
        assert_eq!(round_timestamp(utc(8, 5, 0), rule(10, 5), chrono_tz::UTC), utc(8, 0, 0));
    }

    #[test]
    fn test_on_grid_is_unchanged() {
        assert_eq!(round_timestamp(utc(8, 15, 0), rule(15, 5), chrono_tz::UTC), utc(8, 15, 0));
    }

    #[test]
    fn test_large_grace_prefers_nearer_line() {
        // 08:12 with grace 10: floor distance 12 > 10, ceil distance 3
        assert_eq!(round_timestamp(utc(8, 12, 0), rule(15, 10), chrono_tz::UTC), utc(8, 15, 0));
        // 08:06 with grace 10: floor 6 is nearer than ceil 9
        assert_eq!(round_timestamp(utc(8, 6, 0), rule(15, 10), chrono_tz::UTC), utc(8, 0, 0));
    }

    #[test]
    fn test_seconds_count_towards_distance() {
        // 08:05:30 is 5.5 minutes from 08:00, outside a 5 minute grace
        assert_eq!(round_timestamp(utc(8, 5, 30), rule(15, 5), chrono_tz::UTC), utc(8, 5, 30));
        // 08:04:59 is inside
        assert_eq!(round_timestamp(utc(8, 4, 59), rule(15, 5), chrono_tz::UTC), utc(8, 0, 0));
    }

    #[test]
    fn test_snap_up_crosses_midnight() {
        let late = Utc.with_ymd_and_hms(2026, 1, 15, 23, 58, 0).unwrap();
        let midnight = Utc.with_ymd_and_hms(2026, 1, 16, 0, 0, 0).unwrap();
        assert_eq!(round_timestamp(late, rule(15, 5), chrono_tz::UTC), midnight);
    }

    #[test]
    fn test_grid_follows_local_half_hour_offset() {
        // 03:33 UTC is 09:03 in Kolkata (UTC+05:30); rounds to 09:00 local = 03:30 UTC
        let punch = utc(3, 33, 0);
        let rounded = round_timestamp(punch, rule(60, 5), chrono_tz::Asia::Kolkata);
        assert_eq!(rounded, utc(3, 30, 0));
    }

    #[test]
    fn test_zero_increment_is_noop() {
        assert_eq!(round_timestamp(utc(8, 3, 0), rule(0, 5), chrono_tz::UTC), utc(8, 3, 0));
    }
}
