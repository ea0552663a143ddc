//! Weekly overtime allocation.
//!
//! Overtime is a property of an employee-week, not of a single shift: only
//! once every segment of the week is known can the excess over the contract
//! threshold be placed. The excess is taken from the latest segments first,
//! converting bank-holiday minutes before weekend minutes before normal.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::calculation::local_midnight_utc;
use crate::models::Buckets;

/// Arena reference to a segment: owning shift and position in its segment list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SegmentId {
    /// Owning shift.
    pub shift_id: i64,
    /// Index into the shift's day segments.
    pub index: usize,
}

/// Where a week segment's minutes come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "origin", rename_all = "snake_case")]
pub enum SegmentOrigin {
    /// A segment calculated by the current run.
    Included(SegmentId),
    /// A day an earlier batch already paid, keyed by shift and local date.
    Paid {
        /// Owning shift.
        shift_id: i64,
        /// Local date of the stored day row.
        date: NaiveDate,
    },
}

/// One classified segment entering the allocator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekSegment {
    /// Where the minutes come from.
    pub origin: SegmentOrigin,
    /// UTC end of the segment, used for latest-first ordering.
    pub utc_end: DateTime<Utc>,
    /// Paid minutes of the segment.
    pub paid_minutes: i64,
    /// Buckets before this allocation; may already carry overtime.
    pub buckets: Buckets,
}

/// A local payroll week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollWeek {
    /// First local date of the week.
    pub start: NaiveDate,
    /// Local midnight starting the week, in UTC.
    pub start_utc: DateTime<Utc>,
    /// Local midnight seven days later, in UTC (exclusive).
    pub end_utc: DateTime<Utc>,
}

impl PayrollWeek {
    /// The week containing `date` for the given week-start day.
    ///
    /// # Example
    ///
    /// ```
    /// use timebucket_engine::calculation::PayrollWeek;
    /// use chrono::{NaiveDate, Weekday};
    ///
    /// // Thursday 2026-01-15 falls in the week starting Monday 2026-01-12
    /// let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
    /// let week = PayrollWeek::containing(date, Weekday::Mon, chrono_tz::UTC);
    /// assert_eq!(week.start, NaiveDate::from_ymd_opt(2026, 1, 12).unwrap());
    /// ```
    pub fn containing(date: NaiveDate, week_start: Weekday, tz: Tz) -> Self {
        let start = week_start_for(date, week_start);
        let next = start + Duration::days(7);
        Self {
            start,
            start_utc: local_midnight_utc(tz, start),
            end_utc: local_midnight_utc(tz, next),
        }
    }

    /// Last local date of the week.
    pub fn last_day(&self) -> NaiveDate {
        self.start + Duration::days(6)
    }
}

/// First date of the week containing `date`.
pub fn week_start_for(date: NaiveDate, week_start: Weekday) -> NaiveDate {
    let offset = (7 + date.weekday().num_days_from_monday() - week_start.num_days_from_monday()) % 7;
    date - Duration::days(i64::from(offset))
}

/// Result of allocating one employee-week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyAllocation {
    /// Paid minutes across all the week's segments.
    pub weekly_paid_minutes: i64,
    /// Contract threshold used.
    pub threshold_minutes: i64,
    /// Overtime the input segments already carried.
    pub prior_overtime_minutes: i64,
    /// Overtime minutes newly placed by this allocation.
    pub overtime_minutes: i64,
    /// Segments with overtime applied, in input order.
    pub segments: Vec<WeekSegment>,
}

impl WeeklyAllocation {
    /// Adjusted buckets for an included segment, if it took part in the allocation.
    pub fn buckets_for(&self, id: SegmentId) -> Option<Buckets> {
        self.segments
            .iter()
            .find(|s| s.origin == SegmentOrigin::Included(id))
            .map(|s| s.buckets)
    }
}

/// Moves the week's excess over `threshold_minutes` into overtime.
///
/// Overtime already carried by the input counts toward the excess, so
/// running the allocator again over a finalized week places nothing. A
/// threshold of zero or less disables overtime. The input is not modified;
/// the adjusted segments are returned in the same order.
///
/// # Example
///
/// ```
/// use timebucket_engine::calculation::{
///     allocate_weekly_overtime, SegmentId, SegmentOrigin, WeekSegment,
/// };
/// use timebucket_engine::models::Buckets;
/// use chrono::{TimeZone, Utc};
///
/// let segment = |shift_id, day, normal| WeekSegment {
///     origin: SegmentOrigin::Included(SegmentId { shift_id, index: 0 }),
///     utc_end: Utc.with_ymd_and_hms(2026, 1, day, 17, 0, 0).unwrap(),
///     paid_minutes: normal,
///     buckets: Buckets { normal, ..Buckets::default() },
/// };
/// let week = vec![segment(1, 12, 600), segment(2, 13, 600)];
///
/// let allocation = allocate_weekly_overtime(&week, 1000);
/// assert_eq!(allocation.overtime_minutes, 200);
/// assert_eq!(allocation.segments[1].buckets.overtime, 200);
/// assert_eq!(allocation.segments[0].buckets.overtime, 0);
/// ```
pub fn allocate_weekly_overtime(segments: &[WeekSegment], threshold_minutes: i64) -> WeeklyAllocation {
    let weekly_paid_minutes: i64 = segments.iter().map(|s| s.paid_minutes.max(0)).sum();
    let prior_overtime_minutes: i64 = segments.iter().map(|s| s.buckets.overtime.max(0)).sum();
    let mut adjusted = segments.to_vec();

    let mut remaining = if threshold_minutes > 0 {
        (weekly_paid_minutes - threshold_minutes - prior_overtime_minutes).max(0)
    } else {
        0
    };
    let excess = remaining;

    let mut order: Vec<usize> = (0..adjusted.len()).collect();
    order.sort_by(|a, b| adjusted[*b].utc_end.cmp(&adjusted[*a].utc_end));

    for index in order {
        if remaining == 0 {
            break;
        }
        let segment = &mut adjusted[index];
        let available = (segment.paid_minutes.max(0) - segment.buckets.overtime).max(0);
        let take = available.min(remaining);
        if take == 0 {
            continue;
        }
        convert_to_overtime(&mut segment.buckets, take);
        segment.buckets = segment.buckets.reconciled(segment.paid_minutes);
        remaining -= take;
    }

    WeeklyAllocation {
        weekly_paid_minutes,
        threshold_minutes,
        prior_overtime_minutes,
        overtime_minutes: excess - remaining,
        segments: adjusted,
    }
}

fn convert_to_overtime(buckets: &mut Buckets, minutes: i64) {
    let mut left = minutes;
    for source in [&mut buckets.bank_holiday, &mut buckets.weekend, &mut buckets.normal] {
        let moved = (*source).max(0).min(left);
        *source -= moved;
        left -= moved;
    }
    // Anything not covered by a bucket comes out of normal via reconciliation.
    buckets.overtime += minutes;
}
