//! Local-day segmentation of UTC intervals.
//!
//! This is the only place that knows where local midnights fall. Every
//! downstream bucket is keyed by a segment's local date, so shifts that
//! cross midnight, week boundaries or daylight-saving transitions are all
//! handled here.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono::offset::LocalResult;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// The portion of an interval falling within one local calendar day.
///
/// `dst_delta_minutes` is `local_minutes - utc_minutes`: +60 on a day the
/// clocks go forward by an hour inside the segment, -60 when they go back,
/// zero otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySegment {
    /// Local calendar date of this segment.
    pub date: NaiveDate,
    /// Segment start in UTC.
    pub utc_start: DateTime<Utc>,
    /// Segment end in UTC.
    pub utc_end: DateTime<Utc>,
    /// Segment start in local wall-clock time.
    pub local_start: NaiveDateTime,
    /// Segment end in local wall-clock time.
    pub local_end: NaiveDateTime,
    /// Elapsed minutes.
    pub utc_minutes: i64,
    /// Wall-clock minutes.
    pub local_minutes: i64,
    /// Wall-clock minus elapsed minutes.
    pub dst_delta_minutes: i64,
}

/// Returns the UTC instant at which a local date begins.
///
/// When local midnight is ambiguous the earlier instant is used; when it is
/// skipped by a forward transition the first valid local instant is used.
///
/// # Example
///
/// ```
/// use timebucket_engine::calculation::local_midnight_utc;
/// use chrono::{NaiveDate, TimeZone, Utc};
///
/// let date = NaiveDate::from_ymd_opt(2026, 7, 1).unwrap();
/// assert_eq!(
///     local_midnight_utc(chrono_tz::Europe::London, date),
///     Utc.with_ymd_and_hms(2026, 6, 30, 23, 0, 0).unwrap()
/// );
/// ```
pub fn local_midnight_utc(tz: Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&midnight) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => (1..=24 * 60)
            .find_map(|m| {
                tz.from_local_datetime(&(midnight + Duration::minutes(m)))
                    .earliest()
            })
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&midnight)),
    }
}

/// Converts a local wall-clock time to UTC, resolving gaps and overlaps the
/// same way as [`local_midnight_utc`].
pub fn local_to_utc(tz: Tz, local: NaiveDateTime) -> DateTime<Utc> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => (1..=24 * 60)
            .find_map(|m| tz.from_local_datetime(&(local + Duration::minutes(m))).earliest())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&local)),
    }
}

/// Splits `[start, end)` into one segment per local calendar day.
///
/// The interval is first clipped to `window` when one is given; an empty or
/// inverted result yields no segments. Minute counts are taken from whole
/// minutes elapsed since the clipped start, so the segments' `utc_minutes`
/// always sum to the clipped interval's whole minutes. Slivers shorter
/// than a minute that round to zero are dropped.
///
/// # Example
///
/// ```
/// use timebucket_engine::calculation::segment_by_local_day;
/// use chrono::{NaiveDate, TimeZone, Utc};
///
/// // Spring-forward night in London: clocks jump 01:00 -> 02:00 on 2026-03-29.
/// let start = Utc.with_ymd_and_hms(2026, 3, 28, 22, 0, 0).unwrap();
/// let end = Utc.with_ymd_and_hms(2026, 3, 29, 6, 0, 0).unwrap();
///
/// let segments = segment_by_local_day(start, end, None, chrono_tz::Europe::London);
/// assert_eq!(segments.len(), 2);
/// assert_eq!(segments[0].date, NaiveDate::from_ymd_opt(2026, 3, 28).unwrap());
/// assert_eq!(segments[0].dst_delta_minutes, 0);
/// assert_eq!(segments[1].utc_minutes, 360);
/// assert_eq!(segments[1].local_minutes, 420);
/// assert_eq!(segments[1].dst_delta_minutes, 60);
/// ```
pub fn segment_by_local_day(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    window: Option<(DateTime<Utc>, DateTime<Utc>)>,
    tz: Tz,
) -> Vec<DaySegment> {
    let (start, end) = match window {
        Some((window_start, window_end)) => (start.max(window_start), end.min(window_end)),
        None => (start, end),
    };

    let mut segments = Vec::new();
    if start >= end {
        return segments;
    }

    let elapsed_minutes = |instant: DateTime<Utc>| (instant - start).num_minutes();
    let mut cursor = start;

    while cursor < end {
        let local_cursor = cursor.with_timezone(&tz).naive_local();
        let date = local_cursor.date();

        let next_midnight = date
            .succ_opt()
            .map(|next| local_midnight_utc(tz, next))
            .filter(|next| *next > cursor)
            .unwrap_or(end);
        let segment_end = next_midnight.min(end);

        let utc_minutes = elapsed_minutes(segment_end) - elapsed_minutes(cursor);
        let local_end = segment_end.with_timezone(&tz).naive_local();
        let delta_seconds =
            (local_end - local_cursor).num_seconds() - (segment_end - cursor).num_seconds();
        let dst_delta_minutes = delta_seconds / 60;

        if utc_minutes > 0 {
            segments.push(DaySegment {
                date,
                utc_start: cursor,
                utc_end: segment_end,
                local_start: local_cursor,
                local_end,
                utc_minutes,
                local_minutes: utc_minutes + dst_delta_minutes,
                dst_delta_minutes,
            });
        }

        cursor = segment_end;
    }

    segments
}

/// Total elapsed minutes across segments.
pub fn total_minutes(segments: &[DaySegment]) -> i64 {
    segments.iter().map(|s| s.utc_minutes).sum()
}
