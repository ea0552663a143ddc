//! Per-shift calculation pipeline.
//!
//! Effective times → rounding → day segmentation → break calculation →
//! clipping to the payroll window → per-day break and paid allocation →
//! bucket classification. The result is an immutable list of classified
//! segments that the weekly allocator later reads.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::calculation::{
    BankHolidayLedger, BreakContext, BreakOutcome, BreakSource, DaySegment, SegmentId,
    SegmentOrigin, WeekSegment, calculate_break, classify_segment, round_timestamp,
    segment_by_local_day, total_minutes,
};
use crate::config::Settings;
use crate::models::{
    AuditWarning, BreakTier, Buckets, DayBreakdown, HolidayCalendar, NightWindow, PayProfile,
    Shift,
};

/// Splits `total` across `weights` proportionally.
///
/// Each share is floored and the remainder lands on the last entry, so the
/// shares always sum to `total`. When `total` does not exceed the weight
/// sum no share exceeds its weight: any excess on the last entry is handed
/// back to earlier entries that still have room.
///
/// # Example
///
/// ```
/// use timebucket_engine::calculation::allocate_proportionally;
///
/// assert_eq!(allocate_proportionally(30, &[120, 240, 120]), vec![7, 15, 8]);
/// assert_eq!(allocate_proportionally(0, &[60, 60]), vec![0, 0]);
/// ```
pub fn allocate_proportionally(total: i64, weights: &[i64]) -> Vec<i64> {
    if weights.is_empty() {
        return Vec::new();
    }

    let weight_sum: i64 = weights.iter().map(|w| (*w).max(0)).sum();
    let last = weights.len() - 1;
    let mut shares = vec![0; weights.len()];

    if weight_sum == 0 {
        shares[last] = total;
        return shares;
    }

    let mut assigned = 0;
    for (share, weight) in shares.iter_mut().zip(weights).take(last) {
        *share = (i128::from(total) * i128::from((*weight).max(0)) / i128::from(weight_sum)) as i64;
        assigned += *share;
    }
    shares[last] = total - assigned;

    if total <= weight_sum {
        let mut excess = shares[last] - weights[last].max(0);
        for index in (0..last).rev() {
            if excess <= 0 {
                break;
            }
            let room = weights[index].max(0) - shares[index];
            let moved = room.min(excess);
            shares[index] += moved;
            excess -= moved;
        }
        shares[last] = total - shares[..last].iter().sum::<i64>();
    }

    shares
}

/// A day segment with its share of the shift's break and paid minutes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaidSegment {
    /// Underlying local-day segment.
    pub segment: DaySegment,
    /// Elapsed minutes worked in this segment.
    pub worked_minutes: i64,
    /// Break minutes deducted from this segment.
    pub break_deducted: i64,
    /// Paid break minutes added back to this segment.
    pub break_added: i64,
    /// Paid minutes; `worked - deducted + added`.
    pub paid_minutes: i64,
}

/// A paid segment after non-stacking classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedSegment {
    /// Allocation of the segment.
    pub paid: PaidSegment,
    /// Buckets before weekly overtime.
    pub buckets: Buckets,
}

impl ClassifiedSegment {
    /// Local date of the segment.
    pub fn date(&self) -> NaiveDate {
        self.paid.segment.date
    }

    /// Builds the allocator input for this segment.
    pub fn week_segment(&self, id: SegmentId) -> WeekSegment {
        WeekSegment {
            origin: SegmentOrigin::Included(id),
            utc_end: self.paid.segment.utc_end,
            paid_minutes: self.paid.paid_minutes,
            buckets: self.buckets,
        }
    }

    /// Audit row for the segment with the given final buckets.
    pub fn breakdown(&self, buckets: Buckets) -> DayBreakdown {
        let buckets = buckets.reconciled(self.paid.paid_minutes);
        DayBreakdown {
            date: self.date(),
            ends_at: self.paid.segment.utc_end,
            worked: self.paid.worked_minutes,
            break_deducted: self.paid.break_deducted,
            break_added: self.paid.break_added,
            paid: self.paid.paid_minutes,
            normal: buckets.normal,
            weekend: buckets.weekend,
            bank_holiday: buckets.bank_holiday,
            overtime: buckets.overtime,
        }
    }
}

/// Everything computed for one shift before weekly overtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftCalculation {
    /// Source shift id.
    pub shift_id: i64,
    /// Employee the shift belongs to.
    pub employee_id: i64,
    /// Clock-in used for calculation (edited, then rounded).
    pub clock_in: DateTime<Utc>,
    /// Clock-out used for calculation (edited, then rounded).
    pub clock_out: DateTime<Utc>,
    /// Break outcome over the whole shift.
    pub full_shift: BreakOutcome,
    /// Worked minutes inside the window.
    pub worked_minutes: i64,
    /// Break minutes inside the window.
    pub break_minutes: i64,
    /// Paid break minutes added back inside the window.
    pub break_added_minutes: i64,
    /// Paid minutes inside the window.
    pub paid_minutes: i64,
    /// Classified local-day segments inside the window.
    pub segments: Vec<ClassifiedSegment>,
    /// Configuration gaps defaulted while computing this shift.
    pub warnings: Vec<AuditWarning>,
}

impl ShiftCalculation {
    /// Sum of the segment buckets before weekly overtime.
    pub fn buckets(&self) -> Buckets {
        let mut total = Buckets::default();
        for segment in &self.segments {
            total += segment.buckets;
        }
        total.reconciled(self.paid_minutes)
    }
}

/// Inputs shared by every shift in a run.
#[derive(Debug, Clone, Copy)]
pub struct PipelineContext<'a> {
    /// Run settings.
    pub settings: &'a Settings,
    /// Break tier table.
    pub tiers: &'a [BreakTier],
    /// Bank-holiday calendar.
    pub calendar: &'a HolidayCalendar,
    /// UTC window to clip minutes to; `None` keeps the whole shift.
    pub window: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

/// Runs one shift through the pipeline.
///
/// `clock_in` and `clock_out` are the effective (post-edit) punches; they are
/// rounded here when rounding is enabled. When a window is given the break
/// is computed on the full shift and then reduced in proportion to the
/// minutes that fall inside the window.
pub fn compute_shift(
    shift: &Shift,
    clock_in: DateTime<Utc>,
    clock_out: DateTime<Utc>,
    profile: Option<&PayProfile>,
    ctx: &PipelineContext<'_>,
    ledger: &mut BankHolidayLedger,
) -> ShiftCalculation {
    let settings = ctx.settings;
    let tz = settings.timezone;
    let (clock_in, clock_out) = match settings.rounding {
        Some(rule) => (
            round_timestamp(clock_in, rule, tz),
            round_timestamp(clock_out, rule, tz),
        ),
        None => (clock_in, clock_out),
    };

    let mut warnings = Vec::new();
    let night_window = match profile {
        Some(p) => p.night_window().unwrap_or_else(|| {
            warnings.push(AuditWarning::malformed_night_window(
                p.employee_id,
                &p.night_start,
                &p.night_end,
            ));
            NightWindow::default()
        }),
        None => NightWindow::default(),
    };

    let full_shift = calculate_break(
        &BreakContext {
            clock_in,
            clock_out,
            override_minutes: shift.break_override_minutes,
            profile,
            night_window,
            night_threshold_percent: settings.night_threshold_percent,
            tz,
        },
        ctx.tiers,
    );
    if full_shift.source == BreakSource::NoTier && full_shift.worked_minutes > 0 {
        warnings.push(AuditWarning::no_break_tier(shift.id, full_shift.worked_minutes));
    }

    let day_segments = segment_by_local_day(clock_in, clock_out, ctx.window, tz);
    let worked_minutes = total_minutes(&day_segments);

    let (break_minutes, break_added_minutes) = if worked_minutes < full_shift.worked_minutes {
        (
            scale(full_shift.deducted_minutes, worked_minutes, full_shift.worked_minutes),
            scale(full_shift.added_back_minutes, worked_minutes, full_shift.worked_minutes),
        )
    } else {
        (full_shift.deducted_minutes, full_shift.added_back_minutes)
    };

    let weights: Vec<i64> = day_segments.iter().map(|s| s.utc_minutes).collect();
    let deducted = allocate_proportionally(break_minutes, &weights);
    let added = allocate_proportionally(break_added_minutes, &weights);

    let segments: Vec<ClassifiedSegment> = day_segments
        .into_iter()
        .zip(deducted.into_iter().zip(added))
        .map(|(segment, (break_deducted, break_added))| {
            let worked = segment.utc_minutes;
            let paid_minutes = (worked - break_deducted + break_added).max(0);
            let buckets = classify_segment(
                shift.employee_id,
                segment.date,
                paid_minutes,
                settings,
                ctx.calendar,
                ledger,
            );
            ClassifiedSegment {
                paid: PaidSegment {
                    segment,
                    worked_minutes: worked,
                    break_deducted,
                    break_added,
                    paid_minutes,
                },
                buckets,
            }
        })
        .collect();

    let paid_minutes = segments.iter().map(|s| s.paid.paid_minutes).sum();

    ShiftCalculation {
        shift_id: shift.id,
        employee_id: shift.employee_id,
        clock_in,
        clock_out,
        full_shift,
        worked_minutes,
        break_minutes,
        break_added_minutes,
        paid_minutes,
        segments,
        warnings,
    }
}

fn scale(minutes: i64, part: i64, whole: i64) -> i64 {
    if whole <= 0 {
        return 0;
    }
    (i128::from(minutes) * i128::from(part) / i128::from(whole)) as i64
}
