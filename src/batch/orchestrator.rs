//! Batch orchestration.
//!
//! One run, one transaction: the batch row, every snapshot and every lock
//! are committed together or not at all.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::batch::breakdown::{adjustment_row, adjustment_snapshot, build_snapshot, initial_snapshot};
use crate::batch::history::PaidHistory;
use crate::batch::selection::{Eligibility, assess_shift};
use crate::batch::{BatchOutcome, BatchRequest, DeferredWeek, SkipReason, SkippedShift};
use crate::calculation::{
    BankHolidayLedger, PayrollWeek, PipelineContext, SegmentId, SegmentOrigin, ShiftCalculation,
    WeekSegment, allocate_weekly_overtime, compute_shift, week_start_for,
};
use crate::config::{MonthBoundaryMode, Settings};
use crate::error::EngineResult;
use crate::models::{
    AuditWarning, BatchStatus, BreakTier, Buckets, DayBreakdown, HolidayCalendar, PayProfile,
    PayrollBatch, PayrollPeriod, Shift, ShiftSnapshot,
};
use crate::storage::{batches, reference, shifts};

/// How far before a window shifts are fetched, so edits and long shifts
/// starting earlier are still seen.
pub const SHIFT_LOOKBACK_DAYS: i64 = 7;

type Window = (DateTime<Utc>, DateTime<Utc>);

/// Reference data and settings for one run.
struct RunContext<'a> {
    settings: &'a Settings,
    period: &'a PayrollPeriod,
    tiers: Vec<BreakTier>,
    calendar: HolidayCalendar,
    profiles: HashMap<i64, PayProfile>,
}

impl RunContext<'_> {
    fn period_window(&self) -> Option<Window> {
        match self.settings.month_boundary_mode {
            MonthBoundaryMode::Midnight => Some((self.period.start_utc, self.period.end_utc)),
            MonthBoundaryMode::EndOfShift => None,
        }
    }

    /// Midnight mode leaves minutes past period end to the next period's run.
    fn runs_past_period(&self, clock_out: DateTime<Utc>) -> bool {
        self.settings.month_boundary_mode == MonthBoundaryMode::Midnight
            && clock_out > self.period.end_utc
    }

    /// Local dates of every week touching the period.
    fn week_range(&self) -> (NaiveDate, NaiveDate) {
        let week_start = self.settings.week_start_day;
        let from = week_start_for(self.period.first_day, week_start);
        let to = week_start_for(self.period.last_day, week_start) + Duration::days(6);
        (from, to)
    }

    fn pipeline(&self, window: Option<Window>) -> PipelineContext<'_> {
        PipelineContext {
            settings: self.settings,
            tiers: &self.tiers,
            calendar: &self.calendar,
            window,
        }
    }
}

/// Overtime placed by one run.
#[derive(Debug, Default)]
struct OvertimePlan {
    /// Final buckets of included segments that took overtime.
    included: HashMap<SegmentId, Buckets>,
    /// Adjustments to days earlier batches paid.
    adjustments: Vec<ShiftSnapshot>,
    /// Weeks left for the next period's run.
    deferred: Vec<DeferredWeek>,
}

/// Runs payroll for one period.
///
/// The period string is validated before anything touches the database.
/// Every write happens inside a single transaction that is rolled back on
/// any error, leaving no batch, snapshot or lock behind.
pub async fn run_batch(
    pool: &SqlitePool,
    settings: &Settings,
    request: &BatchRequest,
) -> EngineResult<BatchOutcome> {
    let period = PayrollPeriod::parse(&request.period, settings.timezone)?;
    info!(period = %period.label(), run_by = %request.run_by, "Starting payroll batch");

    let mut tx = pool.begin().await?;
    let result = execute(&mut tx, settings, &period, request).await;
    match result {
        Ok(outcome) => {
            tx.commit().await?;
            info!(
                batch_id = %outcome.batch.id,
                period = %period.label(),
                included = outcome.included_count(),
                skipped = outcome.skipped_count(),
                adjustments = outcome.adjustments.len(),
                deferred_weeks = outcome.deferred_weeks.len(),
                "Payroll batch committed"
            );
            Ok(outcome)
        }
        Err(err) => {
            warn!(error = %err, period = %period.label(), "Payroll batch failed, rolling back");
            if let Err(rollback_err) = tx.rollback().await {
                error!(
                    error = %err,
                    rollback_error = %rollback_err,
                    "Rollback failed after payroll batch error"
                );
            }
            Err(err)
        }
    }
}

async fn execute(
    conn: &mut SqliteConnection,
    settings: &Settings,
    period: &PayrollPeriod,
    request: &BatchRequest,
) -> EngineResult<BatchOutcome> {
    let run_at = Utc::now();
    let mut batch = PayrollBatch {
        id: Uuid::new_v4(),
        period_start: period.first_day,
        period_end: period.last_day,
        run_at,
        run_by: request.run_by.clone(),
        status: BatchStatus::Processing,
        note: request.note.clone(),
    };
    batches::insert_batch(conn, &batch).await?;

    let ctx = RunContext {
        settings,
        period,
        tiers: reference::load_break_tiers(conn).await?,
        calendar: reference::load_holiday_calendar(conn).await?,
        profiles: reference::load_pay_profiles(conn).await?,
    };

    let mut skipped = Vec::new();
    let mut warnings = Vec::new();
    let eligible = select_shifts(conn, &ctx, &mut skipped).await?;

    let mut history = load_history(conn, &ctx).await?;
    let eligible_ids: HashSet<i64> = eligible.iter().map(|(shift, _, _)| shift.id).collect();
    history.supersede_period(&eligible_ids, period.first_day);

    let mut ledger = BankHolidayLedger::new();
    history.seed_ledger(&mut ledger, &ctx.calendar);

    // Initial snapshots carry overtime = 0
    let mut warned_profiles = HashSet::new();
    let mut calculations = Vec::with_capacity(eligible.len());
    for (shift, clock_in, clock_out) in eligible {
        let profile = ctx.profiles.get(&shift.employee_id);
        if profile.is_none() && warned_profiles.insert(shift.employee_id) {
            warn!(employee_id = shift.employee_id, "No pay profile, overtime disabled");
            warnings.push(AuditWarning::missing_pay_profile(shift.employee_id));
        }

        let calc = compute_shift(
            &shift,
            clock_in,
            clock_out,
            profile,
            &ctx.pipeline(ctx.period_window()),
            &mut ledger,
        );
        warnings.extend(calc.warnings.iter().cloned());

        if calc.paid_minutes <= 0 {
            debug!(shift_id = shift.id, "Shift has no payable minutes");
            skipped.push(SkippedShift {
                shift_id: shift.id,
                employee_id: shift.employee_id,
                reason: SkipReason::NoPayableMinutes,
            });
            continue;
        }

        debug!(
            shift_id = calc.shift_id,
            worked = calc.worked_minutes,
            paid = calc.paid_minutes,
            segments = calc.segments.len(),
            "Shift calculated"
        );
        batches::insert_snapshot(conn, &initial_snapshot(batch.id, &calc)).await?;
        calculations.push(calc);
    }

    let included_days: HashSet<(i64, NaiveDate)> = calculations
        .iter()
        .flat_map(|calc| calc.segments.iter().map(move |segment| (calc.shift_id, segment.date())))
        .collect();
    history.supersede_days(&included_days);

    let plan = allocate_overtime(&ctx, batch.id, &calculations, &history);

    let mut snapshots = Vec::with_capacity(calculations.len());
    for calc in &calculations {
        let segment_buckets: Vec<Buckets> = (0..calc.segments.len())
            .map(|index| {
                plan.included
                    .get(&SegmentId {
                        shift_id: calc.shift_id,
                        index,
                    })
                    .copied()
                    .unwrap_or(calc.segments[index].buckets)
            })
            .collect();
        let snapshot = build_snapshot(batch.id, calc, &segment_buckets);
        if snapshot.overtime_minutes > 0 {
            batches::update_snapshot_buckets(conn, &snapshot).await?;
        }
        snapshots.push(snapshot);
    }

    for adjustment in &plan.adjustments {
        debug!(
            shift_id = adjustment.shift_id,
            overtime = adjustment.overtime_minutes,
            "Overtime adjustment for earlier-paid shift"
        );
        batches::insert_snapshot(conn, adjustment).await?;
    }

    let mut awaiting_next_period = Vec::new();
    for calc in &calculations {
        if ctx.runs_past_period(calc.clock_out) {
            awaiting_next_period.push(calc.shift_id);
        }
        let locked = shifts::lock_shift(conn, calc.shift_id, batch.id, &request.run_by, run_at).await?;
        if !locked {
            debug!(shift_id = calc.shift_id, "Shift already locked, leaving lock owner unchanged");
        }
    }

    batches::set_batch_status(conn, batch.id, BatchStatus::Completed).await?;
    batch.status = BatchStatus::Completed;

    Ok(BatchOutcome {
        batch,
        snapshots,
        adjustments: plan.adjustments,
        skipped,
        deferred_weeks: plan.deferred,
        awaiting_next_period,
        warnings,
    })
}

/// Eligible shifts with their effective punches, in clock-in order.
async fn select_shifts(
    conn: &mut SqliteConnection,
    ctx: &RunContext<'_>,
    skipped: &mut Vec<SkippedShift>,
) -> EngineResult<Vec<(Shift, DateTime<Utc>, DateTime<Utc>)>> {
    let from = ctx.period.start_utc - Duration::days(SHIFT_LOOKBACK_DAYS);
    let to = ctx.period.end_utc;
    let candidates = shifts::list_shifts_clocked_in_between(conn, from, to).await?;
    let edits = shifts::edits_for_shifts_clocked_in_between(conn, from, to).await?;

    let mut eligible = Vec::new();
    for shift in candidates {
        let times = shift.effective_times(edits.get(&shift.id).map(Vec::as_slice).unwrap_or(&[]));
        let verdict = assess_shift(&shift, times, ctx.period, ctx.settings.month_boundary_mode);
        let verdict = match verdict {
            Eligibility::Skip(SkipReason::AlreadyLocked { batch_id }) => {
                carried_over(conn, ctx, &shift, times.clock_in, times.clock_out, batch_id)
                    .await?
                    .unwrap_or(verdict)
            }
            other => other,
        };

        match verdict {
            Eligibility::Include { clock_in, clock_out } => eligible.push((shift, clock_in, clock_out)),
            Eligibility::Skip(reason) => {
                debug!(shift_id = shift.id, %reason, "Shift skipped");
                skipped.push(SkippedShift {
                    shift_id: shift.id,
                    employee_id: shift.employee_id,
                    reason,
                });
            }
            Eligibility::Ignore => {}
        }
    }

    eligible.sort_by_key(|(shift, clock_in, _)| (*clock_in, shift.id));
    Ok(eligible)
}

/// Verdict for a locked shift that started before this period and runs into it.
///
/// In midnight mode such a shift is locked by the previous period's batch
/// with only its earlier minutes paid; this period pays the rest once.
async fn carried_over(
    conn: &mut SqliteConnection,
    ctx: &RunContext<'_>,
    shift: &Shift,
    clock_in: DateTime<Utc>,
    clock_out: Option<DateTime<Utc>>,
    lock_batch_id: Uuid,
) -> EngineResult<Option<Eligibility>> {
    if ctx.settings.month_boundary_mode != MonthBoundaryMode::Midnight {
        return Ok(None);
    }
    let Some(clock_out) = clock_out else {
        return Ok(None);
    };
    if clock_in >= ctx.period.start_utc || clock_out <= ctx.period.start_utc {
        return Ok(None);
    }

    let lock_batch = batches::get_batch(conn, lock_batch_id).await?;
    if !lock_batch.is_some_and(|b| b.period_start < ctx.period.first_day) {
        return Ok(None);
    }

    let verdict = match batches::snapshot_batch_for_period(conn, shift.id, ctx.period.first_day).await? {
        Some(batch_id) => Eligibility::Skip(SkipReason::AlreadySnapshotted { batch_id }),
        None => {
            debug!(shift_id = shift.id, %lock_batch_id, "Shift carried over from previous period");
            Eligibility::Include { clock_in, clock_out }
        }
    };
    Ok(Some(verdict))
}

/// Days earlier completed batches paid in the weeks touching the period.
async fn load_history(conn: &mut SqliteConnection, ctx: &RunContext<'_>) -> EngineResult<PaidHistory> {
    let (from, to) = ctx.week_range();
    let snapshots = batches::list_completed_snapshots_overlapping(
        conn,
        from - Duration::days(SHIFT_LOOKBACK_DAYS),
        to,
    )
    .await?;
    let history = PaidHistory::from_snapshots(&snapshots, from, to);
    debug!(%from, %to, paid_days = history.len(), "Loaded paid history");
    Ok(history)
}

/// Allocates overtime for every complete employee-week touching the period.
///
/// Weeks come from this run's segments and from days earlier batches paid,
/// so a week deferred by the previous period is finalized here even when
/// this period adds nothing to it. Overtime landing on an earlier-paid day
/// becomes an adjustment snapshot in this batch.
fn allocate_overtime(
    ctx: &RunContext<'_>,
    batch_id: Uuid,
    calculations: &[ShiftCalculation],
    history: &PaidHistory,
) -> OvertimePlan {
    let settings = ctx.settings;
    let mut weeks: BTreeMap<(i64, NaiveDate), Vec<WeekSegment>> = BTreeMap::new();

    for calc in calculations {
        for (index, segment) in calc.segments.iter().enumerate() {
            let week_start = week_start_for(segment.date(), settings.week_start_day);
            let id = SegmentId {
                shift_id: calc.shift_id,
                index,
            };
            weeks
                .entry((calc.employee_id, week_start))
                .or_default()
                .push(segment.week_segment(id));
        }
    }
    for key in history.employee_weeks(settings) {
        weeks.entry(key).or_default();
    }

    let mut plan = OvertimePlan::default();
    let mut adjustments: BTreeMap<i64, (i64, Vec<DayBreakdown>)> = BTreeMap::new();

    for ((employee_id, week_start), mut segments) in weeks {
        let week = PayrollWeek::containing(week_start, settings.week_start_day, settings.timezone);
        if week.end_utc > ctx.period.end_utc {
            debug!(employee_id, %week_start, "Week extends past period end, overtime deferred");
            plan.deferred.push(DeferredWeek {
                employee_id,
                week_start,
            });
            continue;
        }

        let threshold = ctx
            .profiles
            .get(&employee_id)
            .map(PayProfile::weekly_threshold_minutes)
            .unwrap_or(0);
        if threshold <= 0 {
            continue;
        }

        segments.extend(history.week_segments(employee_id, &week));
        let allocation = allocate_weekly_overtime(&segments, threshold);
        if allocation.overtime_minutes == 0 {
            continue;
        }
        debug!(
            employee_id,
            %week_start,
            weekly_paid = allocation.weekly_paid_minutes,
            threshold,
            prior_overtime = allocation.prior_overtime_minutes,
            overtime = allocation.overtime_minutes,
            "Weekly overtime allocated"
        );

        for (before, after) in segments.iter().zip(&allocation.segments) {
            if after.buckets.overtime <= before.buckets.overtime {
                continue;
            }
            match after.origin {
                SegmentOrigin::Included(id) => {
                    plan.included.insert(id, after.buckets);
                }
                SegmentOrigin::Paid { shift_id, date } => {
                    if let Some(day) = history.day(shift_id, date) {
                        adjustments
                            .entry(shift_id)
                            .or_insert_with(|| (employee_id, Vec::new()))
                            .1
                            .push(adjustment_row(&day.row, before.buckets, after.buckets));
                    }
                }
            }
        }
    }

    plan.adjustments = adjustments
        .into_iter()
        .map(|(shift_id, (employee_id, days))| adjustment_snapshot(batch_id, shift_id, employee_id, days))
        .collect();
    plan
}
