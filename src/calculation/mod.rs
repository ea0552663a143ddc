//! Calculation logic for the time bucketing engine.
//!
//! Leaf to root: punch rounding, local-day segmentation, break calculation,
//! non-stacking bucket classification, the per-shift pipeline that chains
//! them, and the weekly overtime allocator that runs over a whole
//! employee-week.

mod break_calculation;
mod bucket_classification;
mod day_segmentation;
mod rounding;
mod shift_pipeline;
mod weekly_overtime;

pub use break_calculation::{
    BreakContext, BreakOutcome, BreakSource, calculate_break, is_night_shift, lookup_break_tier,
    night_overlap_minutes,
};
pub use bucket_classification::{BankHolidayLedger, classify_segment};
pub use day_segmentation::{
    DaySegment, local_midnight_utc, local_to_utc, segment_by_local_day, total_minutes,
};
pub use rounding::round_timestamp;
pub use shift_pipeline::{
    ClassifiedSegment, PaidSegment, PipelineContext, ShiftCalculation, allocate_proportionally,
    compute_shift,
};
pub use weekly_overtime::{
    PayrollWeek, SegmentId, SegmentOrigin, WeekSegment, WeeklyAllocation, allocate_weekly_overtime,
    week_start_for,
};
