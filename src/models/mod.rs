//! Core data models for the time bucketing engine.
//!
//! This module contains all the domain models used throughout the engine.

mod audit;
mod batch;
mod calendar;
mod pay_profile;
mod shift;
mod snapshot;

pub use audit::AuditWarning;
pub use batch::{BatchStatus, PayrollBatch, PayrollPeriod};
pub use calendar::{BankHoliday, HolidayCalendar};
pub use pay_profile::{BreakTier, NightWindow, PayProfile, hours_to_minutes};
pub use shift::{EffectiveTimes, Shift, ShiftEdit};
pub use snapshot::{Bucket, Buckets, DayBreakdown, ShiftSnapshot, SnapshotKind};
