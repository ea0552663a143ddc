//! Payable time bucketing engine for hourly staff attendance.
//!
//! This crate turns approved clock-in/clock-out shifts into immutable
//! payroll snapshots. Each shift is rounded, split at local midnight,
//! break-adjusted and classified into non-stacking normal, weekend and
//! bank-holiday buckets. Weekly contract-hours overtime is then allocated
//! from the latest minutes of the week backwards, and the whole monthly
//! run is committed or rolled back as one transaction.

#![warn(missing_docs)]

pub mod api;
pub mod batch;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod storage;
