//! Pay profiles, break tiers and the bank-holiday calendar.
//!
//! These tables are owned by the contract and settings surfaces; the engine
//! reads them once per batch. The write helpers exist for those surfaces
//! and for seeding.

use std::collections::HashMap;

use sqlx::SqliteConnection;

use crate::error::EngineResult;
use crate::models::{BankHoliday, BreakTier, HolidayCalendar, PayProfile};
use crate::storage::rows::{BankHolidayRow, BreakTierRow, PayProfileRow};

/// Inserts or replaces an employee's pay profile.
pub async fn upsert_pay_profile(conn: &mut SqliteConnection, profile: &PayProfile) -> EngineResult<()> {
    sqlx::query(
        "INSERT INTO pay_profiles (employee_id, contract_hours_per_week, break_minutes_default, \
             break_minutes_day, break_minutes_night, break_is_paid, min_hours_for_break, night_start, night_end) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) \
         ON CONFLICT (employee_id) DO UPDATE SET \
             contract_hours_per_week = excluded.contract_hours_per_week, \
             break_minutes_default = excluded.break_minutes_default, \
             break_minutes_day = excluded.break_minutes_day, \
             break_minutes_night = excluded.break_minutes_night, \
             break_is_paid = excluded.break_is_paid, \
             min_hours_for_break = excluded.min_hours_for_break, \
             night_start = excluded.night_start, \
             night_end = excluded.night_end",
    )
    .bind(profile.employee_id)
    .bind(profile.contract_hours_per_week.to_string())
    .bind(profile.break_minutes_default)
    .bind(profile.break_minutes_day)
    .bind(profile.break_minutes_night)
    .bind(profile.break_is_paid)
    .bind(profile.min_hours_for_break.to_string())
    .bind(&profile.night_start)
    .bind(&profile.night_end)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// All pay profiles keyed by employee id.
pub async fn load_pay_profiles(conn: &mut SqliteConnection) -> EngineResult<HashMap<i64, PayProfile>> {
    let rows = sqlx::query_as::<_, PayProfileRow>(
        "SELECT employee_id, contract_hours_per_week, break_minutes_default, break_minutes_day, \
             break_minutes_night, break_is_paid, min_hours_for_break, night_start, night_end \
         FROM pay_profiles",
    )
    .fetch_all(&mut *conn)
    .await?;

    rows.into_iter()
        .map(|row| PayProfile::try_from(row).map(|p| (p.employee_id, p)))
        .collect()
}

/// Replaces the break tier table.
pub async fn replace_break_tiers(conn: &mut SqliteConnection, tiers: &[BreakTier]) -> EngineResult<()> {
    sqlx::query("DELETE FROM break_tiers")
        .execute(&mut *conn)
        .await?;

    for tier in tiers {
        sqlx::query(
            "INSERT INTO break_tiers (min_worked_minutes, break_minutes) VALUES (?, ?) \
             ON CONFLICT (min_worked_minutes) DO UPDATE SET break_minutes = excluded.break_minutes",
        )
        .bind(tier.min_worked_minutes)
        .bind(tier.break_minutes)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// The break tier table, ordered by threshold.
pub async fn load_break_tiers(conn: &mut SqliteConnection) -> EngineResult<Vec<BreakTier>> {
    let rows = sqlx::query_as::<_, BreakTierRow>(
        "SELECT min_worked_minutes, break_minutes FROM break_tiers ORDER BY min_worked_minutes",
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows.into_iter().map(BreakTier::from).collect())
}

/// Adds or replaces a bank holiday.
pub async fn upsert_bank_holiday(conn: &mut SqliteConnection, holiday: &BankHoliday) -> EngineResult<()> {
    sqlx::query(
        "INSERT INTO bank_holidays (date, name, paid_hours_cap) VALUES (?, ?, ?) \
         ON CONFLICT (date) DO UPDATE SET name = excluded.name, paid_hours_cap = excluded.paid_hours_cap",
    )
    .bind(holiday.date)
    .bind(&holiday.name)
    .bind(holiday.paid_hours_cap.map(|cap| cap.to_string()))
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// The whole bank-holiday calendar.
pub async fn load_holiday_calendar(conn: &mut SqliteConnection) -> EngineResult<HolidayCalendar> {
    let rows = sqlx::query_as::<_, BankHolidayRow>(
        "SELECT date, name, paid_hours_cap FROM bank_holidays ORDER BY date",
    )
    .fetch_all(&mut *conn)
    .await?;

    let holidays = rows
        .into_iter()
        .map(BankHoliday::try_from)
        .collect::<EngineResult<Vec<_>>>()?;
    Ok(HolidayCalendar::new(holidays))
}
