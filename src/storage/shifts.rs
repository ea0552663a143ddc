//! Shift, manager edit and lock persistence.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{Shift, ShiftEdit};
use crate::storage::rows::{ShiftEditRow, ShiftRow};

const SHIFT_COLUMNS: &str = "id, employee_id, clock_in_utc, clock_out_utc, break_override_minutes, \
     approved, locked_at, locked_by, lock_batch_id";

/// Fields captured when a shift is recorded.
#[derive(Debug, Clone)]
pub struct NewShift {
    /// The employee who worked it.
    pub employee_id: i64,
    /// Captured clock-in.
    pub clock_in_utc: DateTime<Utc>,
    /// Captured clock-out, if closed.
    pub clock_out_utc: Option<DateTime<Utc>>,
    /// Manager break override.
    pub break_override_minutes: Option<i64>,
    /// Approval state.
    pub approved: bool,
}

/// Inserts a shift and returns its id.
pub async fn insert_shift(conn: &mut SqliteConnection, shift: &NewShift) -> EngineResult<i64> {
    let result = sqlx::query(
        "INSERT INTO shifts (employee_id, clock_in_utc, clock_out_utc, break_override_minutes, approved) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(shift.employee_id)
    .bind(shift.clock_in_utc)
    .bind(shift.clock_out_utc)
    .bind(shift.break_override_minutes)
    .bind(shift.approved)
    .execute(&mut *conn)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Fetches one shift.
pub async fn get_shift(conn: &mut SqliteConnection, shift_id: i64) -> EngineResult<Option<Shift>> {
    let row = sqlx::query_as::<_, ShiftRow>(&format!(
        "SELECT {} FROM shifts WHERE id = ?",
        SHIFT_COLUMNS
    ))
    .bind(shift_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row.map(Shift::from))
}

/// Shifts whose captured clock-in lies in `[from, to)`, ordered by clock-in.
pub async fn list_shifts_clocked_in_between(
    conn: &mut SqliteConnection,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> EngineResult<Vec<Shift>> {
    let rows = sqlx::query_as::<_, ShiftRow>(&format!(
        "SELECT {} FROM shifts WHERE clock_in_utc >= ? AND clock_in_utc < ? ORDER BY clock_in_utc, id",
        SHIFT_COLUMNS
    ))
    .bind(from)
    .bind(to)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows.into_iter().map(Shift::from).collect())
}

/// One employee's shifts whose captured clock-in lies in `[from, to)`.
pub async fn list_employee_shifts_clocked_in_between(
    conn: &mut SqliteConnection,
    employee_id: i64,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> EngineResult<Vec<Shift>> {
    let rows = sqlx::query_as::<_, ShiftRow>(&format!(
        "SELECT {} FROM shifts \
         WHERE employee_id = ? AND clock_in_utc >= ? AND clock_in_utc < ? \
         ORDER BY clock_in_utc, id",
        SHIFT_COLUMNS
    ))
    .bind(employee_id)
    .bind(from)
    .bind(to)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows.into_iter().map(Shift::from).collect())
}

/// Records a manager correction. The captured punch is left untouched.
pub async fn record_edit(conn: &mut SqliteConnection, edit: &ShiftEdit) -> EngineResult<()> {
    sqlx::query(
        "INSERT INTO shift_edits (shift_id, clock_in_utc, clock_out_utc, edited_by, edited_at) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(edit.shift_id)
    .bind(edit.clock_in_utc)
    .bind(edit.clock_out_utc)
    .bind(&edit.edited_by)
    .bind(edit.edited_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Edits for every shift whose captured clock-in lies in `[from, to)`, grouped by shift.
pub async fn edits_for_shifts_clocked_in_between(
    conn: &mut SqliteConnection,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> EngineResult<HashMap<i64, Vec<ShiftEdit>>> {
    let rows = sqlx::query_as::<_, ShiftEditRow>(
        "SELECT e.shift_id, e.clock_in_utc, e.clock_out_utc, e.edited_by, e.edited_at \
         FROM shift_edits e JOIN shifts s ON s.id = e.shift_id \
         WHERE s.clock_in_utc >= ? AND s.clock_in_utc < ? \
         ORDER BY e.edited_at, e.id",
    )
    .bind(from)
    .bind(to)
    .fetch_all(&mut *conn)
    .await?;

    let mut grouped: HashMap<i64, Vec<ShiftEdit>> = HashMap::new();
    for row in rows {
        grouped.entry(row.shift_id).or_default().push(row.into());
    }
    Ok(grouped)
}

/// Locks a shift for a batch unless some batch already owns it.
///
/// Returns true if this call set the lock.
pub async fn lock_shift(
    conn: &mut SqliteConnection,
    shift_id: i64,
    batch_id: Uuid,
    locked_by: &str,
    locked_at: DateTime<Utc>,
) -> EngineResult<bool> {
    let result = sqlx::query(
        "UPDATE shifts SET locked_at = ?, locked_by = ?, lock_batch_id = ? \
         WHERE id = ? AND lock_batch_id IS NULL",
    )
    .bind(locked_at)
    .bind(locked_by)
    .bind(batch_id)
    .bind(shift_id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Clears a shift's lock so a later batch may include it again.
///
/// Snapshots written by the previous owner are kept.
pub async fn unlock_shift(conn: &mut SqliteConnection, shift_id: i64) -> EngineResult<Shift> {
    let shift = get_shift(conn, shift_id)
        .await?
        .ok_or(EngineError::ShiftNotFound { shift_id })?;

    sqlx::query(
        "UPDATE shifts SET locked_at = NULL, locked_by = NULL, lock_batch_id = NULL WHERE id = ?",
    )
    .bind(shift_id)
    .execute(&mut *conn)
    .await?;

    match shift.lock_batch_id {
        Some(batch_id) => info!(shift_id, %batch_id, "Shift unlocked"),
        None => debug!(shift_id, "Unlock requested for a shift that was not locked"),
    }

    Ok(Shift {
        locked_at: None,
        locked_by: None,
        lock_batch_id: None,
        ..shift
    })
}
