//! Payroll batch and shift snapshot persistence.

use chrono::NaiveDate;
use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::error::EngineResult;
use crate::models::{BatchStatus, PayrollBatch, ShiftSnapshot, SnapshotKind};
use crate::storage::rows::{PayrollBatchRow, PeriodSnapshotRow, ShiftSnapshotRow};

const BATCH_COLUMNS: &str = "id, period_start, period_end, run_at, run_by, status, note";

const SNAPSHOT_COLUMNS: &str = "batch_id, shift_id, kind, employee_id, worked_minutes, break_minutes, \
     paid_minutes, normal_minutes, weekend_minutes, bank_holiday_minutes, overtime_minutes, day_breakdown";

/// Creates a batch row.
pub async fn insert_batch(conn: &mut SqliteConnection, batch: &PayrollBatch) -> EngineResult<()> {
    sqlx::query(
        "INSERT INTO payroll_batches (id, period_start, period_end, run_at, run_by, status, note) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(batch.id)
    .bind(batch.period_start)
    .bind(batch.period_end)
    .bind(batch.run_at)
    .bind(&batch.run_by)
    .bind(batch.status.as_str())
    .bind(&batch.note)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Moves a batch to a new status; the only mutation a batch row allows.
pub async fn set_batch_status(
    conn: &mut SqliteConnection,
    batch_id: Uuid,
    status: BatchStatus,
) -> EngineResult<()> {
    sqlx::query("UPDATE payroll_batches SET status = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(batch_id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

/// Fetches one batch.
pub async fn get_batch(conn: &mut SqliteConnection, batch_id: Uuid) -> EngineResult<Option<PayrollBatch>> {
    let row = sqlx::query_as::<_, PayrollBatchRow>(&format!(
        "SELECT {} FROM payroll_batches WHERE id = ?",
        BATCH_COLUMNS
    ))
    .bind(batch_id)
    .fetch_optional(&mut *conn)
    .await?;

    row.map(PayrollBatch::try_from).transpose()
}

/// All batches, most recent run first.
pub async fn list_batches(conn: &mut SqliteConnection) -> EngineResult<Vec<PayrollBatch>> {
    let rows = sqlx::query_as::<_, PayrollBatchRow>(&format!(
        "SELECT {} FROM payroll_batches ORDER BY run_at DESC",
        BATCH_COLUMNS
    ))
    .fetch_all(&mut *conn)
    .await?;

    rows.into_iter().map(PayrollBatch::try_from).collect()
}

/// Writes a snapshot row.
pub async fn insert_snapshot(conn: &mut SqliteConnection, snapshot: &ShiftSnapshot) -> EngineResult<()> {
    let day_breakdown = serde_json::to_string(&snapshot.day_breakdown)?;
    sqlx::query(&format!(
        "INSERT INTO shift_snapshots ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        SNAPSHOT_COLUMNS
    ))
    .bind(snapshot.batch_id)
    .bind(snapshot.shift_id)
    .bind(snapshot.kind.as_str())
    .bind(snapshot.employee_id)
    .bind(snapshot.worked_minutes)
    .bind(snapshot.break_minutes)
    .bind(snapshot.paid_minutes)
    .bind(snapshot.normal_minutes)
    .bind(snapshot.weekend_minutes)
    .bind(snapshot.bank_holiday_minutes)
    .bind(snapshot.overtime_minutes)
    .bind(day_breakdown)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Rewrites a snapshot's bucket columns and breakdown inside its own batch run.
pub async fn update_snapshot_buckets(
    conn: &mut SqliteConnection,
    snapshot: &ShiftSnapshot,
) -> EngineResult<()> {
    let day_breakdown = serde_json::to_string(&snapshot.day_breakdown)?;
    sqlx::query(
        "UPDATE shift_snapshots SET normal_minutes = ?, weekend_minutes = ?, bank_holiday_minutes = ?, \
             overtime_minutes = ?, day_breakdown = ? \
         WHERE batch_id = ? AND shift_id = ? AND kind = ?",
    )
    .bind(snapshot.normal_minutes)
    .bind(snapshot.weekend_minutes)
    .bind(snapshot.bank_holiday_minutes)
    .bind(snapshot.overtime_minutes)
    .bind(day_breakdown)
    .bind(snapshot.batch_id)
    .bind(snapshot.shift_id)
    .bind(snapshot.kind.as_str())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Snapshots of a batch, ordered by shift id with calculated rows first.
pub async fn list_snapshots(conn: &mut SqliteConnection, batch_id: Uuid) -> EngineResult<Vec<ShiftSnapshot>> {
    let rows = sqlx::query_as::<_, ShiftSnapshotRow>(&format!(
        "SELECT {} FROM shift_snapshots WHERE batch_id = ? ORDER BY shift_id, kind",
        SNAPSHOT_COLUMNS
    ))
    .bind(batch_id)
    .fetch_all(&mut *conn)
    .await?;

    rows.into_iter().map(ShiftSnapshot::try_from).collect()
}

/// The completed batch for `period_start` that already calculated a shift, if any.
pub async fn snapshot_batch_for_period(
    conn: &mut SqliteConnection,
    shift_id: i64,
    period_start: NaiveDate,
) -> EngineResult<Option<Uuid>> {
    let batch_id = sqlx::query_scalar::<_, Uuid>(
        "SELECT b.id FROM shift_snapshots s JOIN payroll_batches b ON b.id = s.batch_id \
         WHERE s.shift_id = ? AND s.kind = ? AND b.period_start = ? AND b.status = ? \
         ORDER BY b.run_at LIMIT 1",
    )
    .bind(shift_id)
    .bind(SnapshotKind::Calculated.as_str())
    .bind(period_start)
    .bind(BatchStatus::Completed.as_str())
    .fetch_optional(&mut *conn)
    .await?;

    Ok(batch_id)
}

/// A stored snapshot with the period of the batch that wrote it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodSnapshot {
    /// First local date of the owning batch's period.
    pub period_start: NaiveDate,
    /// The snapshot.
    pub snapshot: ShiftSnapshot,
}

/// Snapshots of completed batches whose periods overlap `from..=to`.
///
/// Ordered by batch run time, then shift id, calculated rows first.
pub async fn list_completed_snapshots_overlapping(
    conn: &mut SqliteConnection,
    from: NaiveDate,
    to: NaiveDate,
) -> EngineResult<Vec<PeriodSnapshot>> {
    let rows = sqlx::query_as::<_, PeriodSnapshotRow>(
        "SELECT b.period_start, s.batch_id, s.shift_id, s.kind, s.employee_id, s.worked_minutes, \
             s.break_minutes, s.paid_minutes, s.normal_minutes, s.weekend_minutes, \
             s.bank_holiday_minutes, s.overtime_minutes, s.day_breakdown \
         FROM shift_snapshots s JOIN payroll_batches b ON b.id = s.batch_id \
         WHERE b.status = ? AND b.period_start <= ? AND b.period_end >= ? \
         ORDER BY b.run_at, b.id, s.shift_id, s.kind",
    )
    .bind(BatchStatus::Completed.as_str())
    .bind(to)
    .bind(from)
    .fetch_all(&mut *conn)
    .await?;

    rows.into_iter()
        .map(|row| {
            Ok(PeriodSnapshot {
                period_start: row.period_start,
                snapshot: ShiftSnapshot::try_from(row.snapshot)?,
            })
        })
        .collect()
}
