//! Attendance writer: resolves a scanned payload to an employee and records
//! presence at most once per calendar day.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::info;

use crate::{model::employee::Employee, store};

/// What a single scan did. Duplicate detection rides on the storage-layer
/// unique constraint, not on a read before the insert, so two rapid scans
/// of the same badge cannot both get a row in.
#[derive(Debug)]
pub enum ScanOutcome {
    Recorded(Employee),
    AlreadyPresent(Employee),
    UnknownCode,
}

pub async fn record_scan(
    pool: &SqlitePool,
    employer_id: i64,
    code: &str,
    now: DateTime<Utc>,
) -> Result<ScanOutcome, sqlx::Error> {
    let Some(employee) = store::employee_by_code(pool, employer_id, code).await? else {
        info!(employer_id, code, "Scan did not match any employee");
        return Ok(ScanOutcome::UnknownCode);
    };

    let date = now.date_naive();
    match store::insert_attendance(pool, &employee, date, now).await {
        Ok(()) => {
            info!(employee_id = employee.id, %date, "Attendance recorded");
            Ok(ScanOutcome::Recorded(employee))
        }
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            info!(employee_id = employee.id, %date, "Already marked present");
            Ok(ScanOutcome::AlreadyPresent(employee))
        }
        Err(e) => Err(e),
    }
}
