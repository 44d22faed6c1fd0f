//! Record-store seam. All persistence goes through these queries; handlers
//! and the attendance writer never touch SQL themselves.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;

use crate::model::{
    attendance::HistoryRow,
    employee::Employee,
    employer::Employer,
};

pub async fn employer_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<Employer>, sqlx::Error> {
    sqlx::query_as::<_, Employer>(
        r#"
        SELECT id, username, display_name, pwd_hash
        FROM employers
        WHERE username = ?
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await
}

pub async fn update_employer_password(
    pool: &SqlitePool,
    employer_id: i64,
    pwd_hash: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE employers SET pwd_hash = ? WHERE id = ?")
        .bind(pwd_hash)
        .bind(employer_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn employee_by_code(
    pool: &SqlitePool,
    employer_id: i64,
    qr_code: &str,
) -> Result<Option<Employee>, sqlx::Error> {
    sqlx::query_as::<_, Employee>(
        r#"
        SELECT id, employer_id, name, qr_code
        FROM employees
        WHERE employer_id = ? AND qr_code = ?
        "#,
    )
    .bind(employer_id)
    .bind(qr_code)
    .fetch_optional(pool)
    .await
}

pub async fn list_employees(
    pool: &SqlitePool,
    employer_id: i64,
) -> Result<Vec<Employee>, sqlx::Error> {
    sqlx::query_as::<_, Employee>(
        r#"
        SELECT id, employer_id, name, qr_code
        FROM employees
        WHERE employer_id = ?
        ORDER BY name
        "#,
    )
    .bind(employer_id)
    .fetch_all(pool)
    .await
}

/// Plain insert; `UNIQUE(employee_id, date)` turns a same-day repeat into a
/// unique-violation error the caller maps to a duplicate outcome.
pub async fn insert_attendance(
    pool: &SqlitePool,
    employee: &Employee,
    date: NaiveDate,
    timestamp: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO attendance (employee_id, employer_id, date, timestamp)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(employee.id)
    .bind(employee.employer_id)
    .bind(date)
    .bind(timestamp)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn history(pool: &SqlitePool, employer_id: i64) -> Result<Vec<HistoryRow>, sqlx::Error> {
    sqlx::query_as::<_, HistoryRow>(
        r#"
        SELECT e.name AS employee_name, a.date, a.timestamp
        FROM attendance a
        JOIN employees e ON e.id = a.employee_id
        WHERE a.employer_id = ?
        ORDER BY a.date DESC, a.timestamp DESC
        "#,
    )
    .bind(employer_id)
    .fetch_all(pool)
    .await
}

pub async fn present_on(
    pool: &SqlitePool,
    employer_id: i64,
    date: NaiveDate,
) -> Result<Vec<HistoryRow>, sqlx::Error> {
    sqlx::query_as::<_, HistoryRow>(
        r#"
        SELECT e.name AS employee_name, a.date, a.timestamp
        FROM attendance a
        JOIN employees e ON e.id = a.employee_id
        WHERE a.employer_id = ? AND a.date = ?
        ORDER BY a.timestamp DESC
        "#,
    )
    .bind(employer_id)
    .bind(date)
    .fetch_all(pool)
    .await
}

pub async fn insert_refresh_token(
    pool: &SqlitePool,
    employer_id: i64,
    jti: &str,
    expires_at: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO refresh_tokens (employer_id, jti, expires_at)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(employer_id)
    .bind(jti)
    .bind(expires_at)
    .execute(pool)
    .await?;
    Ok(())
}

#[derive(sqlx::FromRow)]
pub struct RefreshTokenRow {
    pub id: i64,
    pub employer_id: i64,
    pub revoked: bool,
}

pub async fn find_refresh_token(
    pool: &SqlitePool,
    jti: &str,
) -> Result<Option<RefreshTokenRow>, sqlx::Error> {
    sqlx::query_as::<_, RefreshTokenRow>(
        "SELECT id, employer_id, revoked FROM refresh_tokens WHERE jti = ?",
    )
    .bind(jti)
    .fetch_optional(pool)
    .await
}

pub async fn revoke_refresh_token(pool: &SqlitePool, id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Password reset drops every open session for the employer.
pub async fn revoke_all_refresh_tokens(
    pool: &SqlitePool,
    employer_id: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE employer_id = ?")
        .bind(employer_id)
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub async fn seed_employer(pool: &SqlitePool, username: &str, pwd_hash: &str) -> i64 {
        sqlx::query("INSERT INTO employers (username, display_name, pwd_hash) VALUES (?, ?, ?)")
            .bind(username)
            .bind("Test Employer")
            .bind(pwd_hash)
            .execute(pool)
            .await
            .expect("seed employer");
        sqlx::query_scalar::<_, i64>("SELECT id FROM employers WHERE username = ?")
            .bind(username)
            .fetch_one(pool)
            .await
            .expect("employer id")
    }

    pub async fn seed_employee(
        pool: &SqlitePool,
        employer_id: i64,
        name: &str,
        qr_code: &str,
    ) -> Employee {
        sqlx::query("INSERT INTO employees (employer_id, name, qr_code) VALUES (?, ?, ?)")
            .bind(employer_id)
            .bind(name)
            .bind(qr_code)
            .execute(pool)
            .await
            .expect("seed employee");
        employee_by_code(pool, employer_id, qr_code)
            .await
            .expect("employee query")
            .expect("seeded employee")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use chrono::TimeZone;

    fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[tokio::test]
    async fn history_sorts_date_then_time_descending() {
        let pool = test_pool().await;
        let employer = fixtures::seed_employer(&pool, "acme", "x").await;
        let a = fixtures::seed_employee(&pool, employer, "Asha", "E-1").await;
        let b = fixtures::seed_employee(&pool, employer, "Binh", "E-2").await;

        // Inserted out of order on purpose.
        let rows = [
            (&a, ts(2026, 8, 27, 9, 15)),
            (&b, ts(2026, 8, 28, 8, 50)),
            (&a, ts(2026, 8, 28, 9, 5)),
            (&b, ts(2026, 8, 26, 10, 0)),
        ];
        for (emp, t) in rows {
            insert_attendance(&pool, emp, t.date_naive(), t).await.unwrap();
        }

        let history = history(&pool, employer).await.unwrap();
        let got: Vec<_> = history.iter().map(|r| r.timestamp).collect();
        assert_eq!(
            got,
            vec![
                ts(2026, 8, 28, 9, 5),
                ts(2026, 8, 28, 8, 50),
                ts(2026, 8, 27, 9, 15),
                ts(2026, 8, 26, 10, 0),
            ]
        );
        assert_eq!(history[0].employee_name, "Asha");
    }

    #[tokio::test]
    async fn employee_lookup_is_scoped_to_employer() {
        let pool = test_pool().await;
        let acme = fixtures::seed_employer(&pool, "acme", "x").await;
        let globex = fixtures::seed_employer(&pool, "globex", "x").await;
        fixtures::seed_employee(&pool, acme, "Asha", "E-1").await;

        assert!(employee_by_code(&pool, acme, "E-1").await.unwrap().is_some());
        assert!(employee_by_code(&pool, globex, "E-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn present_on_filters_by_date() {
        let pool = test_pool().await;
        let employer = fixtures::seed_employer(&pool, "acme", "x").await;
        let a = fixtures::seed_employee(&pool, employer, "Asha", "E-1").await;

        let yesterday = ts(2026, 8, 27, 9, 0);
        let today = ts(2026, 8, 28, 9, 0);
        insert_attendance(&pool, &a, yesterday.date_naive(), yesterday)
            .await
            .unwrap();

        let present = present_on(&pool, employer, today.date_naive()).await.unwrap();
        assert!(present.is_empty());

        let present = present_on(&pool, employer, yesterday.date_naive())
            .await
            .unwrap();
        assert_eq!(present.len(), 1);
    }
}
