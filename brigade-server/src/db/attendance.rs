use chrono::NaiveDate;
use shared::models::{Attendance, AttendanceQuery, AttendanceSummaryRow};
use sqlx::{PgConnection, PgPool};

use crate::payroll::AttendanceTally;

/// Fails with a unique violation when the employee already has a row for the day
pub async fn insert(pool: &PgPool, a: &Attendance) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO attendance (id, restaurant_id, user_id, work_date, status, check_in_at,
                                check_out_at, worked_minutes, check_in_lat, check_in_lng, note,
                                created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        "#,
    )
    .bind(a.id)
    .bind(a.restaurant_id)
    .bind(a.user_id)
    .bind(a.work_date)
    .bind(a.status)
    .bind(a.check_in_at)
    .bind(a.check_out_at)
    .bind(a.worked_minutes)
    .bind(a.check_in_lat)
    .bind(a.check_in_lng)
    .bind(&a.note)
    .bind(a.created_at)
    .bind(a.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find(
    pool: &PgPool,
    restaurant_id: i64,
    id: i64,
) -> Result<Option<Attendance>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM attendance WHERE id = $1 AND restaurant_id = $2")
        .bind(id)
        .bind(restaurant_id)
        .fetch_optional(pool)
        .await
}

pub async fn find_for_day(
    pool: &PgPool,
    user_id: i64,
    work_date: NaiveDate,
) -> Result<Option<Attendance>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM attendance WHERE user_id = $1 AND work_date = $2")
        .bind(user_id)
        .bind(work_date)
        .fetch_optional(pool)
        .await
}

/// Close an open record; `None` if it was checked out concurrently
pub async fn check_out(
    pool: &PgPool,
    id: i64,
    check_out_at: i64,
    worked_minutes: Option<i32>,
) -> Result<Option<Attendance>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE attendance SET check_out_at = $2, worked_minutes = $3, updated_at = $2
        WHERE id = $1 AND check_in_at IS NOT NULL AND check_out_at IS NULL
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(check_out_at)
    .bind(worked_minutes)
    .fetch_optional(pool)
    .await
}

pub async fn list(
    pool: &PgPool,
    restaurant_id: i64,
    query: &AttendanceQuery,
) -> Result<Vec<Attendance>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT * FROM attendance
        WHERE restaurant_id = $1
            AND ($2::BIGINT IS NULL OR user_id = $2)
            AND ($3::DATE IS NULL OR work_date >= $3)
            AND ($4::DATE IS NULL OR work_date <= $4)
        ORDER BY work_date DESC, user_id
        LIMIT 1000
        "#,
    )
    .bind(restaurant_id)
    .bind(query.user_id)
    .bind(query.from)
    .bind(query.to)
    .fetch_all(pool)
    .await
}

/// Write back a manually corrected record
pub async fn save(pool: &PgPool, a: &Attendance) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE attendance SET status = $3, check_in_at = $4, check_out_at = $5,
            worked_minutes = $6, note = $7, updated_at = $8
        WHERE id = $1 AND restaurant_id = $2
        "#,
    )
    .bind(a.id)
    .bind(a.restaurant_id)
    .bind(a.status)
    .bind(a.check_in_at)
    .bind(a.check_out_at)
    .bind(a.worked_minutes)
    .bind(&a.note)
    .bind(a.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Mark a day as leave. Days the employee actually checked in are left alone.
pub async fn upsert_leave(
    conn: &mut PgConnection,
    restaurant_id: i64,
    user_id: i64,
    work_date: NaiveDate,
    note: Option<&str>,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO attendance (id, restaurant_id, user_id, work_date, status, note, created_at, updated_at)
        VALUES ($1, $2, $3, $4, 'leave', $5, $6, $6)
        ON CONFLICT (user_id, work_date) DO UPDATE
            SET status = 'leave', note = EXCLUDED.note, updated_at = EXCLUDED.updated_at
            WHERE attendance.check_in_at IS NULL
        "#,
    )
    .bind(shared::util::snowflake_id())
    .bind(restaurant_id)
    .bind(user_id)
    .bind(work_date)
    .bind(note)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(())
}

/// Per-employee status counts between two dates (inclusive)
pub async fn summary(
    pool: &PgPool,
    restaurant_id: i64,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<AttendanceSummaryRow>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT u.id AS user_id, u.name,
            COUNT(a.id) FILTER (WHERE a.status = 'present') AS present_days,
            COUNT(a.id) FILTER (WHERE a.status = 'half_day') AS half_days,
            COUNT(a.id) FILTER (WHERE a.status = 'leave') AS leave_days,
            COUNT(a.id) FILTER (WHERE a.status = 'absent') AS absent_days,
            COALESCE(SUM(a.worked_minutes), 0)::BIGINT AS worked_minutes
        FROM users u
        LEFT JOIN attendance a
            ON a.user_id = u.id AND a.work_date BETWEEN $2 AND $3
        WHERE u.restaurant_id = $1 AND u.role <> 'superadmin'
            AND (u.is_active OR a.id IS NOT NULL)
        GROUP BY u.id, u.name
        ORDER BY u.name
        "#,
    )
    .bind(restaurant_id)
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await
}

/// Paid-day inputs for one employee's payslip
pub async fn tally(
    pool: &PgPool,
    user_id: i64,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<AttendanceTally, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT
            COUNT(*) FILTER (WHERE status = 'present') AS present,
            COUNT(*) FILTER (WHERE status = 'half_day') AS half_day,
            COUNT(*) FILTER (WHERE status = 'leave') AS leave
        FROM attendance
        WHERE user_id = $1 AND work_date BETWEEN $2 AND $3
        "#,
    )
    .bind(user_id)
    .bind(from)
    .bind(to)
    .fetch_one(pool)
    .await
}
