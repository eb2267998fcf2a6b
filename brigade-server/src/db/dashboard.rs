//! Aggregations behind the dashboard and reports

use chrono::NaiveDate;
use shared::models::{AiReviewStats, AttendanceToday, StatusCount, TaskReportRow};
use sqlx::PgPool;

/// Task counts per status, for tasks created in `[from, to)`
pub async fn tasks_by_status(
    pool: &PgPool,
    restaurant_id: i64,
    from: Option<i64>,
    to: Option<i64>,
) -> Result<Vec<StatusCount>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT status, COUNT(*) AS count
        FROM tasks
        WHERE restaurant_id = $1
            AND ($2::BIGINT IS NULL OR created_at >= $2)
            AND ($3::BIGINT IS NULL OR created_at < $3)
        GROUP BY status
        ORDER BY status
        "#,
    )
    .bind(restaurant_id)
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await
}

pub async fn overdue_tasks(pool: &PgPool, restaurant_id: i64, now: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM tasks
        WHERE restaurant_id = $1
            AND status NOT IN ('completed', 'cancelled')
            AND due_at IS NOT NULL AND due_at < $2
        "#,
    )
    .bind(restaurant_id)
    .bind(now)
    .fetch_one(pool)
    .await
}

/// Active staff split into checked in, on leave and not yet checked in
pub async fn attendance_today(
    pool: &PgPool,
    restaurant_id: i64,
    today: NaiveDate,
) -> Result<AttendanceToday, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT
            COUNT(*) FILTER (WHERE a.check_in_at IS NOT NULL) AS present,
            COUNT(*) FILTER (WHERE a.status = 'leave' AND a.check_in_at IS NULL) AS on_leave,
            COUNT(*) FILTER (WHERE a.id IS NULL) AS not_checked_in
        FROM users u
        LEFT JOIN attendance a ON a.user_id = u.id AND a.work_date = $2
        WHERE u.restaurant_id = $1 AND u.is_active AND u.role IN ('employee', 'manager')
        "#,
    )
    .bind(restaurant_id)
    .bind(today)
    .fetch_one(pool)
    .await
}

pub async fn pending_requests(pool: &PgPool, restaurant_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM staff_requests WHERE restaurant_id = $1 AND status = 'pending'",
    )
    .bind(restaurant_id)
    .fetch_one(pool)
    .await
}

/// Review outcomes in range, counted by effective status
pub async fn ai_review_stats(
    pool: &PgPool,
    restaurant_id: i64,
    from: Option<i64>,
    to: Option<i64>,
) -> Result<AiReviewStats, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT
            COUNT(*) AS total,
            COUNT(*) FILTER (WHERE COALESCE(override_status, status) = 'passed') AS passed,
            COUNT(*) FILTER (WHERE COALESCE(override_status, status) = 'failed') AS failed,
            COUNT(*) FILTER (WHERE COALESCE(override_status, status) = 'error') AS errors
        FROM ai_reviews
        WHERE restaurant_id = $1
            AND ($2::BIGINT IS NULL OR created_at >= $2)
            AND ($3::BIGINT IS NULL OR created_at < $3)
        "#,
    )
    .bind(restaurant_id)
    .bind(from)
    .bind(to)
    .fetch_one(pool)
    .await
}

/// Per-assignee task outcomes for tasks created in `[from, to)`.
///
/// On time means completed with no due date or at/before the due date.
pub async fn task_report(
    pool: &PgPool,
    restaurant_id: i64,
    from: Option<i64>,
    to: Option<i64>,
) -> Result<Vec<TaskReportRow>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT u.id AS user_id, u.name,
            COUNT(t.id) AS assigned,
            COUNT(t.id) FILTER (WHERE t.status = 'completed') AS completed,
            COUNT(t.id) FILTER (WHERE t.status = 'rejected') AS rejected,
            COUNT(t.id) FILTER (
                WHERE t.status = 'completed'
                    AND (t.due_at IS NULL OR t.completed_at <= t.due_at)
            ) AS on_time
        FROM users u
        JOIN tasks t ON t.assigned_to = u.id
            AND ($2::BIGINT IS NULL OR t.created_at >= $2)
            AND ($3::BIGINT IS NULL OR t.created_at < $3)
        WHERE u.restaurant_id = $1
        GROUP BY u.id, u.name
        ORDER BY completed DESC, u.name
        "#,
    )
    .bind(restaurant_id)
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await
}
