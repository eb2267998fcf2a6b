use shared::models::{RequestStatus, StaffRequest, StaffRequestQuery};
use sqlx::{PgConnection, PgPool};

pub async fn insert(pool: &PgPool, r: &StaffRequest) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO staff_requests (id, restaurant_id, user_id, kind, status, subject, details,
                                    start_date, end_date, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
    )
    .bind(r.id)
    .bind(r.restaurant_id)
    .bind(r.user_id)
    .bind(r.kind)
    .bind(r.status)
    .bind(&r.subject)
    .bind(&r.details)
    .bind(r.start_date)
    .bind(r.end_date)
    .bind(r.created_at)
    .bind(r.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find(
    pool: &PgPool,
    restaurant_id: i64,
    id: i64,
) -> Result<Option<StaffRequest>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM staff_requests WHERE id = $1 AND restaurant_id = $2")
        .bind(id)
        .bind(restaurant_id)
        .fetch_optional(pool)
        .await
}

pub async fn list(
    pool: &PgPool,
    restaurant_id: i64,
    query: &StaffRequestQuery,
) -> Result<Vec<StaffRequest>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT * FROM staff_requests
        WHERE restaurant_id = $1
            AND ($2::TEXT IS NULL OR status = $2)
            AND ($3::TEXT IS NULL OR kind = $3)
            AND ($4::BIGINT IS NULL OR user_id = $4)
        ORDER BY created_at DESC
        LIMIT 500
        "#,
    )
    .bind(restaurant_id)
    .bind(query.status)
    .bind(query.kind)
    .bind(query.user_id)
    .fetch_all(pool)
    .await
}

/// Move a pending request to `to`; `None` if it was no longer pending
pub async fn decide(
    conn: &mut PgConnection,
    restaurant_id: i64,
    id: i64,
    to: RequestStatus,
    decided_by: i64,
    note: Option<&str>,
    now: i64,
) -> Result<Option<StaffRequest>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE staff_requests SET
            status = $3, decided_by = $4, decision_note = $5, decided_at = $6, updated_at = $6
        WHERE id = $1 AND restaurant_id = $2 AND status = 'pending'
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(restaurant_id)
    .bind(to)
    .bind(decided_by)
    .bind(note)
    .bind(now)
    .fetch_optional(conn)
    .await
}

/// Requester withdraws a pending request
pub async fn cancel(
    pool: &PgPool,
    restaurant_id: i64,
    id: i64,
    user_id: i64,
    now: i64,
) -> Result<Option<StaffRequest>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE staff_requests SET status = 'cancelled', updated_at = $4
        WHERE id = $1 AND restaurant_id = $2 AND user_id = $3 AND status = 'pending'
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(restaurant_id)
    .bind(user_id)
    .bind(now)
    .fetch_optional(pool)
    .await
}
