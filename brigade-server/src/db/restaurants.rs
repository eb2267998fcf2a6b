use shared::models::{
    Restaurant, RestaurantOverview, RestaurantQuery, RestaurantStatus, RestaurantUpdate,
};
use sqlx::{PgConnection, PgPool};

use super::search_pattern;

pub async fn insert(conn: &mut PgConnection, r: &Restaurant) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO restaurants (id, name, address, phone, timezone, status, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(r.id)
    .bind(&r.name)
    .bind(&r.address)
    .bind(&r.phone)
    .bind(&r.timezone)
    .bind(r.status)
    .bind(r.created_at)
    .bind(r.updated_at)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn find(pool: &PgPool, id: i64) -> Result<Option<Restaurant>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM restaurants WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list(pool: &PgPool, query: &RestaurantQuery) -> Result<Vec<Restaurant>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT * FROM restaurants
        WHERE ($1::TEXT IS NULL OR status = $1)
            AND ($2::TEXT IS NULL OR name ILIKE $2)
        ORDER BY created_at DESC
        "#,
    )
    .bind(query.status)
    .bind(search_pattern(query.search.as_deref()))
    .fetch_all(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    data: &RestaurantUpdate,
    now: i64,
) -> Result<Option<Restaurant>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE restaurants SET
            name = COALESCE($2, name),
            address = COALESCE($3, address),
            phone = COALESCE($4, phone),
            timezone = COALESCE($5, timezone),
            updated_at = $6
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.address)
    .bind(&data.phone)
    .bind(&data.timezone)
    .bind(now)
    .fetch_optional(pool)
    .await
}

pub async fn set_status(
    pool: &PgPool,
    id: i64,
    status: RestaurantStatus,
    now: i64,
) -> Result<Option<Restaurant>, sqlx::Error> {
    sqlx::query_as("UPDATE restaurants SET status = $2, updated_at = $3 WHERE id = $1 RETURNING *")
        .bind(id)
        .bind(status)
        .bind(now)
        .fetch_optional(pool)
        .await
}

/// Timezone of a restaurant (`UTC` if missing)
pub async fn timezone(pool: &PgPool, id: i64) -> Result<String, sqlx::Error> {
    let tz: Option<String> = sqlx::query_scalar("SELECT timezone FROM restaurants WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(tz.unwrap_or_else(|| shared::models::DEFAULT_TIMEZONE.to_string()))
}

/// Per-restaurant counters for the superadmin overview
pub async fn overview(pool: &PgPool, month: &str) -> Result<Vec<RestaurantOverview>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT
            r.id,
            r.name,
            r.status,
            (SELECT COUNT(*) FROM users u
                WHERE u.restaurant_id = r.id AND u.is_active
                  AND u.role IN ('employee', 'manager')) AS employees,
            (SELECT COUNT(*) FROM tasks t
                WHERE t.restaurant_id = r.id
                  AND t.status NOT IN ('completed', 'cancelled')) AS open_tasks,
            (SELECT COUNT(*) FROM staff_requests s
                WHERE s.restaurant_id = r.id AND s.status = 'pending') AS pending_requests,
            COALESCE((SELECT SUM(p.net) FROM payslips p
                WHERE p.restaurant_id = r.id AND p.month = $1), 0) AS payroll_net
        FROM restaurants r
        ORDER BY r.name
        "#,
    )
    .bind(month)
    .fetch_all(pool)
    .await
}
