//! Audit log operations

use serde::Serialize;
use sqlx::PgPool;

/// Write an audit log entry
pub async fn log(
    pool: &PgPool,
    restaurant_id: Option<i64>,
    user_id: i64,
    action: &str,
    detail: Option<&serde_json::Value>,
    ip_address: Option<&str>,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO audit_logs (restaurant_id, user_id, action, detail, ip_address, created_at)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(restaurant_id)
    .bind(user_id)
    .bind(action)
    .bind(detail)
    .bind(ip_address)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(())
}

#[derive(Debug, sqlx::FromRow, Serialize)]
pub struct AuditEntry {
    pub id: i64,
    pub restaurant_id: Option<i64>,
    pub user_id: Option<i64>,
    pub action: String,
    pub detail: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub created_at: i64,
}

/// Newest first; `restaurant_id = None` returns every tenant's entries
pub async fn query(
    pool: &PgPool,
    restaurant_id: Option<i64>,
    limit: i64,
    offset: i64,
) -> Result<Vec<AuditEntry>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT id, restaurant_id, user_id, action, detail, ip_address, created_at
        FROM audit_logs
        WHERE ($1::BIGINT IS NULL OR restaurant_id = $1)
        ORDER BY created_at DESC, id DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(restaurant_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}
