use shared::models::{Sop, SopQuery, SopUpdate};
use sqlx::PgPool;
use sqlx::types::Json;

pub async fn insert(pool: &PgPool, sop: &Sop) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO sops (id, restaurant_id, title, category, description, steps,
                          requires_photo, ai_check_prompt, is_active, created_by, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        "#,
    )
    .bind(sop.id)
    .bind(sop.restaurant_id)
    .bind(&sop.title)
    .bind(&sop.category)
    .bind(&sop.description)
    .bind(Json(&sop.steps))
    .bind(sop.requires_photo)
    .bind(&sop.ai_check_prompt)
    .bind(sop.is_active)
    .bind(sop.created_by)
    .bind(sop.created_at)
    .bind(sop.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find(pool: &PgPool, restaurant_id: i64, id: i64) -> Result<Option<Sop>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM sops WHERE id = $1 AND restaurant_id = $2")
        .bind(id)
        .bind(restaurant_id)
        .fetch_optional(pool)
        .await
}

pub async fn list(
    pool: &PgPool,
    restaurant_id: i64,
    query: &SopQuery,
) -> Result<Vec<Sop>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT * FROM sops
        WHERE restaurant_id = $1
            AND ($2::TEXT IS NULL OR category = $2)
            AND ($3::BOOLEAN IS NULL OR is_active = $3)
        ORDER BY category NULLS LAST, title
        "#,
    )
    .bind(restaurant_id)
    .bind(&query.category)
    .bind(query.active)
    .fetch_all(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    restaurant_id: i64,
    id: i64,
    data: &SopUpdate,
    now: i64,
) -> Result<Option<Sop>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE sops SET
            title = COALESCE($3, title),
            category = COALESCE($4, category),
            description = COALESCE($5, description),
            steps = COALESCE($6, steps),
            requires_photo = COALESCE($7, requires_photo),
            ai_check_prompt = COALESCE($8, ai_check_prompt),
            is_active = COALESCE($9, is_active),
            updated_at = $10
        WHERE id = $1 AND restaurant_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(restaurant_id)
    .bind(&data.title)
    .bind(&data.category)
    .bind(&data.description)
    .bind(data.steps.as_ref().map(Json))
    .bind(data.requires_photo)
    .bind(&data.ai_check_prompt)
    .bind(data.is_active)
    .bind(now)
    .fetch_optional(pool)
    .await
}

pub async fn deactivate(
    pool: &PgPool,
    restaurant_id: i64,
    id: i64,
    now: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE sops SET is_active = FALSE, updated_at = $3 WHERE id = $1 AND restaurant_id = $2",
    )
    .bind(id)
    .bind(restaurant_id)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Open tasks (pending, in progress, submitted, rejected) still following the SOP
pub async fn open_task_count(pool: &PgPool, sop_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM tasks
         WHERE sop_id = $1 AND status IN ('pending', 'in_progress', 'submitted', 'rejected')",
    )
    .bind(sop_id)
    .fetch_one(pool)
    .await
}
