use shared::models::{AiReview, AiReviewQuery, AiReviewStatus};
use sqlx::PgPool;
use sqlx::types::Json;

pub async fn insert(pool: &PgPool, review: &AiReview) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO ai_reviews (id, restaurant_id, task_id, image_url, provider, model, status,
                                score, approved, feedback, attempts, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        "#,
    )
    .bind(review.id)
    .bind(review.restaurant_id)
    .bind(review.task_id)
    .bind(&review.image_url)
    .bind(&review.provider)
    .bind(&review.model)
    .bind(review.status)
    .bind(review.score)
    .bind(review.approved)
    .bind(&review.feedback)
    .bind(Json(&review.attempts))
    .bind(review.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find(
    pool: &PgPool,
    restaurant_id: i64,
    id: i64,
) -> Result<Option<AiReview>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM ai_reviews WHERE id = $1 AND restaurant_id = $2")
        .bind(id)
        .bind(restaurant_id)
        .fetch_optional(pool)
        .await
}

/// Filters on the effective status (override wins over the provider verdict)
pub async fn list(
    pool: &PgPool,
    restaurant_id: i64,
    query: &AiReviewQuery,
) -> Result<Vec<AiReview>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT * FROM ai_reviews
        WHERE restaurant_id = $1
            AND ($2::TEXT IS NULL OR COALESCE(override_status, status) = $2)
            AND ($3::BIGINT IS NULL OR task_id = $3)
        ORDER BY created_at DESC
        LIMIT 500
        "#,
    )
    .bind(restaurant_id)
    .bind(query.status)
    .bind(query.task_id)
    .fetch_all(pool)
    .await
}

pub async fn override_status(
    pool: &PgPool,
    restaurant_id: i64,
    id: i64,
    status: AiReviewStatus,
    by: i64,
    note: Option<&str>,
) -> Result<Option<AiReview>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE ai_reviews SET override_status = $3, override_by = $4, override_note = $5
        WHERE id = $1 AND restaurant_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(restaurant_id)
    .bind(status)
    .bind(by)
    .bind(note)
    .fetch_optional(pool)
    .await
}
