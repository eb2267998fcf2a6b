use shared::models::{Task, TaskQuery, TaskStatus, TaskUpdate};
use shared::response::PageQuery;
use sqlx::PgPool;

pub async fn insert(pool: &PgPool, task: &Task) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO tasks (id, restaurant_id, title, description, sop_id, assigned_to, assigned_by,
                           priority, status, due_at, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        "#,
    )
    .bind(task.id)
    .bind(task.restaurant_id)
    .bind(&task.title)
    .bind(&task.description)
    .bind(task.sop_id)
    .bind(task.assigned_to)
    .bind(task.assigned_by)
    .bind(task.priority)
    .bind(task.status)
    .bind(task.due_at)
    .bind(task.created_at)
    .bind(task.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find(pool: &PgPool, restaurant_id: i64, id: i64) -> Result<Option<Task>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM tasks WHERE id = $1 AND restaurant_id = $2")
        .bind(id)
        .bind(restaurant_id)
        .fetch_optional(pool)
        .await
}

/// Filtered page of tasks, newest first, plus the total match count
pub async fn list(
    pool: &PgPool,
    restaurant_id: i64,
    query: &TaskQuery,
    page: &PageQuery,
) -> Result<(Vec<Task>, i64), sqlx::Error> {
    const FILTER: &str = r#"
        FROM tasks
        WHERE restaurant_id = $1
            AND ($2::TEXT IS NULL OR status = $2)
            AND ($3::BIGINT IS NULL OR assigned_to = $3)
            AND ($4::TEXT IS NULL OR priority = $4)
            AND ($5::BIGINT IS NULL OR created_at >= $5)
            AND ($6::BIGINT IS NULL OR created_at < $6)
    "#;

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) {FILTER}"))
        .bind(restaurant_id)
        .bind(query.status)
        .bind(query.assigned_to)
        .bind(query.priority)
        .bind(query.from)
        .bind(query.to)
        .fetch_one(pool)
        .await?;

    let tasks = sqlx::query_as(&format!(
        "SELECT * {FILTER} ORDER BY created_at DESC LIMIT $7 OFFSET $8"
    ))
    .bind(restaurant_id)
    .bind(query.status)
    .bind(query.assigned_to)
    .bind(query.priority)
    .bind(query.from)
    .bind(query.to)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    Ok((tasks, total))
}

/// Field edits, only applied while the task is still pending or in progress
pub async fn update(
    pool: &PgPool,
    restaurant_id: i64,
    id: i64,
    data: &TaskUpdate,
    now: i64,
) -> Result<Option<Task>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE tasks SET
            title = COALESCE($3, title),
            description = COALESCE($4, description),
            sop_id = COALESCE($5, sop_id),
            assigned_to = COALESCE($6, assigned_to),
            priority = COALESCE($7, priority),
            due_at = COALESCE($8, due_at),
            updated_at = $9
        WHERE id = $1 AND restaurant_id = $2 AND status IN ('pending', 'in_progress')
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(restaurant_id)
    .bind(&data.title)
    .bind(&data.description)
    .bind(data.sop_id)
    .bind(data.assigned_to)
    .bind(data.priority)
    .bind(data.due_at)
    .bind(now)
    .fetch_optional(pool)
    .await
}

/// Compare-and-set status change.
///
/// Returns `None` when the task is no longer in `from` (a concurrent request
/// won the race). `started_at` keeps the first start, `completed_at` is
/// stamped on completion.
pub async fn transition(
    pool: &PgPool,
    restaurant_id: i64,
    id: i64,
    from: TaskStatus,
    to: TaskStatus,
    review_note: Option<&str>,
    now: i64,
) -> Result<Option<Task>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE tasks SET
            status = $4,
            started_at = CASE WHEN $4::TEXT = 'in_progress' THEN COALESCE(started_at, $6) ELSE started_at END,
            completed_at = CASE WHEN $4::TEXT = 'completed' THEN $6 ELSE completed_at END,
            review_note = COALESCE($5, review_note),
            updated_at = $6
        WHERE id = $1 AND restaurant_id = $2 AND status = $3
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(restaurant_id)
    .bind(from)
    .bind(to)
    .bind(review_note)
    .bind(now)
    .fetch_optional(pool)
    .await
}

/// `in_progress → submitted`, replacing the evidence of any earlier submission
pub async fn submit(pool: &PgPool, task: &Task) -> Result<Option<Task>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE tasks SET
            status = 'submitted',
            photo_url = $3,
            submission_note = $4,
            ai_review_id = NULL,
            submitted_at = $5,
            updated_at = $5
        WHERE id = $1 AND restaurant_id = $2 AND status = 'in_progress'
        RETURNING *
        "#,
    )
    .bind(task.id)
    .bind(task.restaurant_id)
    .bind(&task.photo_url)
    .bind(&task.submission_note)
    .bind(task.updated_at)
    .fetch_optional(pool)
    .await
}

pub async fn attach_review(
    pool: &PgPool,
    id: i64,
    review_id: i64,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE tasks SET ai_review_id = $2, updated_at = $3 WHERE id = $1")
        .bind(id)
        .bind(review_id)
        .bind(now)
        .execute(pool)
        .await?;
    Ok(())
}
