//! AI Review API Handlers

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use shared::error::{AppError, ErrorCode};
use shared::models::{AiReview, AiReviewOverride, AiReviewQuery, AiReviewStatus};

use crate::api::{ApiResult, ClientIp, record_audit};
use crate::auth::Identity;
use crate::db;
use crate::state::AppState;
use crate::validation::{MAX_NOTE_LEN, validate_optional_text};

/// A manager verdict is either pass or fail; `error` only comes from the chain
fn ensure_override_status(status: AiReviewStatus) -> Result<(), AppError> {
    if status == AiReviewStatus::Error {
        return Err(AppError::validation("override status must be passed or failed")
            .with_detail("field", "status"));
    }
    Ok(())
}

/// GET /api/ai-reviews
pub async fn list(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<AiReviewQuery>,
) -> ApiResult<Vec<AiReview>> {
    let restaurant_id = identity.tenant_id()?;
    Ok(Json(db::ai_reviews::list(&state.pool, restaurant_id, &query).await?))
}

/// GET /api/ai-reviews/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
) -> ApiResult<AiReview> {
    let restaurant_id = identity.tenant_id()?;
    let review = db::ai_reviews::find(&state.pool, restaurant_id, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::AiReviewNotFound))?;
    Ok(Json(review))
}

/// POST /api/ai-reviews/{id}/override
pub async fn override_review(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ip: ClientIp,
    Path(id): Path<i64>,
    Json(payload): Json<AiReviewOverride>,
) -> ApiResult<AiReview> {
    let restaurant_id = identity.tenant_id()?;
    ensure_override_status(payload.status)?;
    validate_optional_text(&payload.note, "note", MAX_NOTE_LEN)?;

    let review = db::ai_reviews::override_status(
        &state.pool,
        restaurant_id,
        id,
        payload.status,
        identity.user_id,
        payload.note.as_deref(),
    )
    .await?
    .ok_or_else(|| AppError::new(ErrorCode::AiReviewNotFound))?;

    record_audit(
        &state,
        &identity,
        "ai_review.override",
        serde_json::json!({
            "review_id": id,
            "task_id": review.task_id,
            "from": review.status,
            "to": payload.status,
        }),
        &ip,
    )
    .await;
    Ok(Json(review))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_cannot_set_error() {
        assert!(ensure_override_status(AiReviewStatus::Passed).is_ok());
        assert!(ensure_override_status(AiReviewStatus::Failed).is_ok());
        assert_eq!(
            ensure_override_status(AiReviewStatus::Error).unwrap_err().code,
            ErrorCode::ValidationFailed
        );
    }
}
