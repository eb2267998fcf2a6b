//! SOP API Handlers

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use shared::error::{AppError, ErrorCode};
use shared::models::{Sop, SopCreate, SopQuery, SopUpdate};
use shared::util::{now_millis, snowflake_id};

use crate::api::ApiResult;
use crate::auth::Identity;
use crate::db;
use crate::state::AppState;
use crate::validation::{MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text};

fn validate_text_fields(
    title: Option<&str>,
    category: &Option<String>,
    description: &Option<String>,
    ai_check_prompt: &Option<String>,
) -> Result<(), AppError> {
    if let Some(title) = title
        && title.len() > MAX_NAME_LEN
    {
        return Err(AppError::validation(format!("title is too long (max {MAX_NAME_LEN})")));
    }
    validate_optional_text(category, "category", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(ai_check_prompt, "ai_check_prompt", MAX_NOTE_LEN)?;
    Ok(())
}

/// POST /api/sops
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<SopCreate>,
) -> ApiResult<Sop> {
    let restaurant_id = identity.tenant_id()?;
    payload.validate()?;
    validate_text_fields(
        Some(&payload.title),
        &payload.category,
        &payload.description,
        &payload.ai_check_prompt,
    )?;

    let now = now_millis();
    let sop = Sop {
        id: snowflake_id(),
        restaurant_id,
        title: payload.title.trim().to_string(),
        category: payload.category,
        description: payload.description,
        steps: payload.steps.iter().map(|s| s.trim().to_string()).collect(),
        requires_photo: payload.requires_photo,
        ai_check_prompt: payload.ai_check_prompt,
        is_active: true,
        created_by: identity.user_id,
        created_at: now,
        updated_at: now,
    };
    db::sops::insert(&state.pool, &sop).await?;

    tracing::info!(sop_id = sop.id, restaurant_id, "SOP created");
    Ok(Json(sop))
}

/// GET /api/sops
pub async fn list(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<SopQuery>,
) -> ApiResult<Vec<Sop>> {
    let restaurant_id = identity.tenant_id()?;
    Ok(Json(db::sops::list(&state.pool, restaurant_id, &query).await?))
}

/// GET /api/sops/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
) -> ApiResult<Sop> {
    let restaurant_id = identity.tenant_id()?;
    let sop = db::sops::find(&state.pool, restaurant_id, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::SopNotFound))?;
    Ok(Json(sop))
}

/// PATCH /api/sops/{id}
pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
    Json(mut payload): Json<SopUpdate>,
) -> ApiResult<Sop> {
    let restaurant_id = identity.tenant_id()?;
    payload.validate()?;
    validate_text_fields(
        payload.title.as_deref(),
        &payload.category,
        &payload.description,
        &payload.ai_check_prompt,
    )?;
    if let Some(steps) = payload.steps.as_mut() {
        for step in steps.iter_mut() {
            *step = step.trim().to_string();
        }
    }

    let sop = db::sops::update(&state.pool, restaurant_id, id, &payload, now_millis())
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::SopNotFound))?;
    Ok(Json(sop))
}

/// DELETE /api/sops/{id}
///
/// Soft delete. Refused while open tasks still follow the SOP.
pub async fn delete(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
) -> ApiResult<bool> {
    let restaurant_id = identity.tenant_id()?;
    db::sops::find(&state.pool, restaurant_id, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::SopNotFound))?;

    let open_tasks = db::sops::open_task_count(&state.pool, id).await?;
    if open_tasks > 0 {
        return Err(AppError::new(ErrorCode::SopInUse)
            .with_detail("open_tasks", open_tasks)
            .into());
    }

    let result = db::sops::deactivate(&state.pool, restaurant_id, id, now_millis()).await?;
    tracing::info!(sop_id = id, "SOP deactivated");
    Ok(Json(result))
}
