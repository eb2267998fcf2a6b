//! Staff Request API Handlers

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use shared::error::{AppError, ErrorCode};
use shared::models::{
    RequestDecision, RequestStatus, StaffRequest, StaffRequestCreate, StaffRequestQuery,
};
use shared::util::{now_millis, snowflake_id};

use crate::api::{ApiResult, ClientIp, notify_user, record_audit};
use crate::auth::Identity;
use crate::db;
use crate::notify::PushMessage;
use crate::state::AppState;
use crate::validation::{MAX_NAME_LEN, MAX_NOTE_LEN, validate_optional_text, validate_required_text};

/// POST /api/requests
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<StaffRequestCreate>,
) -> ApiResult<StaffRequest> {
    let restaurant_id = identity.tenant_id()?;
    validate_required_text(&payload.subject, "subject", MAX_NAME_LEN)?;
    validate_optional_text(&payload.details, "details", MAX_NOTE_LEN)?;
    payload.validate()?;

    let request = payload.into_pending(snowflake_id(), restaurant_id, identity.user_id, now_millis());
    db::staff_requests::insert(&state.pool, &request).await?;

    tracing::info!(request_id = request.id, kind = ?request.kind, "Staff request created");
    Ok(Json(request))
}

/// GET /api/requests
pub async fn list(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(mut query): Query<StaffRequestQuery>,
) -> ApiResult<Vec<StaffRequest>> {
    let restaurant_id = identity.tenant_id()?;
    query.user_id = identity.scope_user(query.user_id);
    Ok(Json(db::staff_requests::list(&state.pool, restaurant_id, &query).await?))
}

/// Decide a pending request. Approved leave is written to attendance in the
/// same transaction.
async fn decide(
    state: &AppState,
    identity: &Identity,
    ip: &ClientIp,
    id: i64,
    to: RequestStatus,
    note: Option<String>,
) -> ApiResult<StaffRequest> {
    let restaurant_id = identity.tenant_id()?;
    let note = note.filter(|n| !n.trim().is_empty());
    validate_optional_text(&note, "note", MAX_NOTE_LEN)?;

    let existing = db::staff_requests::find(&state.pool, restaurant_id, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::RequestNotFound))?;
    if !existing.status.is_pending() {
        return Err(AppError::new(ErrorCode::InvalidRequestTransition)
            .with_detail("status", serde_json::json!(existing.status))
            .into());
    }

    let now = now_millis();
    let mut tx = state.pool.begin().await?;
    let request = db::staff_requests::decide(
        &mut *tx,
        restaurant_id,
        id,
        to,
        identity.user_id,
        note.as_deref(),
        now,
    )
    .await?
    .ok_or_else(|| AppError::new(ErrorCode::InvalidRequestTransition))?;

    let leave_days = if to == RequestStatus::Approved {
        request.leave_days()
    } else {
        Vec::new()
    };
    for day in &leave_days {
        db::attendance::upsert_leave(
            &mut *tx,
            restaurant_id,
            request.user_id,
            *day,
            Some(&request.subject),
            now,
        )
        .await?;
    }
    tx.commit().await?;

    let action = if to == RequestStatus::Approved {
        "request.approve"
    } else {
        "request.reject"
    };
    record_audit(
        state,
        identity,
        action,
        serde_json::json!({
            "request_id": id,
            "kind": request.kind,
            "leave_days": leave_days.len(),
        }),
        ip,
    )
    .await;

    let title = if to == RequestStatus::Approved {
        "Request approved"
    } else {
        "Request rejected"
    };
    notify_user(
        state,
        request.user_id,
        PushMessage::new(title, &request.subject).with_data("request_id", request.id),
    )
    .await;
    Ok(Json(request))
}

/// POST /api/requests/{id}/approve
pub async fn approve(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ip: ClientIp,
    Path(id): Path<i64>,
    payload: Option<Json<RequestDecision>>,
) -> ApiResult<StaffRequest> {
    let note = payload.and_then(|Json(d)| d.note);
    decide(&state, &identity, &ip, id, RequestStatus::Approved, note).await
}

/// POST /api/requests/{id}/reject
pub async fn reject(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ip: ClientIp,
    Path(id): Path<i64>,
    payload: Option<Json<RequestDecision>>,
) -> ApiResult<StaffRequest> {
    let note = payload.and_then(|Json(d)| d.note);
    decide(&state, &identity, &ip, id, RequestStatus::Rejected, note).await
}

/// POST /api/requests/{id}/cancel
pub async fn cancel(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
) -> ApiResult<StaffRequest> {
    let restaurant_id = identity.tenant_id()?;
    let existing = db::staff_requests::find(&state.pool, restaurant_id, id)
        .await?
        .filter(|r| r.user_id == identity.user_id)
        .ok_or_else(|| AppError::new(ErrorCode::RequestNotFound))?;
    if !existing.status.is_pending() {
        return Err(AppError::new(ErrorCode::InvalidRequestTransition)
            .with_detail("status", serde_json::json!(existing.status))
            .into());
    }

    let request = db::staff_requests::cancel(&state.pool, restaurant_id, id, identity.user_id, now_millis())
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::InvalidRequestTransition))?;
    Ok(Json(request))
}
