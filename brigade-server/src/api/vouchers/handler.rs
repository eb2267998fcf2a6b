//! Voucher API Handlers

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use shared::error::{AppError, ErrorCode};
use shared::models::{
    Month, Voucher, VoucherCreate, VoucherDraft, VoucherKind, VoucherQuery, VoucherStatus,
    VoucherVoid,
};
use shared::util::now_millis;

use crate::api::{ApiResult, ClientIp, record_audit, restaurant_today};
use crate::auth::Identity;
use crate::db;
use crate::state::AppState;
use crate::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text,
    validate_positive_amount, validate_required_text,
};

/// POST /api/vouchers
///
/// Manual expense voucher; salary and advance vouchers come from payouts.
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ip: ClientIp,
    Json(payload): Json<VoucherCreate>,
) -> ApiResult<Voucher> {
    let restaurant_id = identity.tenant_id()?;
    validate_required_text(&payload.payee_name, "payee_name", MAX_NAME_LEN)?;
    validate_positive_amount(payload.amount, "amount")?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.method, "method", MAX_SHORT_TEXT_LEN)?;
    if let Some(user_id) = payload.payee_user_id {
        db::users::find_in_restaurant(&state.pool, restaurant_id, user_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::EmployeeNotFound).with_detail("user_id", user_id))?;
    }

    let month = Month::of(restaurant_today(&state, restaurant_id).await?);
    let mut tx = state.pool.begin().await?;
    let voucher = db::vouchers::issue(
        &mut *tx,
        restaurant_id,
        identity.user_id,
        &month,
        VoucherDraft {
            kind: VoucherKind::Expense,
            payee_user_id: payload.payee_user_id,
            payee_name: payload.payee_name.trim().to_string(),
            amount: payload.amount,
            description: payload.description,
            reference_id: None,
            method: payload.method,
        },
        now_millis(),
    )
    .await?;
    tx.commit().await?;

    record_audit(
        &state,
        &identity,
        "voucher.issue",
        serde_json::json!({
            "voucher_id": voucher.id,
            "number": voucher.number,
            "amount": voucher.amount.to_string(),
        }),
        &ip,
    )
    .await;
    Ok(Json(voucher))
}

/// GET /api/vouchers
pub async fn list(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<VoucherQuery>,
) -> ApiResult<Vec<Voucher>> {
    let restaurant_id = identity.tenant_id()?;
    Ok(Json(db::vouchers::list(&state.pool, restaurant_id, &query).await?))
}

/// GET /api/vouchers/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
) -> ApiResult<Voucher> {
    let restaurant_id = identity.tenant_id()?;
    let voucher = db::vouchers::find(&state.pool, restaurant_id, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::VoucherNotFound))?;
    Ok(Json(voucher))
}

/// POST /api/vouchers/{id}/void
pub async fn void(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ip: ClientIp,
    Path(id): Path<i64>,
    Json(payload): Json<VoucherVoid>,
) -> ApiResult<Voucher> {
    let restaurant_id = identity.tenant_id()?;
    validate_required_text(&payload.reason, "reason", MAX_NOTE_LEN)?;

    let existing = db::vouchers::find(&state.pool, restaurant_id, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::VoucherNotFound))?;
    if existing.status == VoucherStatus::Void {
        return Err(ErrorCode::VoucherAlreadyVoid.into());
    }

    let voucher = db::vouchers::void(&state.pool, restaurant_id, id, payload.reason.trim(), now_millis())
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::VoucherAlreadyVoid))?;

    tracing::info!(voucher = %voucher.number, "Voucher voided");
    record_audit(
        &state,
        &identity,
        "voucher.void",
        serde_json::json!({
            "voucher_id": id,
            "number": voucher.number,
            "kind": voucher.kind,
            "reason": payload.reason.trim(),
        }),
        &ip,
    )
    .await;
    Ok(Json(voucher))
}
