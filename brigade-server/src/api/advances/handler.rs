//! Salary Advance API Handlers

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    AdvanceAction, AdvanceCreate, AdvanceDecision, AdvanceQuery, AdvanceRequest, AdvanceStatus,
    Month, Voucher, VoucherDraft, VoucherKind, within_limit,
};
use shared::util::{now_millis, snowflake_id};

use crate::api::{ApiResult, ClientIp, notify_user, record_audit, restaurant_today};
use crate::auth::Identity;
use crate::db;
use crate::notify::PushMessage;
use crate::state::AppState;
use crate::validation::{
    MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text, validate_positive_amount,
};

/// Paid advance with the voucher that documents the payout
#[derive(Debug, Serialize)]
pub struct AdvancePayout {
    pub advance: AdvanceRequest,
    pub voucher: Voucher,
}

fn next_status(advance: &AdvanceRequest, action: AdvanceAction) -> Result<AdvanceStatus, AppError> {
    advance.status.apply(action).ok_or_else(|| {
        AppError::new(ErrorCode::InvalidAdvanceTransition).with_detail("from", advance.status.as_str())
    })
}

/// POST /api/advances
///
/// The new amount plus everything still outstanding must fit in one
/// monthly salary. The user row is locked so two concurrent requests
/// cannot both pass the check.
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<AdvanceCreate>,
) -> ApiResult<AdvanceRequest> {
    let restaurant_id = identity.tenant_id()?;
    validate_positive_amount(payload.amount, "amount")?;
    validate_optional_text(&payload.reason, "reason", MAX_NOTE_LEN)?;

    let mut tx = state.pool.begin().await?;
    db::users::lock(&mut *tx, identity.user_id).await?;
    let salary = db::users::monthly_salary(&mut *tx, restaurant_id, identity.user_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::EmployeeNotFound))?;
    let outstanding = db::advances::outstanding_total(&mut *tx, identity.user_id).await?;
    if !within_limit(payload.amount, outstanding, salary) {
        return Err(AppError::new(ErrorCode::AdvanceLimitExceeded)
            .with_detail("limit", salary.to_string())
            .with_detail("outstanding", outstanding.to_string())
            .with_detail("available", (salary - outstanding).max(Decimal::ZERO).to_string())
            .into());
    }

    let now = now_millis();
    let advance = AdvanceRequest {
        id: snowflake_id(),
        restaurant_id,
        user_id: identity.user_id,
        amount: payload.amount,
        reason: payload.reason,
        status: AdvanceStatus::Pending,
        decided_by: None,
        decision_note: None,
        decided_at: None,
        voucher_id: None,
        paid_at: None,
        deducted_amount: Decimal::ZERO,
        settled_payment_id: None,
        created_at: now,
        updated_at: now,
    };
    db::advances::insert(&mut *tx, &advance).await?;
    tx.commit().await?;

    tracing::info!(advance_id = advance.id, amount = %advance.amount, "Advance requested");
    Ok(Json(advance))
}

/// GET /api/advances
pub async fn list(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(mut query): Query<AdvanceQuery>,
) -> ApiResult<Vec<AdvanceRequest>> {
    let restaurant_id = identity.tenant_id()?;
    query.user_id = identity.scope_user(query.user_id);
    Ok(Json(db::advances::list(&state.pool, restaurant_id, &query).await?))
}

async fn decide(
    state: &AppState,
    identity: &Identity,
    ip: &ClientIp,
    id: i64,
    action: AdvanceAction,
    note: Option<String>,
) -> ApiResult<AdvanceRequest> {
    let restaurant_id = identity.tenant_id()?;
    let note = note.filter(|n| !n.trim().is_empty());
    validate_optional_text(&note, "note", MAX_NOTE_LEN)?;

    let existing = db::advances::find(&state.pool, restaurant_id, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::AdvanceNotFound))?;
    let to = next_status(&existing, action)?;

    let advance = db::advances::decide(
        &state.pool,
        restaurant_id,
        id,
        to,
        identity.user_id,
        note.as_deref(),
        now_millis(),
    )
    .await?
    .ok_or_else(|| AppError::new(ErrorCode::InvalidAdvanceTransition))?;

    record_audit(
        state,
        identity,
        &format!("advance.{}", to.as_str()),
        serde_json::json!({
            "advance_id": id,
            "user_id": advance.user_id,
            "amount": advance.amount.to_string(),
        }),
        ip,
    )
    .await;
    let title = if to == AdvanceStatus::Approved {
        "Advance approved"
    } else {
        "Advance rejected"
    };
    notify_user(
        state,
        advance.user_id,
        PushMessage::new(title, format!("Amount: {}", advance.amount)).with_data("advance_id", id),
    )
    .await;
    Ok(Json(advance))
}

/// POST /api/advances/{id}/approve
pub async fn approve(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ip: ClientIp,
    Path(id): Path<i64>,
    payload: Option<Json<AdvanceDecision>>,
) -> ApiResult<AdvanceRequest> {
    let note = payload.and_then(|Json(d)| d.note);
    decide(&state, &identity, &ip, id, AdvanceAction::Approve, note).await
}

/// POST /api/advances/{id}/reject
pub async fn reject(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ip: ClientIp,
    Path(id): Path<i64>,
    payload: Option<Json<AdvanceDecision>>,
) -> ApiResult<AdvanceRequest> {
    let note = payload.and_then(|Json(d)| d.note);
    decide(&state, &identity, &ip, id, AdvanceAction::Reject, note).await
}

/// POST /api/advances/{id}/pay
///
/// `approved → paid`, issuing an advance voucher in the same transaction.
pub async fn pay(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ip: ClientIp,
    Path(id): Path<i64>,
    payload: Option<Json<AdvanceDecision>>,
) -> ApiResult<AdvancePayout> {
    let restaurant_id = identity.tenant_id()?;
    let method = payload
        .and_then(|Json(d)| d.method)
        .filter(|m| !m.trim().is_empty());
    validate_optional_text(&method, "method", MAX_SHORT_TEXT_LEN)?;

    let month = Month::of(restaurant_today(&state, restaurant_id).await?);
    let now = now_millis();

    let mut tx = state.pool.begin().await?;
    let existing = db::advances::find_for_update(&mut *tx, restaurant_id, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::AdvanceNotFound))?;
    next_status(&existing, AdvanceAction::Pay)?;

    let payee = db::users::find(&mut *tx, existing.user_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::EmployeeNotFound))?;
    let voucher = db::vouchers::issue(
        &mut *tx,
        restaurant_id,
        identity.user_id,
        &month,
        VoucherDraft {
            kind: VoucherKind::Advance,
            payee_user_id: Some(payee.id),
            payee_name: payee.name,
            amount: existing.amount,
            description: existing.reason.clone().or_else(|| Some("Salary advance".to_string())),
            reference_id: Some(existing.id),
            method,
        },
        now,
    )
    .await?;
    let advance = db::advances::mark_paid(&mut *tx, id, voucher.id, now).await?;
    tx.commit().await?;

    tracing::info!(
        advance_id = id,
        voucher = %voucher.number,
        amount = %advance.amount,
        "Advance paid"
    );
    record_audit(
        &state,
        &identity,
        "advance.pay",
        serde_json::json!({
            "advance_id": id,
            "voucher_id": voucher.id,
            "voucher_number": voucher.number,
            "amount": advance.amount.to_string(),
        }),
        &ip,
    )
    .await;
    notify_user(
        &state,
        advance.user_id,
        PushMessage::new("Advance paid", format!("Amount: {}", advance.amount))
            .with_data("advance_id", id),
    )
    .await;
    Ok(Json(AdvancePayout { advance, voucher }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn advance(status: AdvanceStatus) -> AdvanceRequest {
        AdvanceRequest {
            id: 1,
            restaurant_id: 1,
            user_id: 2,
            amount: Decimal::new(300, 0),
            reason: None,
            status,
            decided_by: None,
            decision_note: None,
            decided_at: None,
            voucher_id: None,
            paid_at: None,
            deducted_amount: Decimal::ZERO,
            settled_payment_id: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn pay_requires_approval() {
        let err = next_status(&advance(AdvanceStatus::Pending), AdvanceAction::Pay).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidAdvanceTransition);
        assert_eq!(err.details.unwrap()["from"], "pending");
        assert_eq!(
            next_status(&advance(AdvanceStatus::Approved), AdvanceAction::Pay).unwrap(),
            AdvanceStatus::Paid
        );
    }

    #[test]
    fn decided_advances_stay_decided() {
        for status in [AdvanceStatus::Approved, AdvanceStatus::Rejected, AdvanceStatus::Settled] {
            assert!(next_status(&advance(status), AdvanceAction::Approve).is_err());
            assert!(next_status(&advance(status), AdvanceAction::Reject).is_err());
        }
    }
}
