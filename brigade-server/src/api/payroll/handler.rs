//! Payroll API Handlers

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    Month, PayrollQuery, PayrollRunRequest, PayrollRunResult, PayrollSummary,
    PayrollSummaryQuery, Payslip, PayslipPay, PayslipStatus, PayslipUpdate, User, Voucher,
    VoucherDraft, VoucherKind,
};
use shared::util::{now_millis, snowflake_id};

use crate::api::{ApiResult, ClientIp, notify_user, record_audit, restaurant_today};
use crate::auth::Identity;
use crate::db;
use crate::error::ServiceResult;
use crate::notify::PushMessage;
use crate::payroll::{net_pay, plan_payslip};
use crate::state::AppState;
use crate::validation::{
    MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_non_negative_amount, validate_optional_text,
    validate_required_text,
};

/// Paid payslip with its voucher and the advances it settled
#[derive(Debug, Serialize)]
pub struct PayslipPayout {
    pub payslip: Payslip,
    /// `None` when nothing was left to pay out
    pub voucher: Option<Voucher>,
    pub settled_advances: u64,
}

/// Apply bonus/deduction edits and recompute net pay
fn apply_adjustment(payslip: &mut Payslip, update: PayslipUpdate, now: i64) -> Result<(), AppError> {
    if payslip.status == PayslipStatus::Paid {
        return Err(AppError::new(ErrorCode::PayslipAlreadyPaid));
    }
    if let Some(bonus) = update.bonus {
        validate_non_negative_amount(bonus, "bonus")?;
        payslip.bonus = bonus;
    }
    if let Some(other) = update.other_deduction {
        validate_non_negative_amount(other, "other_deduction")?;
        payslip.other_deduction = other;
    }
    if update.note.is_some() {
        payslip.note = update.note;
    }

    let net = net_pay(
        payslip.gross,
        payslip.advance_deduction,
        payslip.bonus,
        payslip.other_deduction,
    );
    if net < Decimal::ZERO {
        return Err(AppError::new(ErrorCode::NegativeNetPay).with_detail("net", net.to_string()));
    }
    payslip.net = net;
    payslip.updated_at = now;
    Ok(())
}

/// Create one pending payslip and reserve the advance balances it recovers.
/// Returns `None` if a concurrent run already created it.
async fn create_payslip(
    state: &AppState,
    restaurant_id: i64,
    user: &User,
    month: &Month,
) -> ServiceResult<Option<Payslip>> {
    let tally =
        db::attendance::tally(&state.pool, user.id, month.first_day(), month.last_day()).await?;

    let mut tx = state.pool.begin().await?;
    let advances = db::advances::unrecovered(&mut *tx, user.id).await?;
    let (figures, allocations) = plan_payslip(user.monthly_salary, month, tally, &advances);

    let now = now_millis();
    let payslip = Payslip {
        id: snowflake_id(),
        restaurant_id,
        user_id: user.id,
        month: month.to_string(),
        monthly_salary: user.monthly_salary,
        days_in_month: figures.days_in_month,
        paid_days: figures.paid_days,
        gross: figures.gross,
        advance_deduction: figures.advance_deduction,
        bonus: figures.bonus,
        other_deduction: figures.other_deduction,
        net: figures.net,
        status: PayslipStatus::Pending,
        method: None,
        note: None,
        paid_at: None,
        voucher_id: None,
        created_at: now,
        updated_at: now,
    };
    if !db::payslips::insert(&mut *tx, &payslip).await? {
        return Ok(None);
    }
    db::advances::reserve_for_payslip(&mut *tx, payslip.id, &allocations, now).await?;
    tx.commit().await?;

    let outstanding: Decimal = advances.iter().map(|(_, balance)| *balance).sum();
    if outstanding > payslip.advance_deduction {
        tracing::info!(
            user_id = user.id,
            carried_over = %(outstanding - payslip.advance_deduction),
            "Advance balance carried to a later payslip"
        );
    }
    Ok(Some(payslip))
}

/// POST /api/payroll/run
pub async fn run(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ip: ClientIp,
    Json(payload): Json<PayrollRunRequest>,
) -> ApiResult<PayrollRunResult> {
    let restaurant_id = identity.tenant_id()?;
    let month = payload.month;
    let month_key = month.to_string();

    let staff = db::users::active_staff(&state.pool, restaurant_id).await?;
    let mut payslips = Vec::new();
    let mut skipped = 0;
    for user in &staff {
        if db::payslips::exists(&state.pool, user.id, &month_key).await? {
            skipped += 1;
            continue;
        }
        match create_payslip(&state, restaurant_id, user, &month).await? {
            Some(payslip) => payslips.push(payslip),
            None => skipped += 1,
        }
    }

    tracing::info!(
        restaurant_id,
        month = %month,
        created = payslips.len(),
        skipped,
        "Payroll run finished"
    );
    record_audit(
        &state,
        &identity,
        "payroll.run",
        serde_json::json!({ "month": month_key, "created": payslips.len(), "skipped": skipped }),
        &ip,
    )
    .await;
    Ok(Json(PayrollRunResult {
        month,
        created: payslips.len(),
        skipped,
        payslips,
    }))
}

/// GET /api/payroll
pub async fn list(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(mut query): Query<PayrollQuery>,
) -> ApiResult<Vec<Payslip>> {
    let restaurant_id = identity.tenant_id()?;
    query.user_id = identity.scope_user(query.user_id);
    Ok(Json(db::payslips::list(&state.pool, restaurant_id, &query).await?))
}

/// GET /api/payroll/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
) -> ApiResult<Payslip> {
    let restaurant_id = identity.tenant_id()?;
    let payslip = db::payslips::find(&state.pool, restaurant_id, id)
        .await?
        .filter(|p| identity.can_view_user(p.user_id))
        .ok_or_else(|| AppError::new(ErrorCode::PayslipNotFound))?;
    Ok(Json(payslip))
}

/// PATCH /api/payroll/{id}
pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
    Json(payload): Json<PayslipUpdate>,
) -> ApiResult<Payslip> {
    let restaurant_id = identity.tenant_id()?;
    validate_optional_text(&payload.note, "note", MAX_NOTE_LEN)?;

    let mut payslip = db::payslips::find(&state.pool, restaurant_id, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::PayslipNotFound))?;
    apply_adjustment(&mut payslip, payload, now_millis())?;

    let payslip = db::payslips::adjust(&state.pool, &payslip)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::PayslipAlreadyPaid))?;
    Ok(Json(payslip))
}

/// POST /api/payroll/{id}/pay
///
/// `pending → paid`: issues the salary voucher and settles the advances
/// the payslip deducted, all in one transaction.
pub async fn pay(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ip: ClientIp,
    Path(id): Path<i64>,
    Json(payload): Json<PayslipPay>,
) -> ApiResult<PayslipPayout> {
    let restaurant_id = identity.tenant_id()?;
    validate_required_text(&payload.method, "method", MAX_SHORT_TEXT_LEN)?;
    let method = payload.method.trim();

    let voucher_month = Month::of(restaurant_today(&state, restaurant_id).await?);
    let now = now_millis();

    let mut tx = state.pool.begin().await?;
    let existing = db::payslips::find_for_update(&mut *tx, restaurant_id, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::PayslipNotFound))?;
    if existing.status == PayslipStatus::Paid {
        return Err(ErrorCode::PayslipAlreadyPaid.into());
    }

    let voucher = if existing.net > Decimal::ZERO {
        let payee = db::users::find(&mut *tx, existing.user_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::EmployeeNotFound))?;
        Some(
            db::vouchers::issue(
                &mut *tx,
                restaurant_id,
                identity.user_id,
                &voucher_month,
                VoucherDraft {
                    kind: VoucherKind::Salary,
                    payee_user_id: Some(payee.id),
                    payee_name: payee.name,
                    amount: existing.net,
                    description: Some(format!("Salary {}", existing.month)),
                    reference_id: Some(existing.id),
                    method: Some(method.to_string()),
                },
                now,
            )
            .await?,
        )
    } else {
        None
    };

    let payslip =
        db::payslips::mark_paid(&mut *tx, id, method, voucher.as_ref().map(|v| v.id), now).await?;
    let settled_advances = db::advances::settle(&mut *tx, id, now).await?;
    tx.commit().await?;

    tracing::info!(
        payslip_id = id,
        net = %payslip.net,
        settled_advances,
        "Payslip paid"
    );
    record_audit(
        &state,
        &identity,
        "payroll.pay",
        serde_json::json!({
            "payslip_id": id,
            "user_id": payslip.user_id,
            "month": payslip.month,
            "net": payslip.net.to_string(),
            "voucher_number": voucher.as_ref().map(|v| v.number.clone()),
        }),
        &ip,
    )
    .await;
    notify_user(
        &state,
        payslip.user_id,
        PushMessage::new("Salary paid", format!("{}: {}", payslip.month, payslip.net))
            .with_data("payslip_id", id),
    )
    .await;

    Ok(Json(PayslipPayout {
        payslip,
        voucher,
        settled_advances,
    }))
}

/// GET /api/payroll/summary?month=YYYY-MM
pub async fn summary(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<PayrollSummaryQuery>,
) -> ApiResult<PayrollSummary> {
    let restaurant_id = identity.tenant_id()?;
    let summary =
        db::payslips::summary(&state.pool, restaurant_id, &query.month.to_string()).await?;
    Ok(Json(summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn payslip(status: PayslipStatus) -> Payslip {
        Payslip {
            id: 1,
            restaurant_id: 1,
            user_id: 2,
            month: "2026-09".into(),
            monthly_salary: dec("3000"),
            days_in_month: 30,
            paid_days: dec("30"),
            gross: dec("3000"),
            advance_deduction: dec("500"),
            bonus: Decimal::ZERO,
            other_deduction: Decimal::ZERO,
            net: dec("2500"),
            status,
            method: None,
            note: None,
            paid_at: None,
            voucher_id: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn adjustment_recomputes_net() {
        let mut p = payslip(PayslipStatus::Pending);
        let update = PayslipUpdate {
            bonus: Some(dec("150.50")),
            other_deduction: Some(dec("50")),
            note: Some("Overtime".into()),
        };
        apply_adjustment(&mut p, update, 7).unwrap();
        assert_eq!(p.net, dec("2600.50"));
        assert_eq!(p.note.as_deref(), Some("Overtime"));
        assert_eq!(p.updated_at, 7);
    }

    #[test]
    fn net_may_reach_zero_but_not_below() {
        let mut p = payslip(PayslipStatus::Pending);
        let update = PayslipUpdate {
            other_deduction: Some(dec("2500")),
            ..Default::default()
        };
        apply_adjustment(&mut p, update, 0).unwrap();
        assert!(p.net.is_zero());

        let mut p = payslip(PayslipStatus::Pending);
        let update = PayslipUpdate {
            other_deduction: Some(dec("2500.01")),
            ..Default::default()
        };
        assert_eq!(
            apply_adjustment(&mut p, update, 0).unwrap_err().code,
            ErrorCode::NegativeNetPay
        );
    }

    #[test]
    fn paid_payslips_are_frozen() {
        let mut p = payslip(PayslipStatus::Paid);
        let err = apply_adjustment(&mut p, PayslipUpdate::default(), 0).unwrap_err();
        assert_eq!(err.code, ErrorCode::PayslipAlreadyPaid);
    }

    #[test]
    fn negative_bonus_rejected() {
        let mut p = payslip(PayslipStatus::Pending);
        let update = PayslipUpdate {
            bonus: Some(dec("-1")),
            ..Default::default()
        };
        assert!(apply_adjustment(&mut p, update, 0).is_err());
    }
}
