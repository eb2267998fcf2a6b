use rust_decimal::Decimal;
use shared::models::{AdvanceQuery, AdvanceRequest, AdvanceStatus};
use sqlx::{PgConnection, PgPool};

use crate::payroll::AdvanceAllocation;

pub async fn insert(conn: &mut PgConnection, a: &AdvanceRequest) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO advance_requests (id, restaurant_id, user_id, amount, reason, status,
                                      created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(a.id)
    .bind(a.restaurant_id)
    .bind(a.user_id)
    .bind(a.amount)
    .bind(&a.reason)
    .bind(a.status)
    .bind(a.created_at)
    .bind(a.updated_at)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn find(
    pool: &PgPool,
    restaurant_id: i64,
    id: i64,
) -> Result<Option<AdvanceRequest>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM advance_requests WHERE id = $1 AND restaurant_id = $2")
        .bind(id)
        .bind(restaurant_id)
        .fetch_optional(pool)
        .await
}

/// Row-locked read for the pay-out transaction
pub async fn find_for_update(
    conn: &mut PgConnection,
    restaurant_id: i64,
    id: i64,
) -> Result<Option<AdvanceRequest>, sqlx::Error> {
    sqlx::query_as(
        "SELECT * FROM advance_requests WHERE id = $1 AND restaurant_id = $2 FOR UPDATE",
    )
    .bind(id)
    .bind(restaurant_id)
    .fetch_optional(conn)
    .await
}

pub async fn list(
    pool: &PgPool,
    restaurant_id: i64,
    query: &AdvanceQuery,
) -> Result<Vec<AdvanceRequest>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT * FROM advance_requests
        WHERE restaurant_id = $1
            AND ($2::TEXT IS NULL OR status = $2)
            AND ($3::BIGINT IS NULL OR user_id = $3)
        ORDER BY created_at DESC
        LIMIT 500
        "#,
    )
    .bind(restaurant_id)
    .bind(query.status)
    .bind(query.user_id)
    .fetch_all(pool)
    .await
}

/// Approved advances plus the unrecovered part of paid ones
pub async fn outstanding_total(conn: &mut PgConnection, user_id: i64) -> Result<Decimal, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT COALESCE(SUM(amount - deducted_amount), 0) FROM advance_requests
         WHERE user_id = $1 AND status IN ('approved', 'paid')",
    )
    .bind(user_id)
    .fetch_one(conn)
    .await
}

/// Paid advances with a balance no payslip has reserved yet, oldest first,
/// locked until the payslip is written
pub async fn unrecovered(
    conn: &mut PgConnection,
    user_id: i64,
) -> Result<Vec<(i64, Decimal)>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT id, amount - deducted_amount FROM advance_requests
        WHERE user_id = $1 AND status = 'paid' AND deducted_amount < amount
        ORDER BY paid_at
        FOR UPDATE
        "#,
    )
    .bind(user_id)
    .fetch_all(conn)
    .await
}

/// Reserve each allocation against its advance for this payslip
pub async fn reserve_for_payslip(
    conn: &mut PgConnection,
    payslip_id: i64,
    allocations: &[AdvanceAllocation],
    now: i64,
) -> Result<(), sqlx::Error> {
    for allocation in allocations {
        sqlx::query(
            "INSERT INTO advance_deductions (payslip_id, advance_id, amount) VALUES ($1, $2, $3)",
        )
        .bind(payslip_id)
        .bind(allocation.advance_id)
        .bind(allocation.amount)
        .execute(&mut *conn)
        .await?;
        sqlx::query(
            r#"
            UPDATE advance_requests SET deducted_amount = deducted_amount + $2, updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(allocation.advance_id)
        .bind(allocation.amount)
        .bind(now)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// `paid → settled` for advances this payslip finished recovering and
/// whose earlier instalments are all on paid payslips
pub async fn settle(
    conn: &mut PgConnection,
    payslip_id: i64,
    now: i64,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE advance_requests a SET status = 'settled', settled_payment_id = $1, updated_at = $2
        WHERE a.status = 'paid'
            AND a.deducted_amount >= a.amount
            AND a.id IN (SELECT advance_id FROM advance_deductions WHERE payslip_id = $1)
            AND NOT EXISTS (
                SELECT 1 FROM advance_deductions d
                JOIN payslips p ON p.id = d.payslip_id
                WHERE d.advance_id = a.id AND p.status <> 'paid' AND p.id <> $1
            )
        "#,
    )
    .bind(payslip_id)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

/// Approve or reject a pending advance; `None` if it was decided concurrently
pub async fn decide(
    pool: &PgPool,
    restaurant_id: i64,
    id: i64,
    to: AdvanceStatus,
    decided_by: i64,
    note: Option<&str>,
    now: i64,
) -> Result<Option<AdvanceRequest>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE advance_requests SET
            status = $3, decided_by = $4, decision_note = $5, decided_at = $6, updated_at = $6
        WHERE id = $1 AND restaurant_id = $2 AND status = 'pending'
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(restaurant_id)
    .bind(to)
    .bind(decided_by)
    .bind(note)
    .bind(now)
    .fetch_optional(pool)
    .await
}

pub async fn mark_paid(
    conn: &mut PgConnection,
    id: i64,
    voucher_id: i64,
    now: i64,
) -> Result<AdvanceRequest, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE advance_requests SET status = 'paid', voucher_id = $2, paid_at = $3, updated_at = $3
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(voucher_id)
    .bind(now)
    .fetch_one(conn)
    .await
}

pub async fn count_pending(pool: &PgPool, restaurant_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM advance_requests WHERE restaurant_id = $1 AND status = 'pending'",
    )
    .bind(restaurant_id)
    .fetch_one(pool)
    .await
}
