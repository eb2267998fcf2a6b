use shared::models::{
    Month, Voucher, VoucherDraft, VoucherQuery, VoucherStatus, format_voucher_number,
};
use sqlx::{PgConnection, PgPool};

/// Next sequence number for the restaurant/month.
///
/// The counter row is created on first use and incremented in place; the
/// row lock serialises concurrent issuers until their transaction ends.
pub async fn next_seq(
    conn: &mut PgConnection,
    restaurant_id: i64,
    month: &Month,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        INSERT INTO voucher_counters (restaurant_id, month, last_seq)
        VALUES ($1, $2, 1)
        ON CONFLICT (restaurant_id, month)
            DO UPDATE SET last_seq = voucher_counters.last_seq + 1
        RETURNING last_seq
        "#,
    )
    .bind(restaurant_id)
    .bind(month.to_string())
    .fetch_one(conn)
    .await
}

/// Number and insert a voucher inside the caller's transaction
pub async fn issue(
    conn: &mut PgConnection,
    restaurant_id: i64,
    issued_by: i64,
    month: &Month,
    draft: VoucherDraft,
    now: i64,
) -> Result<Voucher, sqlx::Error> {
    let seq = next_seq(&mut *conn, restaurant_id, month).await?;
    let voucher = Voucher {
        id: shared::util::snowflake_id(),
        restaurant_id,
        kind: draft.kind,
        number: format_voucher_number(month, seq),
        payee_user_id: draft.payee_user_id,
        payee_name: draft.payee_name,
        amount: draft.amount,
        description: draft.description,
        reference_id: draft.reference_id,
        method: draft.method,
        status: VoucherStatus::Issued,
        void_reason: None,
        issued_by,
        created_at: now,
        voided_at: None,
    };

    sqlx::query(
        r#"
        INSERT INTO vouchers (id, restaurant_id, kind, number, payee_user_id, payee_name, amount,
                              description, reference_id, method, status, issued_by, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        "#,
    )
    .bind(voucher.id)
    .bind(voucher.restaurant_id)
    .bind(voucher.kind)
    .bind(&voucher.number)
    .bind(voucher.payee_user_id)
    .bind(&voucher.payee_name)
    .bind(voucher.amount)
    .bind(&voucher.description)
    .bind(voucher.reference_id)
    .bind(&voucher.method)
    .bind(voucher.status)
    .bind(voucher.issued_by)
    .bind(voucher.created_at)
    .execute(conn)
    .await?;

    Ok(voucher)
}

pub async fn find(
    pool: &PgPool,
    restaurant_id: i64,
    id: i64,
) -> Result<Option<Voucher>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM vouchers WHERE id = $1 AND restaurant_id = $2")
        .bind(id)
        .bind(restaurant_id)
        .fetch_optional(pool)
        .await
}

/// The month filter matches the number prefix, so it follows the month the
/// voucher was numbered in.
pub async fn list(
    pool: &PgPool,
    restaurant_id: i64,
    query: &VoucherQuery,
) -> Result<Vec<Voucher>, sqlx::Error> {
    let prefix = query.month.map(|m| format!("V{}-%", m.compact()));
    sqlx::query_as(
        r#"
        SELECT * FROM vouchers
        WHERE restaurant_id = $1
            AND ($2::TEXT IS NULL OR kind = $2)
            AND ($3::TEXT IS NULL OR number LIKE $3)
            AND ($4::TEXT IS NULL OR status = $4)
        ORDER BY number DESC
        LIMIT 1000
        "#,
    )
    .bind(restaurant_id)
    .bind(query.kind)
    .bind(prefix)
    .bind(query.status)
    .fetch_all(pool)
    .await
}

/// `issued → void`; `None` if the voucher was already void
pub async fn void(
    pool: &PgPool,
    restaurant_id: i64,
    id: i64,
    reason: &str,
    now: i64,
) -> Result<Option<Voucher>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE vouchers SET status = 'void', void_reason = $3, voided_at = $4
        WHERE id = $1 AND restaurant_id = $2 AND status = 'issued'
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(restaurant_id)
    .bind(reason)
    .bind(now)
    .fetch_optional(pool)
    .await
}
