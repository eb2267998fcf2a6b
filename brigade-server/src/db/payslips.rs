use rust_decimal::Decimal;
use shared::models::{PayrollQuery, PayrollSummary, Payslip};
use sqlx::{PgConnection, PgPool};

/// Insert unless the employee already has a payslip for the month.
/// Returns `false` when the row already existed.
pub async fn insert(conn: &mut PgConnection, p: &Payslip) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO payslips (id, restaurant_id, user_id, month, monthly_salary, days_in_month,
                              paid_days, gross, advance_deduction, bonus, other_deduction, net,
                              status, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        ON CONFLICT (user_id, month) DO NOTHING
        "#,
    )
    .bind(p.id)
    .bind(p.restaurant_id)
    .bind(p.user_id)
    .bind(&p.month)
    .bind(p.monthly_salary)
    .bind(p.days_in_month)
    .bind(p.paid_days)
    .bind(p.gross)
    .bind(p.advance_deduction)
    .bind(p.bonus)
    .bind(p.other_deduction)
    .bind(p.net)
    .bind(p.status)
    .bind(p.created_at)
    .bind(p.updated_at)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn exists(pool: &PgPool, user_id: i64, month: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM payslips WHERE user_id = $1 AND month = $2)")
        .bind(user_id)
        .bind(month)
        .fetch_one(pool)
        .await
}

pub async fn find(
    pool: &PgPool,
    restaurant_id: i64,
    id: i64,
) -> Result<Option<Payslip>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM payslips WHERE id = $1 AND restaurant_id = $2")
        .bind(id)
        .bind(restaurant_id)
        .fetch_optional(pool)
        .await
}

pub async fn find_for_update(
    conn: &mut PgConnection,
    restaurant_id: i64,
    id: i64,
) -> Result<Option<Payslip>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM payslips WHERE id = $1 AND restaurant_id = $2 FOR UPDATE")
        .bind(id)
        .bind(restaurant_id)
        .fetch_optional(conn)
        .await
}

pub async fn list(
    pool: &PgPool,
    restaurant_id: i64,
    query: &PayrollQuery,
) -> Result<Vec<Payslip>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT * FROM payslips
        WHERE restaurant_id = $1
            AND ($2::TEXT IS NULL OR month = $2)
            AND ($3::BIGINT IS NULL OR user_id = $3)
            AND ($4::TEXT IS NULL OR status = $4)
        ORDER BY month DESC, user_id
        LIMIT 1000
        "#,
    )
    .bind(restaurant_id)
    .bind(query.month.map(|m| m.to_string()))
    .bind(query.user_id)
    .bind(query.status)
    .fetch_all(pool)
    .await
}

/// Rewrite the adjustable figures of a pending payslip
pub async fn adjust(
    pool: &PgPool,
    p: &Payslip,
) -> Result<Option<Payslip>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE payslips SET bonus = $3, other_deduction = $4, net = $5, note = $6, updated_at = $7
        WHERE id = $1 AND restaurant_id = $2 AND status = 'pending'
        RETURNING *
        "#,
    )
    .bind(p.id)
    .bind(p.restaurant_id)
    .bind(p.bonus)
    .bind(p.other_deduction)
    .bind(p.net)
    .bind(&p.note)
    .bind(p.updated_at)
    .fetch_optional(pool)
    .await
}

pub async fn mark_paid(
    conn: &mut PgConnection,
    id: i64,
    method: &str,
    voucher_id: Option<i64>,
    now: i64,
) -> Result<Payslip, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE payslips SET status = 'paid', method = $2, voucher_id = $3, paid_at = $4, updated_at = $4
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(method)
    .bind(voucher_id)
    .bind(now)
    .fetch_one(conn)
    .await
}

pub async fn summary(
    pool: &PgPool,
    restaurant_id: i64,
    month: &str,
) -> Result<PayrollSummary, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT
            COUNT(*) AS payslips,
            COALESCE(SUM(gross), 0) AS gross,
            COALESCE(SUM(advance_deduction), 0) AS advance_deduction,
            COALESCE(SUM(bonus), 0) AS bonus,
            COALESCE(SUM(other_deduction), 0) AS other_deduction,
            COALESCE(SUM(net), 0) AS net,
            COALESCE(SUM(net) FILTER (WHERE status = 'paid'), 0) AS paid,
            COALESCE(SUM(net) FILTER (WHERE status = 'pending'), 0) AS pending
        FROM payslips
        WHERE restaurant_id = $1 AND month = $2
        "#,
    )
    .bind(restaurant_id)
    .bind(month)
    .fetch_one(pool)
    .await
}

/// Net payroll of one restaurant for one month
pub async fn net_total(pool: &PgPool, restaurant_id: i64, month: &str) -> Result<Decimal, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT COALESCE(SUM(net), 0) FROM payslips WHERE restaurant_id = $1 AND month = $2",
    )
    .bind(restaurant_id)
    .bind(month)
    .fetch_one(pool)
    .await
}
