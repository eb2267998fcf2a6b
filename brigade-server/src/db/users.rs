use rust_decimal::Decimal;
use shared::models::{EmployeeQuery, EmployeeUpdate, User};
use shared::response::PageQuery;
use sqlx::{PgConnection, PgPool};

use super::search_pattern;

/// Profile columns (everything except credentials and device token)
const USER_COLUMNS: &str = "id, restaurant_id, role, name, email, phone, position, \
     monthly_salary, joined_on, is_active, created_at, updated_at";

/// User row with its password hash, for login and password changes
#[derive(sqlx::FromRow)]
pub struct UserCredentials {
    #[sqlx(flatten)]
    pub user: User,
    pub hashed_password: String,
}

pub async fn insert(
    conn: &mut PgConnection,
    user: &User,
    hashed_password: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO users (id, restaurant_id, role, name, email, hashed_password, phone, position,
                           monthly_salary, joined_on, is_active, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        "#,
    )
    .bind(user.id)
    .bind(user.restaurant_id)
    .bind(user.role)
    .bind(&user.name)
    .bind(&user.email)
    .bind(hashed_password)
    .bind(&user.phone)
    .bind(&user.position)
    .bind(user.monthly_salary)
    .bind(user.joined_on)
    .bind(user.is_active)
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn find_credentials_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<UserCredentials>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {USER_COLUMNS}, hashed_password FROM users WHERE email = $1"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await
}

pub async fn find_credentials(
    pool: &PgPool,
    id: i64,
) -> Result<Option<UserCredentials>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {USER_COLUMNS}, hashed_password FROM users WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn find(
    conn: impl sqlx::Executor<'_, Database = sqlx::Postgres>,
    id: i64,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(conn)
        .await
}

/// User of a given restaurant (superadmins never match)
pub async fn find_in_restaurant(
    pool: &PgPool,
    restaurant_id: i64,
    id: i64,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND restaurant_id = $2"
    ))
    .bind(id)
    .bind(restaurant_id)
    .fetch_optional(pool)
    .await
}

pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
        .bind(email)
        .fetch_one(pool)
        .await
}

pub async fn any_superadmin(pool: &PgPool) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE role = 'superadmin')")
        .fetch_one(pool)
        .await
}

/// Employees and managers of a restaurant, paginated
pub async fn list_staff(
    pool: &PgPool,
    restaurant_id: i64,
    query: &EmployeeQuery,
    page: &PageQuery,
) -> Result<(Vec<User>, i64), sqlx::Error> {
    const FILTER: &str = r#"
        FROM users
        WHERE restaurant_id = $1
            AND role IN ('employee', 'manager')
            AND ($2::TEXT IS NULL OR role = $2)
            AND ($3::BOOLEAN IS NULL OR is_active = $3)
            AND ($4::TEXT IS NULL OR name ILIKE $4 OR email ILIKE $4 OR position ILIKE $4)
    "#;
    let search = search_pattern(query.search.as_deref());

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) {FILTER}"))
        .bind(restaurant_id)
        .bind(query.role)
        .bind(query.active)
        .bind(&search)
        .fetch_one(pool)
        .await?;

    let rows: Vec<User> = sqlx::query_as(&format!(
        "SELECT {USER_COLUMNS} {FILTER} ORDER BY name LIMIT $5 OFFSET $6"
    ))
    .bind(restaurant_id)
    .bind(query.role)
    .bind(query.active)
    .bind(&search)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    Ok((rows, total))
}

/// Active staff, for payroll runs
pub async fn active_staff(pool: &PgPool, restaurant_id: i64) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {USER_COLUMNS} FROM users
         WHERE restaurant_id = $1 AND is_active AND role IN ('employee', 'manager', 'admin')
         ORDER BY name"
    ))
    .bind(restaurant_id)
    .fetch_all(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    restaurant_id: i64,
    id: i64,
    data: &EmployeeUpdate,
    now: i64,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as(&format!(
        r#"
        UPDATE users SET
            name = COALESCE($3, name),
            phone = COALESCE($4, phone),
            position = COALESCE($5, position),
            role = COALESCE($6, role),
            monthly_salary = COALESCE($7, monthly_salary),
            joined_on = COALESCE($8, joined_on),
            is_active = COALESCE($9, is_active),
            updated_at = $10
        WHERE id = $1 AND restaurant_id = $2
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(restaurant_id)
    .bind(&data.name)
    .bind(&data.phone)
    .bind(&data.position)
    .bind(data.role)
    .bind(data.monthly_salary)
    .bind(data.joined_on)
    .bind(data.is_active)
    .bind(now)
    .fetch_optional(pool)
    .await
}

pub async fn set_active(
    pool: &PgPool,
    restaurant_id: i64,
    id: i64,
    active: bool,
    now: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE users SET is_active = $3, updated_at = $4 WHERE id = $1 AND restaurant_id = $2",
    )
    .bind(id)
    .bind(restaurant_id)
    .bind(active)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn update_password(
    pool: &PgPool,
    id: i64,
    hashed_password: &str,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET hashed_password = $2, updated_at = $3 WHERE id = $1")
        .bind(id)
        .bind(hashed_password)
        .bind(now)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn set_fcm_token(pool: &PgPool, id: i64, token: Option<&str>) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET fcm_token = $2 WHERE id = $1")
        .bind(id)
        .bind(token)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn fcm_token(pool: &PgPool, id: i64) -> Result<Option<String>, sqlx::Error> {
    let token: Option<Option<String>> =
        sqlx::query_scalar("SELECT fcm_token FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(token.flatten())
}

/// Salary used for the advance limit
pub async fn monthly_salary(
    conn: &mut PgConnection,
    restaurant_id: i64,
    id: i64,
) -> Result<Option<Decimal>, sqlx::Error> {
    sqlx::query_scalar("SELECT monthly_salary FROM users WHERE id = $1 AND restaurant_id = $2")
        .bind(id)
        .bind(restaurant_id)
        .fetch_optional(conn)
        .await
}

/// Lock a user row for the rest of the transaction
pub async fn lock(conn: &mut PgConnection, id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_takes_pool_or_transaction() {
        fn on_pool(pool: &PgPool) {
            drop(find(pool, 1));
        }
        fn in_transaction(conn: &mut sqlx::PgConnection) {
            drop(find(&mut *conn, 1));
        }
        let _ = (on_pool as fn(&PgPool), in_transaction as fn(&mut sqlx::PgConnection));
    }
}
