//! First-start superadmin

use rust_decimal::Decimal;
use shared::models::{Role, User};
use shared::util::{now_millis, snowflake_id};

use super::password::{check_password_policy, hash_password, normalize_email};
use crate::config::Config;
use crate::db;
use crate::error::BoxError;
use crate::state::AppState;

/// Create the configured superadmin when none exists yet
pub async fn ensure_superadmin(state: &AppState, config: &Config) -> Result<(), BoxError> {
    if db::users::any_superadmin(&state.pool).await? {
        return Ok(());
    }
    let (Some(email), Some(password)) = (&config.superadmin_email, &config.superadmin_password)
    else {
        tracing::warn!(
            "No superadmin exists; set SUPERADMIN_EMAIL and SUPERADMIN_PASSWORD to create one"
        );
        return Ok(());
    };
    check_password_policy(password).map_err(|e| e.message)?;

    let now = now_millis();
    let user = User {
        id: snowflake_id(),
        restaurant_id: None,
        role: Role::Superadmin,
        name: "Superadmin".to_string(),
        email: normalize_email(email),
        phone: None,
        position: None,
        monthly_salary: Decimal::ZERO,
        joined_on: None,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    let hashed = hash_password(password).map_err(|e| e.to_string())?;

    let mut conn = state.pool.acquire().await?;
    db::users::insert(&mut conn, &user, &hashed).await?;
    tracing::info!(email = %user.email, "Superadmin created");
    Ok(())
}
