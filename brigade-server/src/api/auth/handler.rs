//! Authentication handlers

use axum::extract::State;
use axum::{Extension, Json};
use shared::error::{AppError, ErrorCode};
use shared::models::{ChangePasswordRequest, DeviceTokenRequest, LoginRequest, LoginResponse, User};
use shared::util::now_millis;

use crate::api::{ApiResult, ClientIp};
use crate::auth::Identity;
use crate::auth::password::{check_password_policy, hash_or_internal, normalize_email, verify_password};
use crate::auth::rate_limit::too_many_requests;
use crate::db;
use crate::state::AppState;

/// FCM registration tokens are a few hundred bytes
const MAX_DEVICE_TOKEN_LEN: usize = 4096;

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ip: ClientIp,
    Json(req): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let email = normalize_email(&req.email);
    if let Some(wait) = state.rate_limiter.account_locked(&email).await {
        tracing::warn!(ip = %ip.0, "Login to locked account");
        return Err(too_many_requests(wait).into());
    }
    let Some(credentials) = db::users::find_credentials_by_email(&state.pool, &email).await? else {
        tracing::debug!(ip = %ip.0, "Login for unknown email");
        return Err(ErrorCode::InvalidCredentials.into());
    };

    if !verify_password(&req.password, &credentials.hashed_password) {
        tracing::warn!(user_id = credentials.user.id, ip = %ip.0, "Login with wrong password");
        state.rate_limiter.record_failure(&email).await;
        return Err(ErrorCode::InvalidCredentials.into());
    }
    state.rate_limiter.clear_account(&email).await;

    let user = credentials.user;
    if !user.is_active {
        return Err(ErrorCode::AccountDisabled.into());
    }
    if let Some(restaurant_id) = user.restaurant_id {
        let restaurant = db::restaurants::find(&state.pool, restaurant_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::TenantNotFound))?;
        if !restaurant.status.can_login() {
            tracing::warn!(user_id = user.id, restaurant_id, "Login to suspended restaurant");
            return Err(ErrorCode::TenantSuspended.into());
        }
    }

    let token = state.jwt.create_token(&user).map_err(|e| {
        tracing::error!("JWT creation failed: {e}");
        AppError::new(ErrorCode::InternalError)
    })?;

    if let Err(e) = db::audit::log(
        &state.pool,
        user.restaurant_id,
        user.id,
        "login",
        None,
        Some(&ip.0),
        now_millis(),
    )
    .await
    {
        tracing::warn!(error = %e, "Failed to write login audit entry");
    }

    tracing::info!(user_id = user.id, role = %user.role, "User logged in");
    Ok(Json(LoginResponse { token, user }))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<User> {
    let user = db::users::find(&state.pool, identity.user_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::EmployeeNotFound))?;
    Ok(Json(user))
}

/// POST /api/auth/change-password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<serde_json::Value> {
    let credentials = db::users::find_credentials(&state.pool, identity.user_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::EmployeeNotFound))?;

    if !verify_password(&req.current_password, &credentials.hashed_password) {
        return Err(AppError::with_message(
            ErrorCode::InvalidCredentials,
            "Current password is incorrect",
        )
        .into());
    }
    check_password_policy(&req.new_password)?;

    let hashed = hash_or_internal(&req.new_password)?;
    db::users::update_password(&state.pool, identity.user_id, &hashed, now_millis()).await?;

    tracing::info!(user_id = identity.user_id, "Password changed");
    Ok(Json(serde_json::json!({ "message": "Password changed" })))
}

/// PUT /api/auth/device-token
pub async fn register_device(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<DeviceTokenRequest>,
) -> ApiResult<serde_json::Value> {
    let token = req.token.trim();
    if token.is_empty() || token.len() > MAX_DEVICE_TOKEN_LEN {
        return Err(AppError::validation("token is empty or too long").into());
    }
    db::users::set_fcm_token(&state.pool, identity.user_id, Some(token)).await?;
    Ok(Json(serde_json::json!({ "registered": true })))
}

/// DELETE /api/auth/device-token
pub async fn clear_device(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<serde_json::Value> {
    db::users::set_fcm_token(&state.pool, identity.user_id, None).await?;
    Ok(Json(serde_json::json!({ "registered": false })))
}
