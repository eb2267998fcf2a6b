//! JWT authentication and role-gate middleware

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::error::AppError;
use shared::models::Role;

use super::{Identity, JwtError};
use crate::state::AppState;

/// Verify the bearer token and attach the caller's [`Identity`] to the request
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(AppError::unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::invalid_token("Invalid Authorization format"))?;

    let identity = state.jwt.verify(token).map_err(|e| {
        tracing::debug!("JWT validation failed: {e}");
        match e {
            JwtError::Expired => AppError::token_expired(),
            _ => AppError::invalid_token("Invalid or expired token"),
        }
    })?;

    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

async fn require(min: Role, request: Request, next: Next) -> Result<Response, AppError> {
    let identity = request
        .extensions()
        .get::<Identity>()
        .ok_or_else(AppError::unauthorized)?;
    if let Err(e) = identity.ensure_role(min) {
        tracing::warn!(
            user_id = identity.user_id,
            role = %identity.role,
            path = %request.uri().path(),
            "Role check failed"
        );
        return Err(e);
    }
    Ok(next.run(request).await)
}

/// Manager, admin or superadmin
pub async fn require_manager(request: Request, next: Next) -> Result<Response, AppError> {
    require(Role::Manager, request, next).await
}

pub async fn require_admin(request: Request, next: Next) -> Result<Response, AppError> {
    require(Role::Admin, request, next).await
}

pub async fn require_superadmin(request: Request, next: Next) -> Result<Response, AppError> {
    require(Role::Superadmin, request, next).await
}
