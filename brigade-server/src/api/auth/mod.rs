//! Authentication API

mod handler;

use axum::routing::{get, post, put};
use axum::{Router, middleware};

use crate::auth::rate_limit::login_rate_limit;
use crate::state::AppState;

/// Login, rate limited per client IP
pub fn public_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(handler::login))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            login_rate_limit,
        ))
}

pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/me", get(handler::me))
        .route("/api/auth/change-password", post(handler::change_password))
        .route(
            "/api/auth/device-token",
            put(handler::register_device).delete(handler::clear_device),
        )
}
