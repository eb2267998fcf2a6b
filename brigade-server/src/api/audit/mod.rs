//! Audit Log API Module

mod handler;

use axum::routing::get;
use axum::{Router, middleware};

use crate::auth::middleware::require_admin;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/audit", get(handler::list))
        .route_layer(middleware::from_fn(require_admin))
}
