//! Salary Advance API Module

mod handler;

use axum::routing::{get, post};
use axum::{Router, middleware};

use crate::auth::middleware::require_admin;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    let staff_routes =
        Router::new().route("/api/advances", get(handler::list).post(handler::create));

    // Money decisions are admin-only
    let admin_routes = Router::new()
        .route("/api/advances/{id}/approve", post(handler::approve))
        .route("/api/advances/{id}/reject", post(handler::reject))
        .route("/api/advances/{id}/pay", post(handler::pay))
        .route_layer(middleware::from_fn(require_admin));

    staff_routes.merge(admin_routes)
}
