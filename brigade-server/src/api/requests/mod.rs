//! Staff Request API Module

mod handler;

use axum::routing::{get, post};
use axum::{Router, middleware};

use crate::auth::middleware::require_manager;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    let staff_routes = Router::new()
        .route("/api/requests", get(handler::list).post(handler::create))
        .route("/api/requests/{id}/cancel", post(handler::cancel));

    let manage_routes = Router::new()
        .route("/api/requests/{id}/approve", post(handler::approve))
        .route("/api/requests/{id}/reject", post(handler::reject))
        .route_layer(middleware::from_fn(require_manager));

    staff_routes.merge(manage_routes)
}
