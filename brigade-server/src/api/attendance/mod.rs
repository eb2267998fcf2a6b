//! Attendance API Module

mod handler;

use axum::routing::{get, post, put};
use axum::{Router, middleware};

use crate::auth::middleware::require_manager;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    let staff_routes = Router::new()
        .route("/api/attendance", get(handler::list))
        .route("/api/attendance/check-in", post(handler::check_in))
        .route("/api/attendance/check-out", post(handler::check_out));

    let manage_routes = Router::new()
        .route("/api/attendance/summary", get(handler::summary))
        .route("/api/attendance/{id}", put(handler::update))
        .route_layer(middleware::from_fn(require_manager));

    staff_routes.merge(manage_routes)
}
