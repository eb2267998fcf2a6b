//! Employee API Module

mod handler;

use axum::routing::{delete, get};
use axum::{Router, middleware};

use crate::auth::middleware::{require_admin, require_manager};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    // Managers run day-to-day staff records
    let manage_routes = Router::new()
        .route("/api/employees", get(handler::list).post(handler::create))
        .route("/api/employees/{id}", get(handler::get_by_id).patch(handler::update))
        .route_layer(middleware::from_fn(require_manager));

    // Deactivation is admin-only
    let admin_routes = Router::new()
        .route("/api/employees/{id}", delete(handler::deactivate))
        .route_layer(middleware::from_fn(require_admin));

    manage_routes.merge(admin_routes)
}
