//! Restaurant (tenant) management API, superadmin only

mod handler;

use axum::routing::{get, put};
use axum::{Router, middleware};

use crate::auth::middleware::require_superadmin;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/restaurants", get(handler::list).post(handler::create))
        .route(
            "/api/admin/restaurants/{id}",
            get(handler::get_by_id).patch(handler::update),
        )
        .route("/api/admin/restaurants/{id}/status", put(handler::set_status))
        .route("/api/admin/overview", get(handler::overview))
        .route_layer(middleware::from_fn(require_superadmin))
}
