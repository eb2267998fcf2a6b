//! SOP API Module

mod handler;

use axum::routing::{get, patch, post};
use axum::{Router, middleware};

use crate::auth::middleware::require_manager;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    // Every staff member can read the procedures
    let read_routes = Router::new()
        .route("/api/sops", get(handler::list))
        .route("/api/sops/{id}", get(handler::get_by_id));

    let manage_routes = Router::new()
        .route("/api/sops", post(handler::create))
        .route(
            "/api/sops/{id}",
            patch(handler::update).delete(handler::delete),
        )
        .route_layer(middleware::from_fn(require_manager));

    read_routes.merge(manage_routes)
}
