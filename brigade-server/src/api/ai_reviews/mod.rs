//! AI Review API Module

mod handler;

use axum::routing::{get, post};
use axum::{Router, middleware};

use crate::auth::middleware::require_manager;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/ai-reviews", get(handler::list))
        .route("/api/ai-reviews/{id}", get(handler::get_by_id))
        .route("/api/ai-reviews/{id}/override", post(handler::override_review))
        .route_layer(middleware::from_fn(require_manager))
}
