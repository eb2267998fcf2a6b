//! Task API Module
//!
//! Workflow: managers assign, assignees start and submit a photo, managers
//! approve or reject. Submission runs the AI photo review inline.

mod handler;

use axum::routing::{get, patch, post};
use axum::{Router, middleware};

use crate::auth::middleware::require_manager;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    // Assignee actions and reads; ownership is checked in the handlers
    let staff_routes = Router::new()
        .route("/api/tasks", get(handler::list))
        .route("/api/tasks/{id}", get(handler::get_by_id))
        .route("/api/tasks/{id}/start", post(handler::start))
        .route("/api/tasks/{id}/submit", post(handler::submit));

    let manage_routes = Router::new()
        .route("/api/tasks", post(handler::create))
        .route("/api/tasks/{id}", patch(handler::update))
        .route("/api/tasks/{id}/approve", post(handler::approve))
        .route("/api/tasks/{id}/reject", post(handler::reject))
        .route("/api/tasks/{id}/cancel", post(handler::cancel))
        .route("/api/tasks/{id}/ai-review", post(handler::rerun_review))
        .route_layer(middleware::from_fn(require_manager));

    staff_routes.merge(manage_routes)
}
