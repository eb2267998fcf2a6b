//! Dashboard and Report API Module

mod handler;

use axum::routing::get;
use axum::{Router, middleware};

use crate::auth::middleware::require_manager;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/dashboard", get(handler::dashboard))
        .route("/api/reports/tasks", get(handler::task_report))
        .route_layer(middleware::from_fn(require_manager))
}
