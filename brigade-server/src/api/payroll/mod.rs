//! Payroll API Module

mod handler;

use axum::routing::{get, patch, post};
use axum::{Router, middleware};

use crate::auth::middleware::require_admin;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    // Employees read their own payslips
    let staff_routes = Router::new()
        .route("/api/payroll", get(handler::list))
        .route("/api/payroll/{id}", get(handler::get_by_id));

    let admin_routes = Router::new()
        .route("/api/payroll/run", post(handler::run))
        .route("/api/payroll/summary", get(handler::summary))
        .route("/api/payroll/{id}", patch(handler::update))
        .route("/api/payroll/{id}/pay", post(handler::pay))
        .route_layer(middleware::from_fn(require_admin));

    staff_routes.merge(admin_routes)
}
