//! Voucher API Module
//!
//! Vouchers carry salary amounts, so the whole module is admin-only.

mod handler;

use axum::routing::{get, post};
use axum::{Router, middleware};

use crate::auth::middleware::require_admin;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/vouchers", get(handler::list).post(handler::create))
        .route("/api/vouchers/{id}", get(handler::get_by_id))
        .route("/api/vouchers/{id}/void", post(handler::void))
        .route_layer(middleware::from_fn(require_admin))
}
