//! Upload API Module

mod handler;

use std::path::Path;

use axum::Router;
use axum::routing::post;
use tower_http::services::ServeDir;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/uploads", post(handler::upload))
}

/// Public read access to locally stored media under `/media/{*path}`
pub fn media_router(dir: &Path) -> Router<AppState> {
    Router::new().nest_service("/media", ServeDir::new(dir))
}
