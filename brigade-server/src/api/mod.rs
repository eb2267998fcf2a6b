//! HTTP API
//!
//! - [`health`] - liveness and database ping
//! - [`auth`] - login, profile, password, device token
//! - [`restaurants`] - tenant management (superadmin)
//! - [`employees`] - staff accounts
//! - [`sops`] - standard operating procedures
//! - [`tasks`] - task workflow with photo submission
//! - [`ai_reviews`] - AI photo review results and overrides
//! - [`uploads`] - image uploads and local media serving
//! - [`attendance`] - check-in/out and monthly summary
//! - [`requests`] - leave and other staff requests
//! - [`advances`] - salary advances
//! - [`payroll`] - payslips
//! - [`vouchers`] - numbered payout documents
//! - [`dashboard`] - dashboard and reports
//! - [`audit`] - audit log

pub mod advances;
pub mod ai_reviews;
pub mod attendance;
pub mod audit;
pub mod auth;
pub mod dashboard;
pub mod employees;
pub mod health;
pub mod payroll;
pub mod requests;
pub mod restaurants;
pub mod sops;
pub mod tasks;
pub mod uploads;
pub mod vouchers;

use axum::extract::{ConnectInfo, DefaultBodyLimit, FromRequestParts};
use axum::{Json, Router, middleware};
use http::request::Parts;
use http::{HeaderName, HeaderValue};
use std::net::SocketAddr;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::auth::Identity;
use crate::auth::middleware::auth_middleware;
use crate::auth::rate_limit::client_ip;
use crate::error::ServiceError;
use crate::media::processing::MAX_FILE_SIZE;
use crate::state::AppState;

pub type ApiResult<T> = Result<Json<T>, ServiceError>;

/// Caller IP (first `X-Forwarded-For` entry, else the peer address)
#[derive(Debug, Clone)]
pub struct ClientIp(pub String);

impl<S: Send + Sync> FromRequestParts<S> for ClientIp {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ci| ci.0);
        Ok(ClientIp(client_ip(&parts.headers, peer)))
    }
}

/// Write an audit entry; failures are logged and never fail the request
pub async fn record_audit(
    state: &AppState,
    identity: &Identity,
    action: &str,
    detail: serde_json::Value,
    ip: &ClientIp,
) {
    let now = shared::util::now_millis();
    if let Err(e) = crate::db::audit::log(
        &state.pool,
        identity.restaurant_id,
        identity.user_id,
        action,
        Some(&detail),
        Some(&ip.0),
        now,
    )
    .await
    {
        tracing::warn!(action, error = %e, "Failed to write audit log");
    }
}

/// Today's date in the restaurant's configured timezone
pub async fn restaurant_today(
    state: &AppState,
    restaurant_id: i64,
) -> Result<chrono::NaiveDate, sqlx::Error> {
    let tz = crate::db::restaurants::timezone(&state.pool, restaurant_id).await?;
    Ok(shared::models::local_date(&tz, shared::util::now_millis()))
}

/// `YYYY-MM` query value, else `InvalidFormat`
pub fn parse_month(value: &str) -> Result<shared::models::Month, shared::error::AppError> {
    value.parse().map_err(|e: shared::models::InvalidMonth| {
        shared::error::AppError::with_message(shared::error::ErrorCode::InvalidFormat, e.to_string())
            .with_detail("field", "month")
    })
}

/// Push to the user's registered device, if any; lookup failures are logged
pub async fn notify_user(state: &AppState, user_id: i64, message: crate::notify::PushMessage) {
    match crate::db::users::fcm_token(&state.pool, user_id).await {
        Ok(token) => state.notifier.send(token, message),
        Err(e) => tracing::warn!(user_id, error = %e, "Failed to load device token"),
    }
}

#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Routes that need a valid bearer token
fn protected_routes() -> Router<AppState> {
    Router::new()
        .merge(auth::protected_router())
        .merge(restaurants::router())
        .merge(employees::router())
        .merge(sops::router())
        .merge(tasks::router())
        .merge(ai_reviews::router())
        .merge(uploads::router())
        .merge(attendance::router())
        .merge(requests::router())
        .merge(advances::router())
        .merge(payroll::router())
        .merge(vouchers::router())
        .merge(dashboard::router())
        .merge(audit::router())
}

/// Build the application with all routes, middleware and state
pub fn create_router(state: AppState) -> Router {
    let protected = protected_routes().route_layer(middleware::from_fn_with_state(
        state.clone(),
        auth_middleware,
    ));

    let mut app = Router::new()
        .merge(health::router())
        .merge(auth::public_router(&state))
        .merge(protected);

    if let Some(dir) = &state.local_media_dir {
        app = app.merge(uploads::media_router(dir));
    }

    let request_id = HeaderName::from_static("x-request-id");
    app.layer(DefaultBodyLimit::max(MAX_FILE_SIZE + 1024 * 1024))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, XRequestId))
        .with_state(state)
}
