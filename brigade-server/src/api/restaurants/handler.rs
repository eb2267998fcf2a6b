//! Restaurant handlers

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    DEFAULT_TIMEZONE, Month, Restaurant, RestaurantCreate, RestaurantCreated, RestaurantOverview,
    RestaurantQuery, RestaurantStatus, RestaurantStatusUpdate, RestaurantUpdate, Role, User,
    parse_utc_offset,
};
use shared::util::{now_millis, snowflake_id};

use crate::api::{ApiResult, ClientIp, record_audit};
use crate::auth::Identity;
use crate::auth::password::{check_password_policy, hash_or_internal, normalize_email};
use crate::db;
use crate::error::on_unique_violation;
use crate::state::AppState;
use crate::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_email, validate_optional_text,
    validate_required_text,
};

fn validate_timezone(tz: &str) -> Result<(), AppError> {
    if parse_utc_offset(tz).is_none() {
        return Err(AppError::validation(format!(
            "timezone '{tz}' must be UTC or an offset like +05:30"
        ))
        .with_detail("field", "timezone"));
    }
    Ok(())
}

/// POST /api/admin/restaurants
///
/// Creates the tenant together with its first admin.
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ip: ClientIp,
    Json(payload): Json<RestaurantCreate>,
) -> ApiResult<RestaurantCreated> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.address, "address", MAX_ADDRESS_LEN)?;
    validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    let timezone = payload
        .timezone
        .as_deref()
        .map(str::trim)
        .filter(|tz| !tz.is_empty())
        .unwrap_or(DEFAULT_TIMEZONE)
        .to_string();
    validate_timezone(&timezone)?;

    let admin_email = normalize_email(&payload.admin.email);
    validate_required_text(&payload.admin.name, "admin.name", MAX_NAME_LEN)?;
    validate_email(&admin_email)?;
    check_password_policy(&payload.admin.password)?;
    let hashed = hash_or_internal(&payload.admin.password)?;

    let now = now_millis();
    let restaurant = Restaurant {
        id: snowflake_id(),
        name: payload.name.trim().to_string(),
        address: payload.address,
        phone: payload.phone,
        timezone,
        status: RestaurantStatus::Active,
        created_at: now,
        updated_at: now,
    };
    let admin = User {
        id: snowflake_id(),
        restaurant_id: Some(restaurant.id),
        role: Role::Admin,
        name: payload.admin.name.trim().to_string(),
        email: admin_email,
        phone: None,
        position: None,
        monthly_salary: Decimal::ZERO,
        joined_on: None,
        is_active: true,
        created_at: now,
        updated_at: now,
    };

    let mut tx = state.pool.begin().await?;
    db::restaurants::insert(&mut *tx, &restaurant).await?;
    db::users::insert(&mut *tx, &admin, &hashed)
        .await
        .map_err(|e| on_unique_violation(e, ErrorCode::EmailExists))?;
    tx.commit().await?;

    record_audit(
        &state,
        &identity,
        "restaurant.create",
        serde_json::json!({ "restaurant_id": restaurant.id, "admin_id": admin.id }),
        &ip,
    )
    .await;
    tracing::info!(restaurant_id = restaurant.id, name = %restaurant.name, "Restaurant created");

    Ok(Json(RestaurantCreated { restaurant, admin }))
}

/// GET /api/admin/restaurants
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<RestaurantQuery>,
) -> ApiResult<Vec<Restaurant>> {
    Ok(Json(db::restaurants::list(&state.pool, &query).await?))
}

/// GET /api/admin/restaurants/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Restaurant> {
    let restaurant = db::restaurants::find(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::TenantNotFound))?;
    Ok(Json(restaurant))
}

/// PATCH /api/admin/restaurants/{id}
pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ip: ClientIp,
    Path(id): Path<i64>,
    Json(payload): Json<RestaurantUpdate>,
) -> ApiResult<Restaurant> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.address, "address", MAX_ADDRESS_LEN)?;
    validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    if let Some(tz) = &payload.timezone {
        validate_timezone(tz.trim())?;
    }

    let restaurant = db::restaurants::update(&state.pool, id, &payload, now_millis())
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::TenantNotFound))?;

    record_audit(
        &state,
        &identity,
        "restaurant.update",
        serde_json::json!({ "restaurant_id": id }),
        &ip,
    )
    .await;
    Ok(Json(restaurant))
}

/// PUT /api/admin/restaurants/{id}/status
pub async fn set_status(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ip: ClientIp,
    Path(id): Path<i64>,
    Json(payload): Json<RestaurantStatusUpdate>,
) -> ApiResult<Restaurant> {
    let restaurant = db::restaurants::set_status(&state.pool, id, payload.status, now_millis())
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::TenantNotFound))?;

    record_audit(
        &state,
        &identity,
        "restaurant.status",
        serde_json::json!({ "restaurant_id": id, "status": payload.status }),
        &ip,
    )
    .await;
    tracing::info!(restaurant_id = id, status = ?payload.status, "Restaurant status changed");
    Ok(Json(restaurant))
}

/// GET /api/admin/overview
///
/// Payroll totals are for the current UTC month.
pub async fn overview(State(state): State<AppState>) -> ApiResult<Vec<RestaurantOverview>> {
    let month = Month::of(chrono::Utc::now().date_naive());
    Ok(Json(
        db::restaurants::overview(&state.pool, &month.to_string()).await?,
    ))
}
