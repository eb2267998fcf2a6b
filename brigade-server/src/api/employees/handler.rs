//! Employee API Handlers

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use shared::error::{AppError, ErrorCode};
use shared::models::{EmployeeCreate, EmployeeQuery, EmployeeUpdate, Role, User};
use shared::response::{PageQuery, PaginatedResponse};
use shared::util::{now_millis, snowflake_id};

use crate::api::{ApiResult, ClientIp, record_audit};
use crate::auth::Identity;
use crate::auth::password::{check_password_policy, hash_or_internal, normalize_email};
use crate::db;
use crate::error::on_unique_violation;
use crate::state::AppState;
use crate::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_email, validate_non_negative_amount,
    validate_optional_text, validate_required_text,
};

/// Staff accounts are employees or managers; managers may only hand out `employee`
fn ensure_assignable_role(actor: &Identity, role: Role) -> Result<(), AppError> {
    if !matches!(role, Role::Employee | Role::Manager) {
        return Err(AppError::validation("role must be employee or manager")
            .with_detail("field", "role"));
    }
    if role == Role::Manager && !actor.has_role(Role::Admin) {
        return Err(AppError::new(ErrorCode::AdminRequired).with_detail("field", "role"));
    }
    Ok(())
}

/// Managers may edit employees but not other managers
fn ensure_can_edit(actor: &Identity, target: &User) -> Result<(), AppError> {
    if target.role.at_least(Role::Manager) && !actor.has_role(Role::Admin) {
        return Err(AppError::new(ErrorCode::AdminRequired));
    }
    Ok(())
}

/// Salary and activation changes are admin-only
fn ensure_admin_fields(actor: &Identity, update: &EmployeeUpdate) -> Result<(), AppError> {
    if actor.has_role(Role::Admin) {
        return Ok(());
    }
    if update.monthly_salary.is_some() {
        return Err(AppError::new(ErrorCode::AdminRequired).with_detail("field", "monthly_salary"));
    }
    if update.is_active.is_some() {
        return Err(AppError::new(ErrorCode::AdminRequired).with_detail("field", "is_active"));
    }
    Ok(())
}

async fn find_staff(state: &AppState, restaurant_id: i64, id: i64) -> Result<User, crate::ServiceError> {
    db::users::find_in_restaurant(&state.pool, restaurant_id, id)
        .await?
        .filter(|u| matches!(u.role, Role::Employee | Role::Manager))
        .ok_or_else(|| AppError::new(ErrorCode::EmployeeNotFound).into())
}

/// POST /api/employees
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ip: ClientIp,
    Json(payload): Json<EmployeeCreate>,
) -> ApiResult<User> {
    let restaurant_id = identity.tenant_id()?;
    let role = payload.role.unwrap_or(Role::Employee);
    ensure_assignable_role(&identity, role)?;
    if !payload.monthly_salary.is_zero() && !identity.has_role(Role::Admin) {
        return Err(AppError::new(ErrorCode::AdminRequired)
            .with_detail("field", "monthly_salary")
            .into());
    }

    let email = normalize_email(&payload.email);
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_email(&email)?;
    validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.position, "position", MAX_SHORT_TEXT_LEN)?;
    validate_non_negative_amount(payload.monthly_salary, "monthly_salary")?;
    check_password_policy(&payload.password)?;

    if db::users::email_exists(&state.pool, &email).await? {
        return Err(ErrorCode::EmailExists.into());
    }
    let hashed = hash_or_internal(&payload.password)?;

    let now = now_millis();
    let user = User {
        id: snowflake_id(),
        restaurant_id: Some(restaurant_id),
        role,
        name: payload.name.trim().to_string(),
        email,
        phone: payload.phone,
        position: payload.position,
        monthly_salary: payload.monthly_salary,
        joined_on: payload.joined_on,
        is_active: true,
        created_at: now,
        updated_at: now,
    };

    let mut conn = state.pool.acquire().await?;
    db::users::insert(&mut conn, &user, &hashed)
        .await
        .map_err(|e| on_unique_violation(e, ErrorCode::EmailExists))?;

    record_audit(
        &state,
        &identity,
        "employee.create",
        serde_json::json!({ "employee_id": user.id, "role": user.role }),
        &ip,
    )
    .await;
    Ok(Json(user))
}

/// GET /api/employees
pub async fn list(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<EmployeeQuery>,
) -> ApiResult<PaginatedResponse<User>> {
    let restaurant_id = identity.tenant_id()?;
    let page = PageQuery {
        page: query.page,
        per_page: query.per_page,
    };
    let (users, total) = db::users::list_staff(&state.pool, restaurant_id, &query, &page).await?;
    Ok(Json(PaginatedResponse::new(users, &page, total)))
}

/// GET /api/employees/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
) -> ApiResult<User> {
    let restaurant_id = identity.tenant_id()?;
    Ok(Json(find_staff(&state, restaurant_id, id).await?))
}

/// PATCH /api/employees/{id}
pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ip: ClientIp,
    Path(id): Path<i64>,
    Json(payload): Json<EmployeeUpdate>,
) -> ApiResult<User> {
    let restaurant_id = identity.tenant_id()?;
    let target = find_staff(&state, restaurant_id, id).await?;
    ensure_can_edit(&identity, &target)?;
    ensure_admin_fields(&identity, &payload)?;
    if let Some(role) = payload.role {
        ensure_assignable_role(&identity, role)?;
    }
    if payload.is_active == Some(false) && id == identity.user_id {
        return Err(ErrorCode::EmployeeCannotDeleteSelf.into());
    }
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.position, "position", MAX_SHORT_TEXT_LEN)?;
    if let Some(salary) = payload.monthly_salary {
        validate_non_negative_amount(salary, "monthly_salary")?;
    }

    let user = db::users::update(&state.pool, restaurant_id, id, &payload, now_millis())
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::EmployeeNotFound))?;

    if payload.monthly_salary.is_some() || payload.role.is_some() || payload.is_active.is_some() {
        record_audit(
            &state,
            &identity,
            "employee.update",
            serde_json::json!({
                "employee_id": id,
                "role": payload.role,
                "monthly_salary": payload.monthly_salary.map(|s| s.to_string()),
                "is_active": payload.is_active,
            }),
            &ip,
        )
        .await;
    }
    Ok(Json(user))
}

/// DELETE /api/employees/{id}
///
/// Soft delete: the account is deactivated, its records stay.
pub async fn deactivate(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ip: ClientIp,
    Path(id): Path<i64>,
) -> ApiResult<bool> {
    let restaurant_id = identity.tenant_id()?;
    if id == identity.user_id {
        return Err(ErrorCode::EmployeeCannotDeleteSelf.into());
    }
    find_staff(&state, restaurant_id, id).await?;

    let changed = db::users::set_active(&state.pool, restaurant_id, id, false, now_millis()).await?;
    record_audit(
        &state,
        &identity,
        "employee.deactivate",
        serde_json::json!({ "employee_id": id }),
        &ip,
    )
    .await;
    Ok(Json(changed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn actor(role: Role) -> Identity {
        Identity {
            user_id: 1,
            role,
            restaurant_id: Some(10),
            name: "Actor".into(),
        }
    }

    fn staff(role: Role) -> User {
        User {
            id: 2,
            restaurant_id: Some(10),
            role,
            name: "Staff".into(),
            email: "staff@example.com".into(),
            phone: None,
            position: None,
            monthly_salary: Decimal::ZERO,
            joined_on: None,
            is_active: true,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn managers_only_hand_out_employee() {
        assert!(ensure_assignable_role(&actor(Role::Manager), Role::Employee).is_ok());
        assert_eq!(
            ensure_assignable_role(&actor(Role::Manager), Role::Manager)
                .unwrap_err()
                .code,
            ErrorCode::AdminRequired
        );
        assert!(ensure_assignable_role(&actor(Role::Admin), Role::Manager).is_ok());
        assert_eq!(
            ensure_assignable_role(&actor(Role::Admin), Role::Admin)
                .unwrap_err()
                .code,
            ErrorCode::ValidationFailed
        );
    }

    #[test]
    fn managers_cannot_edit_managers() {
        assert!(ensure_can_edit(&actor(Role::Manager), &staff(Role::Employee)).is_ok());
        assert!(ensure_can_edit(&actor(Role::Manager), &staff(Role::Manager)).is_err());
        assert!(ensure_can_edit(&actor(Role::Admin), &staff(Role::Manager)).is_ok());
    }

    #[test]
    fn salary_changes_need_admin() {
        let update = EmployeeUpdate {
            monthly_salary: Some(Decimal::new(250000, 2)),
            ..Default::default()
        };
        assert!(ensure_admin_fields(&actor(Role::Manager), &update).is_err());
        assert!(ensure_admin_fields(&actor(Role::Admin), &update).is_ok());
        assert!(ensure_admin_fields(&actor(Role::Manager), &EmployeeUpdate::default()).is_ok());
    }
}
