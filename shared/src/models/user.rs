//! User Model (superadmin, admin, manager, employee)

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Role tier, ordered from least to most privileged
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "text", rename_all = "snake_case"))]
pub enum Role {
    Employee,
    Manager,
    Admin,
    Superadmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::Manager => "manager",
            Self::Admin => "admin",
            Self::Superadmin => "superadmin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "employee" => Some(Self::Employee),
            "manager" => Some(Self::Manager),
            "admin" => Some(Self::Admin),
            "superadmin" => Some(Self::Superadmin),
            _ => None,
        }
    }

    /// True when this role grants at least the privileges of `min`
    pub fn at_least(&self, min: Role) -> bool {
        *self >= min
    }

    /// Roles that belong to exactly one restaurant
    pub fn is_tenant_bound(&self) -> bool {
        !matches!(self, Self::Superadmin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User profile (never carries the password hash)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    /// `None` only for superadmins
    pub restaurant_id: Option<i64>,
    pub role: Role,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub monthly_salary: Decimal,
    pub joined_on: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create employee payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeCreate {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub position: Option<String>,
    /// Defaults to `employee`
    pub role: Option<Role>,
    #[serde(default)]
    pub monthly_salary: Decimal,
    pub joined_on: Option<NaiveDate>,
}

/// Update employee payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub role: Option<Role>,
    pub monthly_salary: Option<Decimal>,
    pub joined_on: Option<NaiveDate>,
    pub is_active: Option<bool>,
}

/// Employee list filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmployeeQuery {
    pub role: Option<Role>,
    pub active: Option<bool>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Push notification device token registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceTokenRequest {
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_ordering() {
        assert!(Role::Superadmin.at_least(Role::Admin));
        assert!(Role::Admin.at_least(Role::Manager));
        assert!(Role::Manager.at_least(Role::Manager));
        assert!(!Role::Employee.at_least(Role::Manager));
        assert!(!Role::Manager.at_least(Role::Admin));
    }

    #[test]
    fn role_round_trips_through_str() {
        for role in [Role::Employee, Role::Manager, Role::Admin, Role::Superadmin] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("owner"), None);
        assert_eq!(serde_json::to_string(&Role::Superadmin).unwrap(), "\"superadmin\"");
    }

    #[test]
    fn only_superadmin_is_unbound() {
        assert!(Role::Admin.is_tenant_bound());
        assert!(Role::Employee.is_tenant_bound());
        assert!(!Role::Superadmin.is_tenant_bound());
    }
}
