//! Authenticated caller identity and role guards

use shared::error::{AppError, ErrorCode};
use shared::models::Role;

/// Authenticated identity extracted from the JWT
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: i64,
    pub role: Role,
    /// `None` for superadmins
    pub restaurant_id: Option<i64>,
    pub name: String,
}

impl Identity {
    /// Restaurant the caller acts in; superadmins have none
    pub fn tenant_id(&self) -> Result<i64, AppError> {
        self.restaurant_id
            .ok_or_else(|| AppError::new(ErrorCode::TenantNotSelected))
    }

    pub fn has_role(&self, min: Role) -> bool {
        self.role.at_least(min)
    }

    /// Fail with the role-specific permission error unless the caller has at least `min`
    pub fn ensure_role(&self, min: Role) -> Result<(), AppError> {
        if self.has_role(min) {
            return Ok(());
        }
        let code = match min {
            Role::Superadmin => ErrorCode::SuperadminRequired,
            Role::Admin => ErrorCode::AdminRequired,
            _ => ErrorCode::RoleRequired,
        };
        Err(AppError::new(code).with_detail("required_role", min.as_str()))
    }

    pub fn is_manager(&self) -> bool {
        self.has_role(Role::Manager)
    }

    /// Employees are restricted to their own records
    pub fn scope_user(&self, requested: Option<i64>) -> Option<i64> {
        if self.is_manager() {
            requested
        } else {
            Some(self.user_id)
        }
    }

    /// Managers see everything in the tenant; employees only their own records
    pub fn can_view_user(&self, owner_id: i64) -> bool {
        self.is_manager() || self.user_id == owner_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(role: Role) -> Identity {
        Identity {
            user_id: 5,
            role,
            restaurant_id: if role == Role::Superadmin { None } else { Some(1) },
            name: "Test".into(),
        }
    }

    #[test]
    fn ensure_role_codes() {
        let employee = identity(Role::Employee);
        assert_eq!(
            employee.ensure_role(Role::Manager).unwrap_err().code,
            ErrorCode::RoleRequired
        );
        assert_eq!(
            identity(Role::Manager).ensure_role(Role::Admin).unwrap_err().code,
            ErrorCode::AdminRequired
        );
        assert_eq!(
            identity(Role::Admin).ensure_role(Role::Superadmin).unwrap_err().code,
            ErrorCode::SuperadminRequired
        );
        assert!(identity(Role::Admin).ensure_role(Role::Manager).is_ok());
    }

    #[test]
    fn superadmin_has_no_tenant() {
        let err = identity(Role::Superadmin).tenant_id().unwrap_err();
        assert_eq!(err.code, ErrorCode::TenantNotSelected);
        assert_eq!(identity(Role::Admin).tenant_id().unwrap(), 1);
    }

    #[test]
    fn employees_scoped_to_self() {
        assert_eq!(identity(Role::Employee).scope_user(Some(99)), Some(5));
        assert_eq!(identity(Role::Employee).scope_user(None), Some(5));
        assert_eq!(identity(Role::Manager).scope_user(Some(99)), Some(99));
        assert_eq!(identity(Role::Manager).scope_user(None), None);
        assert!(identity(Role::Employee).can_view_user(5));
        assert!(!identity(Role::Employee).can_view_user(6));
        assert!(identity(Role::Manager).can_view_user(6));
    }
}
