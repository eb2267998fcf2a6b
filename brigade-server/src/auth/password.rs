//! Password hashing and policy

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use shared::error::{AppError, ErrorCode};

use crate::validation::MAX_PASSWORD_LEN;

pub const MIN_PASSWORD_LEN: usize = 8;

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Hash or fail with `InternalError` (logged)
pub fn hash_or_internal(password: &str) -> Result<String, AppError> {
    hash_password(password).map_err(|e| {
        tracing::error!("Password hashing failed: {e}");
        AppError::new(ErrorCode::InternalError)
    })
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// New passwords: at least [`MIN_PASSWORD_LEN`] characters, at most [`MAX_PASSWORD_LEN`] bytes
pub fn check_password_policy(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::with_message(
            ErrorCode::PasswordTooShort,
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    if password.len() > MAX_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "password is too long (max {MAX_PASSWORD_LEN})"
        )));
    }
    Ok(())
}

/// Emails are matched case-insensitively
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn policy_enforces_minimum() {
        let err = check_password_policy("short").unwrap_err();
        assert_eq!(err.code, ErrorCode::PasswordTooShort);
        assert!(check_password_policy("eight888").is_ok());
        assert!(check_password_policy(&"x".repeat(MAX_PASSWORD_LEN + 1)).is_err());
    }

    #[test]
    fn emails_normalized() {
        assert_eq!(normalize_email("  Chef@Example.COM "), "chef@example.com");
    }
}
