//! Input validation helpers
//!
//! Centralized text length limits. Postgres TEXT has no length
//! enforcement, so handlers check these before writing.

use rust_decimal::Decimal;
use shared::error::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Names: restaurant, employee, SOP title, task title, payee
pub const MAX_NAME_LEN: usize = 200;

/// Notes, descriptions, reasons, feedback
pub const MAX_NOTE_LEN: usize = 2000;

/// Short identifiers: phone, category, position, payment method
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Passwords (before hashing)
pub const MAX_PASSWORD_LEN: usize = 128;

/// Addresses
pub const MAX_ADDRESS_LEN: usize = 500;

/// Upper bound for a single money amount
pub const MAX_AMOUNT: i64 = 10_000_000;

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")).with_detail("field", field));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Minimal shape check: one `@`, non-empty local part, dotted domain
pub fn validate_email(email: &str) -> Result<(), AppError> {
    validate_required_text(email, "email", MAX_EMAIL_LEN)?;
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };
    if !valid {
        return Err(AppError::validation("email is not a valid address").with_detail("field", "email"));
    }
    Ok(())
}

/// Strictly positive money amount with at most 2 decimal places
pub fn validate_positive_amount(value: Decimal, field: &str) -> Result<(), AppError> {
    if value <= Decimal::ZERO {
        return Err(AppError::validation(format!("{field} must be greater than 0")).with_detail("field", field));
    }
    validate_amount_bounds(value, field)
}

/// Non-negative money amount with at most 2 decimal places
pub fn validate_non_negative_amount(value: Decimal, field: &str) -> Result<(), AppError> {
    if value < Decimal::ZERO {
        return Err(AppError::validation(format!("{field} must not be negative")).with_detail("field", field));
    }
    validate_amount_bounds(value, field)
}

fn validate_amount_bounds(value: Decimal, field: &str) -> Result<(), AppError> {
    if value.normalize().scale() > 2 {
        return Err(AppError::validation(format!("{field} must have at most 2 decimal places"))
            .with_detail("field", field));
    }
    if value > Decimal::from(MAX_AMOUNT) {
        return Err(AppError::validation(format!("{field} exceeds {MAX_AMOUNT}")).with_detail("field", field));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::error::ErrorCode;

    #[test]
    fn required_text() {
        assert!(validate_required_text("Open kitchen", "title", MAX_NAME_LEN).is_ok());
        let err = validate_required_text("   ", "title", MAX_NAME_LEN).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert!(validate_required_text(&"a".repeat(201), "title", MAX_NAME_LEN).is_err());
    }

    #[test]
    fn optional_text() {
        assert!(validate_optional_text(&None, "note", MAX_NOTE_LEN).is_ok());
        assert!(validate_optional_text(&Some("ok".into()), "note", MAX_NOTE_LEN).is_ok());
        assert!(validate_optional_text(&Some("x".repeat(2001)), "note", MAX_NOTE_LEN).is_err());
    }

    #[test]
    fn emails() {
        assert!(validate_email("chef@bistro.io").is_ok());
        for bad in ["", "chef", "@bistro.io", "chef@bistro", "chef@@bistro.io", "chef@.io"] {
            assert!(validate_email(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn amounts() {
        assert!(validate_positive_amount(Decimal::new(1050, 2), "amount").is_ok());
        assert!(validate_positive_amount(Decimal::ZERO, "amount").is_err());
        assert!(validate_positive_amount(Decimal::new(-1, 0), "amount").is_err());
        assert!(validate_positive_amount(Decimal::new(1001, 3), "amount").is_err());
        assert!(validate_positive_amount(Decimal::new(1000, 3), "amount").is_ok());
        assert!(validate_non_negative_amount(Decimal::ZERO, "bonus").is_ok());
        assert!(validate_non_negative_amount(Decimal::from(MAX_AMOUNT + 1), "bonus").is_err());
    }
}
