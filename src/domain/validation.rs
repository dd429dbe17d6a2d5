//! Field checks shared by the managers.

use bigdecimal::{BigDecimal, RoundingMode};

use super::errors::DomainError;

/// Trims `value` and rejects it when empty or longer than `max` characters.
pub fn required_text(field: &str, value: &str, max: usize) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::invalid(format!("{field} must not be empty")));
    }
    if trimmed.chars().count() > max {
        return Err(DomainError::invalid(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Normalises an optional free-text field: blank strings become `None`.
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Lowercases and checks for exactly one `@` between non-empty parts.
pub fn normalize_email(value: &str) -> Result<String, DomainError> {
    let email = value.trim().to_lowercase();
    let mut parts = email.split('@');
    let valid = matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty()
    );
    if !valid {
        return Err(DomainError::invalid(format!("'{}' is not a valid email", value.trim())));
    }
    Ok(email)
}

pub fn positive_quantity(field: &str, value: i32) -> Result<i32, DomainError> {
    if value <= 0 {
        return Err(DomainError::invalid(format!("{field} must be greater than zero")));
    }
    Ok(value)
}

pub fn non_negative_quantity(field: &str, value: i32) -> Result<i32, DomainError> {
    if value < 0 {
        return Err(DomainError::invalid(format!("{field} must not be negative")));
    }
    Ok(value)
}

/// Rounds an amount half-up to cents.
pub fn round_money(amount: &BigDecimal) -> BigDecimal {
    amount.with_scale_round(2, RoundingMode::HalfUp)
}
