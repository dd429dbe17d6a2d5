use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;
use super::validation::round_money;

#[derive(Debug, Clone)]
pub struct Promotion {
    pub id: Uuid,
    pub code: String,
    pub description: String,
    pub discount_percent: i32,
    /// When set, only lines of this product are discounted.
    pub product_id: Option<Uuid>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Promotion {
    /// Active and `at` falls inside `[starts_at, ends_at]`.
    pub fn is_usable_at(&self, at: DateTime<Utc>) -> bool {
        self.active && self.starts_at <= at && at <= self.ends_at
    }

    pub fn discount_on(&self, amount: &BigDecimal) -> BigDecimal {
        round_money(&(amount * BigDecimal::from(self.discount_percent) / BigDecimal::from(100)))
    }
}

#[derive(Debug, Clone)]
pub struct NewPromotion {
    pub code: String,
    pub description: String,
    pub discount_percent: i32,
    pub product_id: Option<Uuid>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct PromotionUpdate {
    pub description: Option<String>,
    pub discount_percent: Option<i32>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub active: Option<bool>,
}

impl PromotionUpdate {
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.discount_percent.is_none()
            && self.starts_at.is_none()
            && self.ends_at.is_none()
            && self.active.is_none()
    }
}

/// Trims, uppercases and checks a promotion code: 3 to 32 of `A-Z`, `0-9`, `-`.
pub fn normalize_code(code: &str) -> Result<String, DomainError> {
    let code = code.trim().to_uppercase();
    let valid_chars = code
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-');
    if !(3..=32).contains(&code.len()) || !valid_chars {
        return Err(DomainError::invalid(
            "promotion code must be 3 to 32 letters, digits or dashes",
        ));
    }
    Ok(code)
}

pub fn validate_percent(percent: i32) -> Result<i32, DomainError> {
    if !(1..=100).contains(&percent) {
        return Err(DomainError::invalid("discount_percent must be between 1 and 100"));
    }
    Ok(percent)
}
