pub mod attendance;
pub mod auth;
pub mod claims;
pub mod health;
pub mod inventory;
pub mod notifications;
pub mod openapi;
pub mod orders;
pub mod products;
pub mod promotions;
pub mod purchases;
pub mod reports;
pub mod shifts;
pub mod sites;
pub mod suppliers;
pub mod users;

use std::str::FromStr;

use actix_web::web;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};

use crate::domain::errors::DomainError;
use crate::errors::AppError;

/// Runs a manager call on actix's blocking pool; diesel connections are
/// synchronous.
pub async fn blocking<F, T>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, DomainError> + Send + 'static,
    T: Send + 'static,
{
    web::block(f).await?.map_err(AppError::from)
}

/// Decimal amounts travel as strings, e.g. "9.99".
pub fn parse_money(field: &str, value: &str) -> Result<BigDecimal, AppError> {
    BigDecimal::from_str(value.trim())
        .map_err(|_| AppError::BadRequest(format!("{field} must be a decimal amount, got '{value}'")))
}

pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339()
}

pub fn parse_enum<T: FromStr<Err = DomainError>>(value: &str) -> Result<T, AppError> {
    value.parse::<T>().map_err(AppError::from)
}
