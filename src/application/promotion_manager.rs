use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::{ProductRepository, PromotionRepository};
use crate::domain::promotion::{
    normalize_code, validate_percent, NewPromotion, Promotion, PromotionUpdate,
};

#[derive(Clone)]
pub struct PromotionManager {
    promotions: Arc<dyn PromotionRepository>,
    products: Arc<dyn ProductRepository>,
}

impl PromotionManager {
    pub fn new(
        promotions: Arc<dyn PromotionRepository>,
        products: Arc<dyn ProductRepository>,
    ) -> Self {
        Self {
            promotions,
            products,
        }
    }

    pub fn create(&self, input: NewPromotion) -> Result<Promotion, DomainError> {
        let code = normalize_code(&input.code)?;
        validate_percent(input.discount_percent)?;
        ensure_window(input.starts_at, input.ends_at)?;
        if let Some(product_id) = input.product_id {
            self.products
                .find_by_id(product_id)?
                .ok_or(DomainError::NotFound("Product"))?;
        }
        if self.promotions.find_by_code(&code)?.is_some() {
            return Err(DomainError::Conflict(format!(
                "promotion code '{code}' already exists"
            )));
        }

        let created = self.promotions.create(NewPromotion {
            code,
            description: input.description.trim().to_string(),
            ..input
        })?;
        log::info!(
            "Created promotion {} ({}% off)",
            created.code,
            created.discount_percent
        );
        Ok(created)
    }

    pub fn get(&self, id: Uuid) -> Result<Promotion, DomainError> {
        self.promotions
            .find_by_id(id)?
            .ok_or(DomainError::NotFound("Promotion"))
    }

    pub fn list(&self, active_only: bool) -> Result<Vec<Promotion>, DomainError> {
        self.promotions.list(active_only)
    }

    pub fn update(&self, id: Uuid, changes: PromotionUpdate) -> Result<Promotion, DomainError> {
        if changes.is_empty() {
            return Err(DomainError::invalid("nothing to update"));
        }
        if let Some(percent) = changes.discount_percent {
            validate_percent(percent)?;
        }
        if changes.starts_at.is_some() || changes.ends_at.is_some() {
            let current = self.get(id)?;
            ensure_window(
                changes.starts_at.unwrap_or(current.starts_at),
                changes.ends_at.unwrap_or(current.ends_at),
            )?;
        }
        let changes = PromotionUpdate {
            description: changes.description.map(|d| d.trim().to_string()),
            ..changes
        };
        self.promotions
            .update(id, changes)?
            .ok_or(DomainError::NotFound("Promotion"))
    }

    pub fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        if self.promotions.delete(id)? {
            Ok(())
        } else {
            Err(DomainError::NotFound("Promotion"))
        }
    }

    /// Looks up `code` and checks it can be applied at `at`.
    pub fn validate_code(&self, code: &str, at: DateTime<Utc>) -> Result<Promotion, DomainError> {
        let code = normalize_code(code)?;
        let promotion = self
            .promotions
            .find_by_code(&code)?
            .ok_or(DomainError::NotFound("Promotion"))?;
        if !promotion.is_usable_at(at) {
            return Err(DomainError::invalid(format!(
                "promotion '{code}' is not valid at this time"
            )));
        }
        Ok(promotion)
    }
}

fn ensure_window(starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> Result<(), DomainError> {
    if ends_at <= starts_at {
        return Err(DomainError::invalid("ends_at must be after starts_at"));
    }
    Ok(())
}
