use std::sync::Arc;

use bigdecimal::{BigDecimal, Zero};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::ProductRepository;
use crate::domain::product::{NewProduct, Product, ProductFilter, ProductUpdate};
use crate::domain::validation::{required_text, round_money};

const MAX_NAME_LEN: usize = 120;
const MAX_CATEGORY_LEN: usize = 80;

#[derive(Clone)]
pub struct ProductManager {
    products: Arc<dyn ProductRepository>,
}

impl ProductManager {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }

    pub fn create(&self, input: NewProduct) -> Result<Product, DomainError> {
        let product = NewProduct {
            name: required_text("name", &input.name, MAX_NAME_LEN)?,
            description: input.description.trim().to_string(),
            category: normalize_category(&input.category)?,
            price: valid_price(&input.price)?,
        };
        let created = self.products.create(product)?;
        log::info!("Created product {} ({})", created.id, created.name);
        Ok(created)
    }

    pub fn get(&self, id: Uuid) -> Result<Product, DomainError> {
        self.products
            .find_by_id(id)?
            .ok_or(DomainError::NotFound("Product"))
    }

    pub fn list(&self, mut filter: ProductFilter) -> Result<Vec<Product>, DomainError> {
        filter.category = filter.category.map(|c| c.trim().to_lowercase());
        filter.search = filter
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        self.products.list(&filter)
    }

    pub fn update(&self, id: Uuid, changes: ProductUpdate) -> Result<Product, DomainError> {
        if changes.is_empty() {
            return Err(DomainError::invalid("nothing to update"));
        }
        let changes = ProductUpdate {
            name: changes
                .name
                .map(|n| required_text("name", &n, MAX_NAME_LEN))
                .transpose()?,
            description: changes.description.map(|d| d.trim().to_string()),
            category: changes
                .category
                .map(|c| normalize_category(&c))
                .transpose()?,
            price: changes.price.map(|p| valid_price(&p)).transpose()?,
            active: changes.active,
        };
        self.products
            .update(id, changes)?
            .ok_or(DomainError::NotFound("Product"))
    }

    pub fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        if self.products.delete(id)? {
            log::info!("Deleted product {}", id);
            Ok(())
        } else {
            Err(DomainError::NotFound("Product"))
        }
    }
}

fn normalize_category(category: &str) -> Result<String, DomainError> {
    Ok(required_text("category", category, MAX_CATEGORY_LEN)?.to_lowercase())
}

fn valid_price(price: &BigDecimal) -> Result<BigDecimal, DomainError> {
    let price = round_money(price);
    if price <= BigDecimal::zero() {
        return Err(DomainError::invalid("price must be greater than zero"));
    }
    Ok(price)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::application::testing::MemoryDb;

    fn input(name: &str, price: &str) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: " crusty ".to_string(),
            category: " Bread ".to_string(),
            price: BigDecimal::from_str(price).unwrap(),
        }
    }

    #[test]
    fn create_normalizes_and_rounds() {
        let db = MemoryDb::new();
        let product = ProductManager::new(db.clone())
            .create(input(" Baguette ", "1.205"))
            .unwrap();
        assert_eq!(product.name, "Baguette");
        assert_eq!(product.category, "bread");
        assert_eq!(product.description, "crusty");
        assert_eq!(product.price, BigDecimal::from_str("1.21").unwrap());
    }

    #[test]
    fn non_positive_prices_are_rejected() {
        let db = MemoryDb::new();
        let manager = ProductManager::new(db.clone());
        assert!(manager.create(input("Free bread", "0")).is_err());
        assert!(manager.create(input("Negative bread", "-1.00")).is_err());
        assert!(manager.create(input("Rounds to zero", "0.001")).is_err());
    }

    #[test]
    fn empty_update_is_rejected() {
        let db = MemoryDb::new();
        let product = db.seed_product("Rye", "3.00");
        let err = ProductManager::new(db.clone())
            .update(product.id, ProductUpdate::default())
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn update_unknown_product_is_not_found() {
        let db = MemoryDb::new();
        let err = ProductManager::new(db.clone())
            .update(
                Uuid::new_v4(),
                ProductUpdate {
                    active: Some(false),
                    ..ProductUpdate::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound("Product")));
    }

    #[test]
    fn list_hides_inactive_when_asked() {
        let db = MemoryDb::new();
        let manager = ProductManager::new(db.clone());
        let rye = db.seed_product("Rye", "3.00");
        db.seed_product("Spelt", "3.50");
        manager
            .update(
                rye.id,
                ProductUpdate {
                    active: Some(false),
                    ..ProductUpdate::default()
                },
            )
            .unwrap();

        let visible = manager
            .list(ProductFilter {
                active_only: true,
                ..ProductFilter::default()
            })
            .unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].name, "Spelt");
        assert_eq!(manager.list(ProductFilter::default()).unwrap().len(), 2);
    }
}
