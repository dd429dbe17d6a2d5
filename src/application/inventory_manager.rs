use std::sync::Arc;

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::inventory::{InventoryItem, NewInventoryItem, Transfer};
use crate::domain::notification::NotificationKind;
use crate::domain::ports::{InventoryRepository, ProductRepository, SiteRepository};
use crate::domain::user::Role;
use crate::domain::validation::{non_negative_quantity, positive_quantity};

use super::notification_manager::NotificationManager;

/// Per-site stock. Every change is a read followed by a write of the new
/// absolute quantity; there is no row locking between the two calls.
#[derive(Clone)]
pub struct InventoryManager {
    inventory: Arc<dyn InventoryRepository>,
    products: Arc<dyn ProductRepository>,
    sites: Arc<dyn SiteRepository>,
    notifications: NotificationManager,
}

impl InventoryManager {
    pub fn new(
        inventory: Arc<dyn InventoryRepository>,
        products: Arc<dyn ProductRepository>,
        sites: Arc<dyn SiteRepository>,
        notifications: NotificationManager,
    ) -> Self {
        Self {
            inventory,
            products,
            sites,
            notifications,
        }
    }

    pub fn stock(&self, product_id: Uuid, site_id: Uuid) -> Result<InventoryItem, DomainError> {
        self.inventory
            .find(product_id, site_id)?
            .ok_or(DomainError::NotFound("Inventory item"))
    }

    pub fn list_site(&self, site_id: Uuid) -> Result<Vec<InventoryItem>, DomainError> {
        self.ensure_site(site_id)?;
        self.inventory.list_by_site(site_id)
    }

    pub fn low_stock(&self, site_id: Option<Uuid>) -> Result<Vec<InventoryItem>, DomainError> {
        self.inventory.list_low_stock(site_id)
    }

    /// Overwrites quantity and threshold, creating the row when needed.
    pub fn set_stock(
        &self,
        product_id: Uuid,
        site_id: Uuid,
        quantity: i32,
        min_stock: i32,
    ) -> Result<InventoryItem, DomainError> {
        non_negative_quantity("quantity", quantity)?;
        non_negative_quantity("min_stock", min_stock)?;
        self.ensure_product(product_id)?;
        self.ensure_site(site_id)?;

        match self.inventory.find(product_id, site_id)? {
            Some(item) => {
                self.inventory
                    .set_min_stock(item.id, min_stock)?
                    .ok_or(DomainError::NotFound("Inventory item"))?;
                self.inventory
                    .set_quantity(item.id, quantity)?
                    .ok_or(DomainError::NotFound("Inventory item"))
            }
            None => self.inventory.create(NewInventoryItem {
                product_id,
                site_id,
                quantity,
                min_stock,
            }),
        }
    }

    /// Applies a signed delta: positive increments, negative decrements.
    pub fn adjust(
        &self,
        product_id: Uuid,
        site_id: Uuid,
        delta: i32,
    ) -> Result<InventoryItem, DomainError> {
        match delta {
            0 => Err(DomainError::invalid("delta must not be zero")),
            d if d > 0 => self.increment(product_id, site_id, d),
            d => self.decrement(product_id, site_id, d.checked_neg().unwrap_or(i32::MAX)),
        }
    }

    pub fn increment(
        &self,
        product_id: Uuid,
        site_id: Uuid,
        quantity: i32,
    ) -> Result<InventoryItem, DomainError> {
        positive_quantity("quantity", quantity)?;
        match self.inventory.find(product_id, site_id)? {
            Some(item) => {
                let new_quantity = item
                    .quantity
                    .checked_add(quantity)
                    .ok_or_else(|| DomainError::invalid("stock quantity overflow"))?;
                self.inventory
                    .set_quantity(item.id, new_quantity)?
                    .ok_or(DomainError::NotFound("Inventory item"))
            }
            None => {
                self.ensure_product(product_id)?;
                self.ensure_site(site_id)?;
                self.inventory.create(NewInventoryItem {
                    product_id,
                    site_id,
                    quantity,
                    min_stock: 0,
                })
            }
        }
    }

    pub fn decrement(
        &self,
        product_id: Uuid,
        site_id: Uuid,
        quantity: i32,
    ) -> Result<InventoryItem, DomainError> {
        positive_quantity("quantity", quantity)?;
        let item = self.inventory.find(product_id, site_id)?;
        let available = item.as_ref().map_or(0, |i| i.quantity);
        let item = match item {
            Some(item) if item.quantity >= quantity => item,
            _ => {
                return Err(DomainError::InsufficientStock {
                    product_id,
                    available,
                    requested: quantity,
                })
            }
        };

        let updated = self
            .inventory
            .set_quantity(item.id, item.quantity - quantity)?
            .ok_or(DomainError::NotFound("Inventory item"))?;

        if updated.is_low() && !item.is_low() {
            self.notifications.try_notify_roles(
                &[Role::Admin],
                NotificationKind::Stock,
                "Low stock",
                &format!(
                    "Product {} at site {} is down to {} (minimum {})",
                    product_id, site_id, updated.quantity, updated.min_stock
                ),
            );
        }
        Ok(updated)
    }

    /// Moves stock between sites: decrement the source, increment the
    /// destination, and put the source back if the second step fails.
    pub fn transfer(
        &self,
        product_id: Uuid,
        from_site: Uuid,
        to_site: Uuid,
        quantity: i32,
    ) -> Result<Transfer, DomainError> {
        if from_site == to_site {
            return Err(DomainError::invalid(
                "source and destination sites must differ",
            ));
        }
        self.ensure_site(to_site)?;

        let source = self.decrement(product_id, from_site, quantity)?;
        match self.increment(product_id, to_site, quantity) {
            Ok(destination) => {
                log::info!(
                    "Transferred {} of product {} from site {} to site {}",
                    quantity,
                    product_id,
                    from_site,
                    to_site
                );
                Ok(Transfer {
                    source,
                    destination,
                })
            }
            Err(e) => {
                log::warn!(
                    "Transfer of product {} to site {} failed, restoring source: {}",
                    product_id,
                    to_site,
                    e
                );
                if let Err(rollback) = self.increment(product_id, from_site, quantity) {
                    log::error!(
                        "Could not restore {} of product {} at site {}: {}",
                        quantity,
                        product_id,
                        from_site,
                        rollback
                    );
                    return Err(DomainError::Internal(format!(
                        "transfer failed ({e}) and the source could not be restored ({rollback})"
                    )));
                }
                Err(e)
            }
        }
    }

    fn ensure_product(&self, product_id: Uuid) -> Result<(), DomainError> {
        self.products
            .find_by_id(product_id)?
            .map(|_| ())
            .ok_or(DomainError::NotFound("Product"))
    }

    fn ensure_site(&self, site_id: Uuid) -> Result<(), DomainError> {
        self.sites
            .find_by_id(site_id)?
            .map(|_| ())
            .ok_or(DomainError::NotFound("Site"))
    }
}
