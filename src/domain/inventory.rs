use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Stock of one product at one site.
#[derive(Debug, Clone)]
pub struct InventoryItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub site_id: Uuid,
    pub quantity: i32,
    pub min_stock: i32,
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    pub fn is_low(&self) -> bool {
        self.quantity <= self.min_stock
    }
}

#[derive(Debug, Clone)]
pub struct NewInventoryItem {
    pub product_id: Uuid,
    pub site_id: Uuid,
    pub quantity: i32,
    pub min_stock: i32,
}

#[derive(Debug, Clone)]
pub struct Transfer {
    pub source: InventoryItem,
    pub destination: InventoryItem,
}
