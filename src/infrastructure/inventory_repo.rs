use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::inventory::{InventoryItem, NewInventoryItem};
use crate::domain::ports::InventoryRepository;
use crate::schema::inventory;

use super::models::{InventoryRow, NewInventoryRow};

pub struct DieselInventoryRepository {
    pool: DbPool,
}

impl DieselInventoryRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl InventoryRepository for DieselInventoryRepository {
    fn find(&self, product_id: Uuid, site_id: Uuid) -> Result<Option<InventoryItem>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = inventory::table
            .filter(inventory::product_id.eq(product_id))
            .filter(inventory::site_id.eq(site_id))
            .select(InventoryRow::as_select())
            .first::<InventoryRow>(&mut conn)
            .optional()?;
        Ok(row.map(InventoryItem::from))
    }

    fn create(&self, item: NewInventoryItem) -> Result<InventoryItem, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(inventory::table)
            .values(&NewInventoryRow {
                id: Uuid::new_v4(),
                product_id: item.product_id,
                site_id: item.site_id,
                quantity: item.quantity,
                min_stock: item.min_stock,
            })
            .returning(InventoryRow::as_returning())
            .get_result::<InventoryRow>(&mut conn)?;
        Ok(row.into())
    }

    fn set_quantity(&self, id: Uuid, quantity: i32) -> Result<Option<InventoryItem>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::update(inventory::table.find(id))
            .set((
                inventory::quantity.eq(quantity),
                inventory::updated_at.eq(Utc::now()),
            ))
            .returning(InventoryRow::as_returning())
            .get_result::<InventoryRow>(&mut conn)
            .optional()?;
        Ok(row.map(InventoryItem::from))
    }

    fn set_min_stock(
        &self,
        id: Uuid,
        min_stock: i32,
    ) -> Result<Option<InventoryItem>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::update(inventory::table.find(id))
            .set((
                inventory::min_stock.eq(min_stock),
                inventory::updated_at.eq(Utc::now()),
            ))
            .returning(InventoryRow::as_returning())
            .get_result::<InventoryRow>(&mut conn)
            .optional()?;
        Ok(row.map(InventoryItem::from))
    }

    fn list_by_site(&self, site_id: Uuid) -> Result<Vec<InventoryItem>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = inventory::table
            .filter(inventory::site_id.eq(site_id))
            .select(InventoryRow::as_select())
            .order(inventory::product_id.asc())
            .load::<InventoryRow>(&mut conn)?;
        Ok(rows.into_iter().map(InventoryItem::from).collect())
    }

    fn list_low_stock(&self, site_id: Option<Uuid>) -> Result<Vec<InventoryItem>, DomainError> {
        let mut conn = self.pool.get()?;
        let mut query = inventory::table
            .filter(inventory::quantity.le(inventory::min_stock))
            .select(InventoryRow::as_select())
            .into_boxed();
        if let Some(site_id) = site_id {
            query = query.filter(inventory::site_id.eq(site_id));
        }
        let rows = query
            .order(inventory::quantity.asc())
            .load::<InventoryRow>(&mut conn)?;
        Ok(rows.into_iter().map(InventoryItem::from).collect())
    }
}
