use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::SupplierRepository;
use crate::domain::supplier::{NewSupplier, Supplier, SupplierUpdate};
use crate::schema::suppliers;

use super::models::{NewSupplierRow, SupplierChangeset, SupplierRow};

pub struct DieselSupplierRepository {
    pool: DbPool,
}

impl DieselSupplierRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl SupplierRepository for DieselSupplierRepository {
    fn create(&self, supplier: NewSupplier) -> Result<Supplier, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(suppliers::table)
            .values(&NewSupplierRow {
                id: Uuid::new_v4(),
                name: supplier.name,
                contact_name: supplier.contact_name,
                phone: supplier.phone,
                email: supplier.email,
            })
            .returning(SupplierRow::as_returning())
            .get_result::<SupplierRow>(&mut conn)?;
        Ok(row.into())
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Supplier>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = suppliers::table
            .find(id)
            .select(SupplierRow::as_select())
            .first::<SupplierRow>(&mut conn)
            .optional()?;
        Ok(row.map(Supplier::from))
    }

    fn list(&self, active_only: bool) -> Result<Vec<Supplier>, DomainError> {
        let mut conn = self.pool.get()?;
        let mut query = suppliers::table
            .select(SupplierRow::as_select())
            .into_boxed();
        if active_only {
            query = query.filter(suppliers::active.eq(true));
        }
        let rows = query
            .order(suppliers::name.asc())
            .load::<SupplierRow>(&mut conn)?;
        Ok(rows.into_iter().map(Supplier::from).collect())
    }

    fn update(&self, id: Uuid, changes: SupplierUpdate) -> Result<Option<Supplier>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::update(suppliers::table.find(id))
            .set(&SupplierChangeset::from(changes))
            .returning(SupplierRow::as_returning())
            .get_result::<SupplierRow>(&mut conn)
            .optional()?;
        Ok(row.map(Supplier::from))
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(suppliers::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }
}
