use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::PurchaseRepository;
use crate::domain::purchase::{
    NewPurchase, Purchase, PurchaseFilter, PurchaseLine, PurchaseLineInput, PurchaseStatus,
};
use crate::schema::{purchase_lines, purchases};

use super::models::{NewPurchaseLineRow, NewPurchaseRow, PurchaseLineRow, PurchaseRow};

pub struct DieselPurchaseRepository {
    pool: DbPool,
}

impl DieselPurchaseRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn with_lines(&self, conn: &mut PgConnection, row: PurchaseRow) -> Result<Purchase, DomainError> {
        let lines = purchase_lines::table
            .filter(purchase_lines::purchase_id.eq(row.id))
            .select(PurchaseLineRow::as_select())
            .load::<PurchaseLineRow>(conn)?;
        row.into_domain(lines.into_iter().map(PurchaseLine::from).collect())
    }
}

impl PurchaseRepository for DieselPurchaseRepository {
    fn insert(&self, purchase: NewPurchase) -> Result<Purchase, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(purchases::table)
            .values(&NewPurchaseRow {
                id: Uuid::new_v4(),
                supplier_id: purchase.supplier_id,
                site_id: purchase.site_id,
                status: PurchaseStatus::Pending.as_str().to_string(),
                total: purchase.total,
                created_by: purchase.created_by,
            })
            .returning(PurchaseRow::as_returning())
            .get_result::<PurchaseRow>(&mut conn)?;
        row.into_domain(vec![])
    }

    fn insert_lines(
        &self,
        purchase_id: Uuid,
        lines: &[PurchaseLineInput],
    ) -> Result<Vec<PurchaseLine>, DomainError> {
        let mut conn = self.pool.get()?;
        let new_lines: Vec<NewPurchaseLineRow> = lines
            .iter()
            .map(|l| NewPurchaseLineRow {
                id: Uuid::new_v4(),
                purchase_id,
                product_id: l.product_id,
                quantity: l.quantity,
                unit_cost: l.unit_cost.clone(),
            })
            .collect();
        let rows = diesel::insert_into(purchase_lines::table)
            .values(&new_lines)
            .returning(PurchaseLineRow::as_returning())
            .get_results::<PurchaseLineRow>(&mut conn)?;
        Ok(rows.into_iter().map(PurchaseLine::from).collect())
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Purchase>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = purchases::table
            .find(id)
            .select(PurchaseRow::as_select())
            .first::<PurchaseRow>(&mut conn)
            .optional()?;
        row.map(|row| self.with_lines(&mut conn, row)).transpose()
    }

    fn list(&self, filter: &PurchaseFilter) -> Result<Vec<Purchase>, DomainError> {
        let mut conn = self.pool.get()?;
        let mut query = purchases::table
            .select(PurchaseRow::as_select())
            .into_boxed();
        if let Some(status) = filter.status {
            query = query.filter(purchases::status.eq(status.as_str()));
        }
        if let Some(site_id) = filter.site_id {
            query = query.filter(purchases::site_id.eq(site_id));
        }
        if let Some(supplier_id) = filter.supplier_id {
            query = query.filter(purchases::supplier_id.eq(supplier_id));
        }
        let rows = query
            .order(purchases::created_at.desc())
            .load::<PurchaseRow>(&mut conn)?;

        let lines = PurchaseLineRow::belonging_to(&rows)
            .select(PurchaseLineRow::as_select())
            .load::<PurchaseLineRow>(&mut conn)?;
        lines
            .grouped_by(&rows)
            .into_iter()
            .zip(rows)
            .map(|(lines, row)| row.into_domain(lines.into_iter().map(PurchaseLine::from).collect()))
            .collect()
    }

    fn update_status(
        &self,
        id: Uuid,
        status: PurchaseStatus,
        received_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Purchase>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::update(purchases::table.find(id))
            .set((
                purchases::status.eq(status.as_str()),
                purchases::received_at.eq(received_at),
            ))
            .returning(PurchaseRow::as_returning())
            .get_result::<PurchaseRow>(&mut conn)
            .optional()?;
        row.map(|row| self.with_lines(&mut conn, row)).transpose()
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(purchases::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }
}
