use chrono::Utc;
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrder, NewOrderLine, Order, OrderFilter, OrderLine, OrderPage, OrderStatus};
use crate::domain::ports::OrderRepository;
use crate::schema::{order_lines, orders};

use super::models::{NewOrderLineRow, NewOrderRow, OrderLineRow, OrderRow};

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn with_lines(&self, conn: &mut PgConnection, row: OrderRow) -> Result<Order, DomainError> {
        let lines = order_lines::table
            .filter(order_lines::order_id.eq(row.id))
            .select(OrderLineRow::as_select())
            .load::<OrderLineRow>(conn)?;
        row.into_domain(lines.into_iter().map(OrderLine::from).collect())
    }
}

fn filtered(filter: &OrderFilter) -> orders::BoxedQuery<'static, Pg> {
    let mut query = orders::table.into_boxed();
    if let Some(client_id) = filter.client_id {
        query = query.filter(orders::client_id.eq(client_id));
    }
    if let Some(site_id) = filter.site_id {
        query = query.filter(orders::site_id.eq(site_id));
    }
    if let Some(status) = filter.status {
        query = query.filter(orders::status.eq(status.as_str()));
    }
    query
}

impl OrderRepository for DieselOrderRepository {
    fn insert(&self, order: NewOrder) -> Result<Order, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(orders::table)
            .values(&NewOrderRow {
                id: Uuid::new_v4(),
                client_id: order.client_id,
                site_id: order.site_id,
                status: OrderStatus::Pending.as_str().to_string(),
                subtotal: order.subtotal,
                discount: order.discount,
                total: order.total,
                promotion_code: order.promotion_code,
                notes: order.notes,
            })
            .returning(OrderRow::as_returning())
            .get_result::<OrderRow>(&mut conn)?;
        row.into_domain(vec![])
    }

    fn insert_lines(
        &self,
        order_id: Uuid,
        lines: &[NewOrderLine],
    ) -> Result<Vec<OrderLine>, DomainError> {
        let mut conn = self.pool.get()?;
        let new_lines: Vec<NewOrderLineRow> = lines
            .iter()
            .map(|l| NewOrderLineRow {
                id: Uuid::new_v4(),
                order_id,
                product_id: l.product_id,
                quantity: l.quantity,
                unit_price: l.unit_price.clone(),
            })
            .collect();
        let rows = diesel::insert_into(order_lines::table)
            .values(&new_lines)
            .returning(OrderLineRow::as_returning())
            .get_results::<OrderLineRow>(&mut conn)?;
        Ok(rows.into_iter().map(OrderLine::from).collect())
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = orders::table
            .find(id)
            .select(OrderRow::as_select())
            .first::<OrderRow>(&mut conn)
            .optional()?;
        row.map(|row| self.with_lines(&mut conn, row)).transpose()
    }

    fn list(&self, filter: &OrderFilter) -> Result<OrderPage, DomainError> {
        let mut conn = self.pool.get()?;

        let total: i64 = filtered(filter).count().get_result(&mut conn)?;
        let rows = filtered(filter)
            .select(OrderRow::as_select())
            .order(orders::created_at.desc())
            .limit(filter.limit)
            .offset(filter.offset())
            .load::<OrderRow>(&mut conn)?;

        Ok(OrderPage {
            items: rows
                .into_iter()
                .map(|row| row.into_domain(vec![]))
                .collect::<Result<_, _>>()?,
            total,
        })
    }

    fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::update(orders::table.find(id))
            .set((
                orders::status.eq(status.as_str()),
                orders::updated_at.eq(Utc::now()),
            ))
            .returning(OrderRow::as_returning())
            .get_result::<OrderRow>(&mut conn)
            .optional()?;
        row.map(|row| self.with_lines(&mut conn, row)).transpose()
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(orders::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }
}
