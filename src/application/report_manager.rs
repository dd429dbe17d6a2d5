//! CSV exports for the back office.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::domain::attendance::AttendanceFilter;
use crate::domain::errors::DomainError;
use crate::domain::order::{Order, OrderFilter};
use crate::domain::ports::{
    AttendanceRepository, InventoryRepository, OrderRepository, ProductRepository, SiteRepository,
};

const PAGE_SIZE: i64 = 100;

#[derive(Clone)]
pub struct ReportManager {
    orders: Arc<dyn OrderRepository>,
    inventory: Arc<dyn InventoryRepository>,
    products: Arc<dyn ProductRepository>,
    sites: Arc<dyn SiteRepository>,
    attendance: Arc<dyn AttendanceRepository>,
}

fn csv_error(e: impl std::fmt::Display) -> DomainError {
    DomainError::Internal(format!("could not write CSV: {e}"))
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String, DomainError> {
    let bytes = writer.into_inner().map_err(csv_error)?;
    String::from_utf8(bytes).map_err(csv_error)
}

impl ReportManager {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        inventory: Arc<dyn InventoryRepository>,
        products: Arc<dyn ProductRepository>,
        sites: Arc<dyn SiteRepository>,
        attendance: Arc<dyn AttendanceRepository>,
    ) -> Self {
        Self {
            orders,
            inventory,
            products,
            sites,
            attendance,
        }
    }

    /// Every order matching `filter`, newest first. Paging fields are ignored.
    pub fn orders_csv(&self, filter: OrderFilter) -> Result<String, DomainError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record([
                "id",
                "client_id",
                "site_id",
                "status",
                "subtotal",
                "discount",
                "total",
                "created_at",
            ])
            .map_err(csv_error)?;

        for order in self.all_orders(filter)? {
            writer
                .write_record([
                    order.id.to_string(),
                    order.client_id.to_string(),
                    order.site_id.to_string(),
                    order.status.to_string(),
                    order.subtotal.to_string(),
                    order.discount.to_string(),
                    order.total.to_string(),
                    timestamp(order.created_at),
                ])
                .map_err(csv_error)?;
        }
        finish(writer)
    }

    pub fn inventory_csv(&self, site_id: Uuid) -> Result<String, DomainError> {
        self.sites
            .find_by_id(site_id)?
            .ok_or(DomainError::NotFound("Site"))?;
        let items = self.inventory.list_by_site(site_id)?;
        let ids: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();
        let products = self.products.find_many(&ids)?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(["product_id", "product_name", "quantity", "min_stock", "low"])
            .map_err(csv_error)?;
        for item in items {
            let name = products
                .iter()
                .find(|p| p.id == item.product_id)
                .map(|p| p.name.as_str())
                .unwrap_or("");
            writer
                .write_record([
                    item.product_id.to_string(),
                    name.to_string(),
                    item.quantity.to_string(),
                    item.min_stock.to_string(),
                    item.is_low().to_string(),
                ])
                .map_err(csv_error)?;
        }
        finish(writer)
    }

    pub fn attendance_csv(
        &self,
        employee_id: Option<Uuid>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<String, DomainError> {
        if to <= from {
            return Err(DomainError::invalid("'to' must be after 'from'"));
        }
        let records = self.attendance.list(&AttendanceFilter {
            employee_id,
            from: Some(from),
            to: Some(to),
        })?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record([
                "employee_id",
                "check_in",
                "check_out",
                "worked_minutes",
                "late",
            ])
            .map_err(csv_error)?;
        for record in records {
            writer
                .write_record([
                    record.employee_id.to_string(),
                    timestamp(record.check_in),
                    record.check_out.map(timestamp).unwrap_or_default(),
                    record
                        .worked_minutes()
                        .map(|m| m.to_string())
                        .unwrap_or_default(),
                    record.late.to_string(),
                ])
                .map_err(csv_error)?;
        }
        finish(writer)
    }

    fn all_orders(&self, filter: OrderFilter) -> Result<Vec<Order>, DomainError> {
        let mut orders = Vec::new();
        let mut page = 1;
        loop {
            let batch = self.orders.list(&OrderFilter {
                page,
                limit: PAGE_SIZE,
                ..filter.clone()
            })?;
            let fetched = batch.items.len() as i64;
            orders.extend(batch.items);
            if fetched < PAGE_SIZE || orders.len() as i64 >= batch.total {
                return Ok(orders);
            }
            page += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bigdecimal::BigDecimal;
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::domain::attendance::NewAttendance;
    use crate::domain::order::NewOrder;
    use crate::application::testing::MemoryDb;
    use crate::domain::user::Role;

    fn manager(db: &Arc<MemoryDb>) -> ReportManager {
        ReportManager::new(db.clone(), db.clone(), db.clone(), db.clone(), db.clone())
    }

    #[test]
    fn orders_report_has_header_and_one_row_per_order() {
        let db = MemoryDb::new();
        let client = db.seed_user(Role::Client).id;
        let site = db.seed_site("Centro").id;
        for _ in 0..3 {
            OrderRepository::insert(
                db.as_ref(),
                NewOrder {
                    client_id: client,
                    site_id: site,
                    subtotal: "7.00".parse::<BigDecimal>().unwrap(),
                    discount: "0.00".parse::<BigDecimal>().unwrap(),
                    total: "7.00".parse::<BigDecimal>().unwrap(),
                    promotion_code: None,
                    notes: None,
                },
            )
            .unwrap();
        }

        let csv = manager(&db).orders_csv(OrderFilter::default()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "id,client_id,site_id,status,subtotal,discount,total,created_at"
        );
        assert_eq!(lines.len(), 4);
        assert!(lines[1].contains(",pending,7.00,0.00,7.00,"));
    }

    #[test]
    fn inventory_report_flags_low_rows() {
        let db = MemoryDb::new();
        let site = db.seed_site("Centro").id;
        let bread = db.seed_product("Rye, sliced", "2.00").id;
        db.seed_stock(bread, site, 2, 5);

        let csv = manager(&db).inventory_csv(site).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("product_id,product_name,quantity,min_stock,low")
        );
        assert_eq!(lines.next(), Some(format!("{bread},\"Rye, sliced\",2,5,true").as_str()));
        assert!(manager(&db).inventory_csv(Uuid::new_v4()).is_err());
    }

    #[test]
    fn attendance_report_leaves_open_records_blank() {
        let db = MemoryDb::new();
        let employee = db.seed_user(Role::Employee).id;
        let check_in = Utc.with_ymd_and_hms(2026, 3, 2, 6, 0, 0).unwrap();
        let record = AttendanceRepository::create(
            db.as_ref(),
            NewAttendance {
                employee_id: employee,
                shift_id: None,
                check_in,
                late: false,
            },
        )
        .unwrap();
        AttendanceRepository::create(
            db.as_ref(),
            NewAttendance {
                employee_id: employee,
                shift_id: None,
                check_in: check_in + Duration::hours(9),
                late: true,
            },
        )
        .unwrap();
        db.close(record.id, check_in + Duration::hours(8)).unwrap();

        let csv = manager(&db)
            .attendance_csv(Some(employee), check_in - Duration::hours(1), check_in + Duration::days(1))
            .unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "employee_id,check_in,check_out,worked_minutes,late");
        assert_eq!(
            lines[1],
            format!("{employee},2026-03-02T06:00:00Z,2026-03-02T14:00:00Z,480,false")
        );
        assert_eq!(lines[2], format!("{employee},2026-03-02T15:00:00Z,,,true"));
    }
}
