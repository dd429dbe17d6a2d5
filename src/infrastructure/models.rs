use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::attendance::Attendance;
use crate::domain::claim::Claim;
use crate::domain::errors::DomainError;
use crate::domain::inventory::InventoryItem;
use crate::domain::notification::Notification;
use crate::domain::order::{Order, OrderLine};
use crate::domain::product::{Product, ProductUpdate};
use crate::domain::promotion::{Promotion, PromotionUpdate};
use crate::domain::purchase::{Purchase, PurchaseLine};
use crate::domain::shift::Shift;
use crate::domain::site::{Site, SiteUpdate};
use crate::domain::supplier::{Supplier, SupplierUpdate};
use crate::domain::user::User;
use crate::schema::{
    attendance, claims, inventory, notifications, order_lines, orders, products, promotions,
    purchase_lines, purchases, shifts, sites, suppliers, users,
};

// ── People & catalog ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role: String,
    pub active: bool,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = DomainError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            email: row.email,
            full_name: row.full_name,
            phone: row.phone,
            role: row.role.parse().map_err(stored_value)?,
            active: row.active,
            password_hash: row.password_hash,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = sites)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SiteRow {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<SiteRow> for Site {
    fn from(row: SiteRow) -> Self {
        Site {
            id: row.id,
            name: row.name,
            address: row.address,
            active: row.active,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = sites)]
pub struct NewSiteRow {
    pub id: Uuid,
    pub name: String,
    pub address: String,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = sites)]
pub struct SiteChangeset {
    pub name: Option<String>,
    pub address: Option<String>,
    pub active: Option<bool>,
}

impl From<SiteUpdate> for SiteChangeset {
    fn from(u: SiteUpdate) -> Self {
        SiteChangeset {
            name: u.name,
            address: u.address,
            active: u.active,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: BigDecimal,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            description: row.description,
            category: row.category,
            price: row.price,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = products)]
pub struct NewProductRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: BigDecimal,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = products)]
pub struct ProductChangeset {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<BigDecimal>,
    pub active: Option<bool>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductUpdate> for ProductChangeset {
    fn from(u: ProductUpdate) -> Self {
        ProductChangeset {
            name: u.name,
            description: u.description,
            category: u.category,
            price: u.price,
            active: u.active,
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = suppliers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SupplierRow {
    pub id: Uuid,
    pub name: String,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<SupplierRow> for Supplier {
    fn from(row: SupplierRow) -> Self {
        Supplier {
            id: row.id,
            name: row.name,
            contact_name: row.contact_name,
            phone: row.phone,
            email: row.email,
            active: row.active,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = suppliers)]
pub struct NewSupplierRow {
    pub id: Uuid,
    pub name: String,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = suppliers)]
pub struct SupplierChangeset {
    pub name: Option<String>,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub active: Option<bool>,
}

impl From<SupplierUpdate> for SupplierChangeset {
    fn from(u: SupplierUpdate) -> Self {
        SupplierChangeset {
            name: u.name,
            contact_name: u.contact_name,
            phone: u.phone,
            email: u.email,
            active: u.active,
        }
    }
}

// ── Stock & sales ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = inventory)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct InventoryRow {
    pub id: Uuid,
    pub product_id: Uuid,
    pub site_id: Uuid,
    pub quantity: i32,
    pub min_stock: i32,
    pub updated_at: DateTime<Utc>,
}

impl From<InventoryRow> for InventoryItem {
    fn from(row: InventoryRow) -> Self {
        InventoryItem {
            id: row.id,
            product_id: row.product_id,
            site_id: row.site_id,
            quantity: row.quantity,
            min_stock: row.min_stock,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = inventory)]
pub struct NewInventoryRow {
    pub id: Uuid,
    pub product_id: Uuid,
    pub site_id: Uuid,
    pub quantity: i32,
    pub min_stock: i32,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = purchases)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PurchaseRow {
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub site_id: Uuid,
    pub status: String,
    pub total: BigDecimal,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub received_at: Option<DateTime<Utc>>,
}

impl PurchaseRow {
    pub fn into_domain(self, lines: Vec<PurchaseLine>) -> Result<Purchase, DomainError> {
        Ok(Purchase {
            id: self.id,
            supplier_id: self.supplier_id,
            site_id: self.site_id,
            status: self.status.parse().map_err(stored_value)?,
            total: self.total,
            created_by: self.created_by,
            created_at: self.created_at,
            received_at: self.received_at,
            lines,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = purchases)]
pub struct NewPurchaseRow {
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub site_id: Uuid,
    pub status: String,
    pub total: BigDecimal,
    pub created_by: Uuid,
}

#[derive(
    Debug, Clone, Queryable, Selectable, Identifiable, Associations,
)]
#[diesel(table_name = purchase_lines)]
#[diesel(belongs_to(PurchaseRow, foreign_key = purchase_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PurchaseLineRow {
    pub id: Uuid,
    pub purchase_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_cost: BigDecimal,
}

impl From<PurchaseLineRow> for PurchaseLine {
    fn from(row: PurchaseLineRow) -> Self {
        PurchaseLine {
            id: row.id,
            purchase_id: row.purchase_id,
            product_id: row.product_id,
            quantity: row.quantity,
            unit_cost: row.unit_cost,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = purchase_lines)]
pub struct NewPurchaseLineRow {
    pub id: Uuid,
    pub purchase_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_cost: BigDecimal,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: Uuid,
    pub client_id: Uuid,
    pub site_id: Uuid,
    pub status: String,
    pub subtotal: BigDecimal,
    pub discount: BigDecimal,
    pub total: BigDecimal,
    pub promotion_code: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderRow {
    pub fn into_domain(self, lines: Vec<OrderLine>) -> Result<Order, DomainError> {
        Ok(Order {
            id: self.id,
            client_id: self.client_id,
            site_id: self.site_id,
            status: self.status.parse().map_err(stored_value)?,
            subtotal: self.subtotal,
            discount: self.discount,
            total: self.total,
            promotion_code: self.promotion_code,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
            lines,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
    pub id: Uuid,
    pub client_id: Uuid,
    pub site_id: Uuid,
    pub status: String,
    pub subtotal: BigDecimal,
    pub discount: BigDecimal,
    pub total: BigDecimal,
    pub promotion_code: Option<String>,
    pub notes: Option<String>,
}

#[derive(
    Debug, Clone, Queryable, Selectable, Identifiable, Associations,
)]
#[diesel(table_name = order_lines)]
#[diesel(belongs_to(OrderRow, foreign_key = order_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderLineRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

impl From<OrderLineRow> for OrderLine {
    fn from(row: OrderLineRow) -> Self {
        OrderLine {
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            quantity: row.quantity,
            unit_price: row.unit_price,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_lines)]
pub struct NewOrderLineRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = promotions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PromotionRow {
    pub id: Uuid,
    pub code: String,
    pub description: String,
    pub discount_percent: i32,
    pub product_id: Option<Uuid>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<PromotionRow> for Promotion {
    fn from(row: PromotionRow) -> Self {
        Promotion {
            id: row.id,
            code: row.code,
            description: row.description,
            discount_percent: row.discount_percent,
            product_id: row.product_id,
            starts_at: row.starts_at,
            ends_at: row.ends_at,
            active: row.active,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = promotions)]
pub struct NewPromotionRow {
    pub id: Uuid,
    pub code: String,
    pub description: String,
    pub discount_percent: i32,
    pub product_id: Option<Uuid>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = promotions)]
pub struct PromotionChangeset {
    pub description: Option<String>,
    pub discount_percent: Option<i32>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub active: Option<bool>,
}

impl From<PromotionUpdate> for PromotionChangeset {
    fn from(u: PromotionUpdate) -> Self {
        PromotionChangeset {
            description: u.description,
            discount_percent: u.discount_percent,
            starts_at: u.starts_at,
            ends_at: u.ends_at,
            active: u.active,
        }
    }
}

// ── Staff & service ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = shifts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ShiftRow {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub site_id: Uuid,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ShiftRow> for Shift {
    fn from(row: ShiftRow) -> Self {
        Shift {
            id: row.id,
            employee_id: row.employee_id,
            site_id: row.site_id,
            starts_at: row.starts_at,
            ends_at: row.ends_at,
            notes: row.notes,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = shifts)]
pub struct NewShiftRow {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub site_id: Uuid,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub notes: Option<String>,
}

/// Full replacement of a shift's editable fields; `notes: None` clears them.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = shifts)]
#[diesel(treat_none_as_null = true)]
pub struct ShiftChangeset {
    pub employee_id: Uuid,
    pub site_id: Uuid,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = attendance)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AttendanceRow {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub shift_id: Option<Uuid>,
    pub check_in: DateTime<Utc>,
    pub check_out: Option<DateTime<Utc>>,
    pub late: bool,
}

impl From<AttendanceRow> for Attendance {
    fn from(row: AttendanceRow) -> Self {
        Attendance {
            id: row.id,
            employee_id: row.employee_id,
            shift_id: row.shift_id,
            check_in: row.check_in,
            check_out: row.check_out,
            late: row.late,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = attendance)]
pub struct NewAttendanceRow {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub shift_id: Option<Uuid>,
    pub check_in: DateTime<Utc>,
    pub late: bool,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = claims)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ClaimRow {
    pub id: Uuid,
    pub client_id: Uuid,
    pub order_id: Option<Uuid>,
    pub subject: String,
    pub description: String,
    pub status: String,
    pub response: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ClaimRow> for Claim {
    type Error = DomainError;

    fn try_from(row: ClaimRow) -> Result<Self, Self::Error> {
        Ok(Claim {
            id: row.id,
            client_id: row.client_id,
            order_id: row.order_id,
            subject: row.subject,
            description: row.description,
            status: row.status.parse().map_err(stored_value)?,
            response: row.response,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = claims)]
pub struct NewClaimRow {
    pub id: Uuid,
    pub client_id: Uuid,
    pub order_id: Option<Uuid>,
    pub subject: String,
    pub description: String,
    pub status: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NotificationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = DomainError;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        Ok(Notification {
            id: row.id,
            user_id: row.user_id,
            kind: row.kind.parse().map_err(stored_value)?,
            title: row.title,
            message: row.message,
            read: row.read,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = notifications)]
pub struct NewNotificationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub title: String,
    pub message: String,
}

/// A status or role string in the database that the domain does not know is a
/// data problem, not a caller mistake.
fn stored_value(e: DomainError) -> DomainError {
    DomainError::Internal(format!("unexpected stored value: {e}"))
}
