//! Table access traits. Each implementation is a thin wrapper over single
//! table operations; any multi-step consistency lives in the managers.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::attendance::{Attendance, AttendanceFilter, NewAttendance};
use super::claim::{Claim, ClaimFilter, ClaimStatus, NewClaim};
use super::errors::DomainError;
use super::inventory::{InventoryItem, NewInventoryItem};
use super::notification::{NewNotification, Notification};
use super::order::{NewOrder, NewOrderLine, Order, OrderFilter, OrderLine, OrderPage, OrderStatus};
use super::product::{NewProduct, Product, ProductFilter, ProductUpdate};
use super::promotion::{NewPromotion, Promotion, PromotionUpdate};
use super::purchase::{
    NewPurchase, Purchase, PurchaseFilter, PurchaseLine, PurchaseLineInput, PurchaseStatus,
};
use super::shift::{NewShift, Shift, ShiftFilter};
use super::site::{NewSite, Site, SiteUpdate};
use super::supplier::{NewSupplier, Supplier, SupplierUpdate};
use super::user::{NewUser, Role, User};

pub trait UserRepository: Send + Sync + 'static {
    fn create(&self, user: NewUser) -> Result<User, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError>;
    fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;
    fn list(&self, role: Option<Role>) -> Result<Vec<User>, DomainError>;
    fn update_role(&self, id: Uuid, role: Role) -> Result<Option<User>, DomainError>;
    fn set_active(&self, id: Uuid, active: bool) -> Result<Option<User>, DomainError>;
}

pub trait SiteRepository: Send + Sync + 'static {
    fn create(&self, site: NewSite) -> Result<Site, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<Site>, DomainError>;
    fn list(&self, active_only: bool) -> Result<Vec<Site>, DomainError>;
    fn update(&self, id: Uuid, changes: SiteUpdate) -> Result<Option<Site>, DomainError>;
}

pub trait ProductRepository: Send + Sync + 'static {
    fn create(&self, product: NewProduct) -> Result<Product, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError>;
    fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Product>, DomainError>;
    fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, DomainError>;
    fn update(&self, id: Uuid, changes: ProductUpdate) -> Result<Option<Product>, DomainError>;
    fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
}

pub trait SupplierRepository: Send + Sync + 'static {
    fn create(&self, supplier: NewSupplier) -> Result<Supplier, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<Supplier>, DomainError>;
    fn list(&self, active_only: bool) -> Result<Vec<Supplier>, DomainError>;
    fn update(&self, id: Uuid, changes: SupplierUpdate) -> Result<Option<Supplier>, DomainError>;
    fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
}

pub trait InventoryRepository: Send + Sync + 'static {
    fn find(&self, product_id: Uuid, site_id: Uuid) -> Result<Option<InventoryItem>, DomainError>;
    fn create(&self, item: NewInventoryItem) -> Result<InventoryItem, DomainError>;
    fn set_quantity(&self, id: Uuid, quantity: i32) -> Result<Option<InventoryItem>, DomainError>;
    fn set_min_stock(&self, id: Uuid, min_stock: i32)
        -> Result<Option<InventoryItem>, DomainError>;
    fn list_by_site(&self, site_id: Uuid) -> Result<Vec<InventoryItem>, DomainError>;
    fn list_low_stock(&self, site_id: Option<Uuid>) -> Result<Vec<InventoryItem>, DomainError>;
}

pub trait PurchaseRepository: Send + Sync + 'static {
    fn insert(&self, purchase: NewPurchase) -> Result<Purchase, DomainError>;
    fn insert_lines(
        &self,
        purchase_id: Uuid,
        lines: &[PurchaseLineInput],
    ) -> Result<Vec<PurchaseLine>, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<Purchase>, DomainError>;
    fn list(&self, filter: &PurchaseFilter) -> Result<Vec<Purchase>, DomainError>;
    fn update_status(
        &self,
        id: Uuid,
        status: PurchaseStatus,
        received_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Purchase>, DomainError>;
    fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
}

pub trait OrderRepository: Send + Sync + 'static {
    fn insert(&self, order: NewOrder) -> Result<Order, DomainError>;
    fn insert_lines(
        &self,
        order_id: Uuid,
        lines: &[NewOrderLine],
    ) -> Result<Vec<OrderLine>, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError>;
    /// Orders without their lines, newest first.
    fn list(&self, filter: &OrderFilter) -> Result<OrderPage, DomainError>;
    fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<Option<Order>, DomainError>;
    fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
}

pub trait PromotionRepository: Send + Sync + 'static {
    fn create(&self, promotion: NewPromotion) -> Result<Promotion, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<Promotion>, DomainError>;
    fn find_by_code(&self, code: &str) -> Result<Option<Promotion>, DomainError>;
    fn list(&self, active_only: bool) -> Result<Vec<Promotion>, DomainError>;
    fn update(&self, id: Uuid, changes: PromotionUpdate)
        -> Result<Option<Promotion>, DomainError>;
    fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
}

pub trait ShiftRepository: Send + Sync + 'static {
    fn create(&self, shift: NewShift) -> Result<Shift, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<Shift>, DomainError>;
    fn list(&self, filter: &ShiftFilter) -> Result<Vec<Shift>, DomainError>;
    fn update(&self, id: Uuid, shift: NewShift) -> Result<Option<Shift>, DomainError>;
    fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
}

pub trait AttendanceRepository: Send + Sync + 'static {
    fn create(&self, record: NewAttendance) -> Result<Attendance, DomainError>;
    fn find_open(&self, employee_id: Uuid) -> Result<Option<Attendance>, DomainError>;
    fn close(&self, id: Uuid, check_out: DateTime<Utc>) -> Result<Option<Attendance>, DomainError>;
    fn list(&self, filter: &AttendanceFilter) -> Result<Vec<Attendance>, DomainError>;
}

pub trait ClaimRepository: Send + Sync + 'static {
    fn create(&self, claim: NewClaim) -> Result<Claim, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<Claim>, DomainError>;
    fn list(&self, filter: &ClaimFilter) -> Result<Vec<Claim>, DomainError>;
    fn update_status(
        &self,
        id: Uuid,
        status: ClaimStatus,
        response: Option<String>,
    ) -> Result<Option<Claim>, DomainError>;
}

pub trait NotificationRepository: Send + Sync + 'static {
    fn create_many(&self, items: Vec<NewNotification>) -> Result<Vec<Notification>, DomainError>;
    fn list_for_user(&self, user_id: Uuid, unread_only: bool)
        -> Result<Vec<Notification>, DomainError>;
    fn mark_read(&self, id: Uuid, user_id: Uuid) -> Result<bool, DomainError>;
    fn mark_all_read(&self, user_id: Uuid) -> Result<usize, DomainError>;
}
