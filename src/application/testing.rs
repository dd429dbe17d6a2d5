//! In-memory table doubles for manager tests, with switches that make single
//! calls fail so compensation paths can be exercised.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::attendance::{Attendance, AttendanceFilter, NewAttendance};
use crate::domain::claim::{Claim, ClaimFilter, ClaimStatus, NewClaim};
use crate::domain::errors::DomainError;
use crate::domain::inventory::{InventoryItem, NewInventoryItem};
use crate::domain::notification::{NewNotification, Notification};
use crate::domain::order::{
    NewOrder, NewOrderLine, Order, OrderFilter, OrderLine, OrderPage, OrderStatus,
};
use crate::domain::ports::*;
use crate::domain::product::{NewProduct, Product, ProductFilter, ProductUpdate};
use crate::domain::promotion::{NewPromotion, Promotion, PromotionUpdate};
use crate::domain::purchase::{
    NewPurchase, Purchase, PurchaseFilter, PurchaseLine, PurchaseLineInput, PurchaseStatus,
};
use crate::domain::shift::{NewShift, Shift, ShiftFilter};
use crate::domain::site::{NewSite, Site, SiteUpdate};
use crate::domain::supplier::{NewSupplier, Supplier, SupplierUpdate};
use crate::domain::user::{NewUser, Role, User};

#[derive(Default)]
pub struct MemoryDb {
    pub users: Mutex<Vec<User>>,
    pub sites: Mutex<Vec<Site>>,
    pub products: Mutex<Vec<Product>>,
    pub suppliers: Mutex<Vec<Supplier>>,
    pub inventory: Mutex<Vec<InventoryItem>>,
    pub purchases: Mutex<Vec<Purchase>>,
    pub orders: Mutex<Vec<Order>>,
    pub promotions: Mutex<Vec<Promotion>>,
    pub shifts: Mutex<Vec<Shift>>,
    pub attendance: Mutex<Vec<Attendance>>,
    pub claims: Mutex<Vec<Claim>>,
    pub notifications: Mutex<Vec<Notification>>,

    /// Stock writes for these (product, site) pairs fail.
    pub failing_stock: Mutex<HashSet<(Uuid, Uuid)>>,
    /// These pairs start failing right after their next successful write.
    pub failing_after_write: Mutex<HashSet<(Uuid, Uuid)>>,
    pub fail_order_lines: AtomicBool,
    pub fail_order_status: AtomicBool,
    pub fail_purchase_lines: AtomicBool,
    pub fail_purchase_status: AtomicBool,
    pub fail_notifications: AtomicBool,
}

fn injected(what: &str) -> DomainError {
    DomainError::Internal(format!("injected failure: {what}"))
}

impl MemoryDb {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_stock_writes(&self, product_id: Uuid, site_id: Uuid) {
        self.failing_stock
            .lock()
            .unwrap()
            .insert((product_id, site_id));
    }

    pub fn fail_stock_after_next_write(&self, product_id: Uuid, site_id: Uuid) {
        self.failing_after_write
            .lock()
            .unwrap()
            .insert((product_id, site_id));
    }

    pub fn heal_stock_writes(&self) {
        self.failing_stock.lock().unwrap().clear();
    }

    pub fn set(flag: &AtomicBool, value: bool) {
        flag.store(value, Ordering::SeqCst);
    }

    fn on(flag: &AtomicBool) -> bool {
        flag.load(Ordering::SeqCst)
    }

    pub fn stock_of(&self, product_id: Uuid, site_id: Uuid) -> Option<i32> {
        self.inventory
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.product_id == product_id && i.site_id == site_id)
            .map(|i| i.quantity)
    }

    pub fn notifications_for(&self, user_id: Uuid) -> Vec<Notification> {
        self.notifications
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect()
    }

    // ── Seeding helpers ──────────────────────────────────────────────────────

    pub fn seed_user(&self, role: Role) -> User {
        let user = User {
            id: Uuid::new_v4(),
            email: format!("{}@bakery.test", Uuid::new_v4()),
            full_name: format!("{role} user"),
            phone: None,
            role,
            active: true,
            password_hash: String::new(),
            created_at: Utc::now(),
        };
        self.users.lock().unwrap().push(user.clone());
        user
    }

    pub fn seed_site(&self, name: &str) -> Site {
        let site = Site {
            id: Uuid::new_v4(),
            name: name.to_string(),
            address: String::new(),
            active: true,
            created_at: Utc::now(),
        };
        self.sites.lock().unwrap().push(site.clone());
        site
    }

    pub fn seed_product(&self, name: &str, price: &str) -> Product {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: String::new(),
            category: "bread".to_string(),
            price: price.parse::<BigDecimal>().unwrap(),
            active: true,
            created_at: now,
            updated_at: now,
        };
        self.products.lock().unwrap().push(product.clone());
        product
    }

    pub fn seed_supplier(&self, name: &str) -> Supplier {
        let supplier = Supplier {
            id: Uuid::new_v4(),
            name: name.to_string(),
            contact_name: None,
            phone: None,
            email: None,
            active: true,
            created_at: Utc::now(),
        };
        self.suppliers.lock().unwrap().push(supplier.clone());
        supplier
    }

    pub fn seed_stock(&self, product_id: Uuid, site_id: Uuid, quantity: i32, min_stock: i32) {
        self.inventory.lock().unwrap().push(InventoryItem {
            id: Uuid::new_v4(),
            product_id,
            site_id,
            quantity,
            min_stock,
            updated_at: Utc::now(),
        });
    }
}

impl UserRepository for MemoryDb {
    fn create(&self, user: NewUser) -> Result<User, DomainError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(DomainError::Conflict("email already registered".to_string()));
        }
        let created = User {
            id: Uuid::new_v4(),
            email: user.email,
            full_name: user.full_name,
            phone: user.phone,
            role: user.role,
            active: true,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        users.push(created.clone());
        Ok(created)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    fn list(&self, role: Option<Role>) -> Result<Vec<User>, DomainError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| role.map_or(true, |r| u.role == r))
            .cloned()
            .collect())
    }

    fn update_role(&self, id: Uuid, role: Role) -> Result<Option<User>, DomainError> {
        let mut users = self.users.lock().unwrap();
        Ok(users.iter_mut().find(|u| u.id == id).map(|u| {
            u.role = role;
            u.clone()
        }))
    }

    fn set_active(&self, id: Uuid, active: bool) -> Result<Option<User>, DomainError> {
        let mut users = self.users.lock().unwrap();
        Ok(users.iter_mut().find(|u| u.id == id).map(|u| {
            u.active = active;
            u.clone()
        }))
    }
}

impl SiteRepository for MemoryDb {
    fn create(&self, site: NewSite) -> Result<Site, DomainError> {
        let created = Site {
            id: Uuid::new_v4(),
            name: site.name,
            address: site.address,
            active: true,
            created_at: Utc::now(),
        };
        self.sites.lock().unwrap().push(created.clone());
        Ok(created)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Site>, DomainError> {
        Ok(self.sites.lock().unwrap().iter().find(|s| s.id == id).cloned())
    }

    fn list(&self, active_only: bool) -> Result<Vec<Site>, DomainError> {
        Ok(self
            .sites
            .lock()
            .unwrap()
            .iter()
            .filter(|s| !active_only || s.active)
            .cloned()
            .collect())
    }

    fn update(&self, id: Uuid, changes: SiteUpdate) -> Result<Option<Site>, DomainError> {
        let mut sites = self.sites.lock().unwrap();
        Ok(sites.iter_mut().find(|s| s.id == id).map(|s| {
            if let Some(name) = changes.name {
                s.name = name;
            }
            if let Some(address) = changes.address {
                s.address = address;
            }
            if let Some(active) = changes.active {
                s.active = active;
            }
            s.clone()
        }))
    }
}

impl ProductRepository for MemoryDb {
    fn create(&self, product: NewProduct) -> Result<Product, DomainError> {
        let now = Utc::now();
        let created = Product {
            id: Uuid::new_v4(),
            name: product.name,
            description: product.description,
            category: product.category,
            price: product.price,
            active: true,
            created_at: now,
            updated_at: now,
        };
        self.products.lock().unwrap().push(created.clone());
        Ok(created)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Product>, DomainError> {
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, DomainError> {
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .filter(|p| filter.category.as_ref().map_or(true, |c| &p.category == c))
            .filter(|p| {
                filter.search.as_ref().map_or(true, |s| {
                    p.name.to_lowercase().contains(&s.to_lowercase())
                })
            })
            .filter(|p| !filter.active_only || p.active)
            .cloned()
            .collect())
    }

    fn update(&self, id: Uuid, changes: ProductUpdate) -> Result<Option<Product>, DomainError> {
        let mut products = self.products.lock().unwrap();
        Ok(products.iter_mut().find(|p| p.id == id).map(|p| {
            if let Some(name) = changes.name {
                p.name = name;
            }
            if let Some(description) = changes.description {
                p.description = description;
            }
            if let Some(category) = changes.category {
                p.category = category;
            }
            if let Some(price) = changes.price {
                p.price = price;
            }
            if let Some(active) = changes.active {
                p.active = active;
            }
            p.updated_at = Utc::now();
            p.clone()
        }))
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut products = self.products.lock().unwrap();
        let before = products.len();
        products.retain(|p| p.id != id);
        Ok(products.len() < before)
    }
}

impl SupplierRepository for MemoryDb {
    fn create(&self, supplier: NewSupplier) -> Result<Supplier, DomainError> {
        let created = Supplier {
            id: Uuid::new_v4(),
            name: supplier.name,
            contact_name: supplier.contact_name,
            phone: supplier.phone,
            email: supplier.email,
            active: true,
            created_at: Utc::now(),
        };
        self.suppliers.lock().unwrap().push(created.clone());
        Ok(created)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Supplier>, DomainError> {
        Ok(self
            .suppliers
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id)
            .cloned())
    }

    fn list(&self, active_only: bool) -> Result<Vec<Supplier>, DomainError> {
        Ok(self
            .suppliers
            .lock()
            .unwrap()
            .iter()
            .filter(|s| !active_only || s.active)
            .cloned()
            .collect())
    }

    fn update(&self, id: Uuid, changes: SupplierUpdate) -> Result<Option<Supplier>, DomainError> {
        let mut suppliers = self.suppliers.lock().unwrap();
        Ok(suppliers.iter_mut().find(|s| s.id == id).map(|s| {
            if let Some(name) = changes.name {
                s.name = name;
            }
            if changes.contact_name.is_some() {
                s.contact_name = changes.contact_name;
            }
            if changes.phone.is_some() {
                s.phone = changes.phone;
            }
            if changes.email.is_some() {
                s.email = changes.email;
            }
            if let Some(active) = changes.active {
                s.active = active;
            }
            s.clone()
        }))
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut suppliers = self.suppliers.lock().unwrap();
        let before = suppliers.len();
        suppliers.retain(|s| s.id != id);
        Ok(suppliers.len() < before)
    }
}

impl InventoryRepository for MemoryDb {
    fn find(&self, product_id: Uuid, site_id: Uuid) -> Result<Option<InventoryItem>, DomainError> {
        Ok(self
            .inventory
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.product_id == product_id && i.site_id == site_id)
            .cloned())
    }

    fn create(&self, item: NewInventoryItem) -> Result<InventoryItem, DomainError> {
        if self
            .failing_stock
            .lock()
            .unwrap()
            .contains(&(item.product_id, item.site_id))
        {
            return Err(injected("inventory create"));
        }
        let mut inventory = self.inventory.lock().unwrap();
        if inventory
            .iter()
            .any(|i| i.product_id == item.product_id && i.site_id == item.site_id)
        {
            return Err(DomainError::Conflict("duplicate inventory row".to_string()));
        }
        let created = InventoryItem {
            id: Uuid::new_v4(),
            product_id: item.product_id,
            site_id: item.site_id,
            quantity: item.quantity,
            min_stock: item.min_stock,
            updated_at: Utc::now(),
        };
        inventory.push(created.clone());
        Ok(created)
    }

    fn set_quantity(&self, id: Uuid, quantity: i32) -> Result<Option<InventoryItem>, DomainError> {
        let failing = self.failing_stock.lock().unwrap().clone();
        let mut inventory = self.inventory.lock().unwrap();
        let Some(item) = inventory.iter_mut().find(|i| i.id == id) else {
            return Ok(None);
        };
        if failing.contains(&(item.product_id, item.site_id)) {
            return Err(injected("inventory set_quantity"));
        }
        if quantity < 0 {
            return Err(DomainError::invalid("quantity check violated"));
        }
        item.quantity = quantity;
        item.updated_at = Utc::now();
        let updated = item.clone();
        drop(inventory);

        let pair = (updated.product_id, updated.site_id);
        if self.failing_after_write.lock().unwrap().remove(&pair) {
            self.failing_stock.lock().unwrap().insert(pair);
        }
        Ok(Some(updated))
    }

    fn set_min_stock(
        &self,
        id: Uuid,
        min_stock: i32,
    ) -> Result<Option<InventoryItem>, DomainError> {
        let mut inventory = self.inventory.lock().unwrap();
        Ok(inventory.iter_mut().find(|i| i.id == id).map(|i| {
            i.min_stock = min_stock;
            i.clone()
        }))
    }

    fn list_by_site(&self, site_id: Uuid) -> Result<Vec<InventoryItem>, DomainError> {
        Ok(self
            .inventory
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.site_id == site_id)
            .cloned()
            .collect())
    }

    fn list_low_stock(&self, site_id: Option<Uuid>) -> Result<Vec<InventoryItem>, DomainError> {
        Ok(self
            .inventory
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.is_low() && site_id.map_or(true, |s| i.site_id == s))
            .cloned()
            .collect())
    }
}

impl PurchaseRepository for MemoryDb {
    fn insert(&self, purchase: NewPurchase) -> Result<Purchase, DomainError> {
        let created = Purchase {
            id: Uuid::new_v4(),
            supplier_id: purchase.supplier_id,
            site_id: purchase.site_id,
            status: PurchaseStatus::Pending,
            total: purchase.total,
            created_by: purchase.created_by,
            created_at: Utc::now(),
            received_at: None,
            lines: vec![],
        };
        self.purchases.lock().unwrap().push(created.clone());
        Ok(created)
    }

    fn insert_lines(
        &self,
        purchase_id: Uuid,
        lines: &[PurchaseLineInput],
    ) -> Result<Vec<PurchaseLine>, DomainError> {
        if Self::on(&self.fail_purchase_lines) {
            return Err(injected("purchase lines"));
        }
        let mut purchases = self.purchases.lock().unwrap();
        let purchase = purchases
            .iter_mut()
            .find(|p| p.id == purchase_id)
            .ok_or_else(|| DomainError::invalid("purchase does not exist"))?;
        let created: Vec<PurchaseLine> = lines
            .iter()
            .map(|l| PurchaseLine {
                id: Uuid::new_v4(),
                purchase_id,
                product_id: l.product_id,
                quantity: l.quantity,
                unit_cost: l.unit_cost.clone(),
            })
            .collect();
        purchase.lines.extend(created.iter().cloned());
        Ok(created)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Purchase>, DomainError> {
        Ok(self
            .purchases
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    fn list(&self, filter: &PurchaseFilter) -> Result<Vec<Purchase>, DomainError> {
        Ok(self
            .purchases
            .lock()
            .unwrap()
            .iter()
            .filter(|p| filter.status.map_or(true, |s| p.status == s))
            .filter(|p| filter.site_id.map_or(true, |s| p.site_id == s))
            .filter(|p| filter.supplier_id.map_or(true, |s| p.supplier_id == s))
            .cloned()
            .collect())
    }

    fn update_status(
        &self,
        id: Uuid,
        status: PurchaseStatus,
        received_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Purchase>, DomainError> {
        if Self::on(&self.fail_purchase_status) {
            return Err(injected("purchase status"));
        }
        let mut purchases = self.purchases.lock().unwrap();
        Ok(purchases.iter_mut().find(|p| p.id == id).map(|p| {
            p.status = status;
            p.received_at = received_at;
            p.clone()
        }))
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut purchases = self.purchases.lock().unwrap();
        let before = purchases.len();
        purchases.retain(|p| p.id != id);
        Ok(purchases.len() < before)
    }
}

impl OrderRepository for MemoryDb {
    fn insert(&self, order: NewOrder) -> Result<Order, DomainError> {
        let now = Utc::now();
        let created = Order {
            id: Uuid::new_v4(),
            client_id: order.client_id,
            site_id: order.site_id,
            status: OrderStatus::Pending,
            subtotal: order.subtotal,
            discount: order.discount,
            total: order.total,
            promotion_code: order.promotion_code,
            notes: order.notes,
            created_at: now,
            updated_at: now,
            lines: vec![],
        };
        self.orders.lock().unwrap().push(created.clone());
        Ok(created)
    }

    fn insert_lines(
        &self,
        order_id: Uuid,
        lines: &[NewOrderLine],
    ) -> Result<Vec<OrderLine>, DomainError> {
        if Self::on(&self.fail_order_lines) {
            return Err(injected("order lines"));
        }
        let mut orders = self.orders.lock().unwrap();
        let order = orders
            .iter_mut()
            .find(|o| o.id == order_id)
            .ok_or_else(|| DomainError::invalid("order does not exist"))?;
        let created: Vec<OrderLine> = lines
            .iter()
            .map(|l| OrderLine {
                id: Uuid::new_v4(),
                order_id,
                product_id: l.product_id,
                quantity: l.quantity,
                unit_price: l.unit_price.clone(),
            })
            .collect();
        order.lines.extend(created.iter().cloned());
        Ok(created)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        Ok(self.orders.lock().unwrap().iter().find(|o| o.id == id).cloned())
    }

    fn list(&self, filter: &OrderFilter) -> Result<OrderPage, DomainError> {
        let orders = self.orders.lock().unwrap();
        let mut matching: Vec<Order> = orders
            .iter()
            .filter(|o| filter.client_id.map_or(true, |c| o.client_id == c))
            .filter(|o| filter.site_id.map_or(true, |s| o.site_id == s))
            .filter(|o| filter.status.map_or(true, |s| o.status == s))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(filter.offset() as usize)
            .take(filter.limit as usize)
            .map(|mut o| {
                o.lines.clear();
                o
            })
            .collect();
        Ok(OrderPage { items, total })
    }

    fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<Option<Order>, DomainError> {
        if Self::on(&self.fail_order_status) {
            return Err(injected("order status"));
        }
        let mut orders = self.orders.lock().unwrap();
        Ok(orders.iter_mut().find(|o| o.id == id).map(|o| {
            o.status = status;
            o.updated_at = Utc::now();
            o.clone()
        }))
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut orders = self.orders.lock().unwrap();
        let before = orders.len();
        orders.retain(|o| o.id != id);
        Ok(orders.len() < before)
    }
}

impl PromotionRepository for MemoryDb {
    fn create(&self, promotion: NewPromotion) -> Result<Promotion, DomainError> {
        let mut promotions = self.promotions.lock().unwrap();
        if promotions.iter().any(|p| p.code == promotion.code) {
            return Err(DomainError::Conflict("duplicate promotion code".to_string()));
        }
        let created = Promotion {
            id: Uuid::new_v4(),
            code: promotion.code,
            description: promotion.description,
            discount_percent: promotion.discount_percent,
            product_id: promotion.product_id,
            starts_at: promotion.starts_at,
            ends_at: promotion.ends_at,
            active: true,
            created_at: Utc::now(),
        };
        promotions.push(created.clone());
        Ok(created)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Promotion>, DomainError> {
        Ok(self
            .promotions
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    fn find_by_code(&self, code: &str) -> Result<Option<Promotion>, DomainError> {
        Ok(self
            .promotions
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.code == code)
            .cloned())
    }

    fn list(&self, active_only: bool) -> Result<Vec<Promotion>, DomainError> {
        Ok(self
            .promotions
            .lock()
            .unwrap()
            .iter()
            .filter(|p| !active_only || p.active)
            .cloned()
            .collect())
    }

    fn update(
        &self,
        id: Uuid,
        changes: PromotionUpdate,
    ) -> Result<Option<Promotion>, DomainError> {
        let mut promotions = self.promotions.lock().unwrap();
        Ok(promotions.iter_mut().find(|p| p.id == id).map(|p| {
            if let Some(description) = changes.description {
                p.description = description;
            }
            if let Some(percent) = changes.discount_percent {
                p.discount_percent = percent;
            }
            if let Some(starts_at) = changes.starts_at {
                p.starts_at = starts_at;
            }
            if let Some(ends_at) = changes.ends_at {
                p.ends_at = ends_at;
            }
            if let Some(active) = changes.active {
                p.active = active;
            }
            p.clone()
        }))
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut promotions = self.promotions.lock().unwrap();
        let before = promotions.len();
        promotions.retain(|p| p.id != id);
        Ok(promotions.len() < before)
    }
}

impl ShiftRepository for MemoryDb {
    fn create(&self, shift: NewShift) -> Result<Shift, DomainError> {
        let created = Shift {
            id: Uuid::new_v4(),
            employee_id: shift.employee_id,
            site_id: shift.site_id,
            starts_at: shift.starts_at,
            ends_at: shift.ends_at,
            notes: shift.notes,
            created_at: Utc::now(),
        };
        self.shifts.lock().unwrap().push(created.clone());
        Ok(created)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Shift>, DomainError> {
        Ok(self.shifts.lock().unwrap().iter().find(|s| s.id == id).cloned())
    }

    fn list(&self, filter: &ShiftFilter) -> Result<Vec<Shift>, DomainError> {
        let mut shifts: Vec<Shift> = self
            .shifts
            .lock()
            .unwrap()
            .iter()
            .filter(|s| filter.employee_id.map_or(true, |e| s.employee_id == e))
            .filter(|s| filter.site_id.map_or(true, |site| s.site_id == site))
            .filter(|s| filter.from.map_or(true, |from| s.ends_at > from))
            .filter(|s| filter.to.map_or(true, |to| s.starts_at < to))
            .cloned()
            .collect();
        shifts.sort_by_key(|s| s.starts_at);
        Ok(shifts)
    }

    fn update(&self, id: Uuid, shift: NewShift) -> Result<Option<Shift>, DomainError> {
        let mut shifts = self.shifts.lock().unwrap();
        Ok(shifts.iter_mut().find(|s| s.id == id).map(|s| {
            s.employee_id = shift.employee_id;
            s.site_id = shift.site_id;
            s.starts_at = shift.starts_at;
            s.ends_at = shift.ends_at;
            s.notes = shift.notes;
            s.clone()
        }))
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut shifts = self.shifts.lock().unwrap();
        let before = shifts.len();
        shifts.retain(|s| s.id != id);
        Ok(shifts.len() < before)
    }
}

impl AttendanceRepository for MemoryDb {
    fn create(&self, record: NewAttendance) -> Result<Attendance, DomainError> {
        let created = Attendance {
            id: Uuid::new_v4(),
            employee_id: record.employee_id,
            shift_id: record.shift_id,
            check_in: record.check_in,
            check_out: None,
            late: record.late,
        };
        self.attendance.lock().unwrap().push(created.clone());
        Ok(created)
    }

    fn find_open(&self, employee_id: Uuid) -> Result<Option<Attendance>, DomainError> {
        Ok(self
            .attendance
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.employee_id == employee_id && a.is_open())
            .cloned())
    }

    fn close(
        &self,
        id: Uuid,
        check_out: DateTime<Utc>,
    ) -> Result<Option<Attendance>, DomainError> {
        let mut records = self.attendance.lock().unwrap();
        Ok(records.iter_mut().find(|a| a.id == id).map(|a| {
            a.check_out = Some(check_out);
            a.clone()
        }))
    }

    fn list(&self, filter: &AttendanceFilter) -> Result<Vec<Attendance>, DomainError> {
        let mut records: Vec<Attendance> = self
            .attendance
            .lock()
            .unwrap()
            .iter()
            .filter(|a| filter.employee_id.map_or(true, |e| a.employee_id == e))
            .filter(|a| filter.from.map_or(true, |from| a.check_in >= from))
            .filter(|a| filter.to.map_or(true, |to| a.check_in < to))
            .cloned()
            .collect();
        records.sort_by_key(|a| a.check_in);
        Ok(records)
    }
}

impl ClaimRepository for MemoryDb {
    fn create(&self, claim: NewClaim) -> Result<Claim, DomainError> {
        let now = Utc::now();
        let created = Claim {
            id: Uuid::new_v4(),
            client_id: claim.client_id,
            order_id: claim.order_id,
            subject: claim.subject,
            description: claim.description,
            status: ClaimStatus::Open,
            response: None,
            created_at: now,
            updated_at: now,
        };
        self.claims.lock().unwrap().push(created.clone());
        Ok(created)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Claim>, DomainError> {
        Ok(self.claims.lock().unwrap().iter().find(|c| c.id == id).cloned())
    }

    fn list(&self, filter: &ClaimFilter) -> Result<Vec<Claim>, DomainError> {
        Ok(self
            .claims
            .lock()
            .unwrap()
            .iter()
            .filter(|c| filter.client_id.map_or(true, |id| c.client_id == id))
            .filter(|c| filter.status.map_or(true, |s| c.status == s))
            .cloned()
            .collect())
    }

    fn update_status(
        &self,
        id: Uuid,
        status: ClaimStatus,
        response: Option<String>,
    ) -> Result<Option<Claim>, DomainError> {
        let mut claims = self.claims.lock().unwrap();
        Ok(claims.iter_mut().find(|c| c.id == id).map(|c| {
            c.status = status;
            if response.is_some() {
                c.response = response;
            }
            c.updated_at = Utc::now();
            c.clone()
        }))
    }
}

impl NotificationRepository for MemoryDb {
    fn create_many(&self, items: Vec<NewNotification>) -> Result<Vec<Notification>, DomainError> {
        if Self::on(&self.fail_notifications) {
            return Err(injected("notifications"));
        }
        let created: Vec<Notification> = items
            .into_iter()
            .map(|n| Notification {
                id: Uuid::new_v4(),
                user_id: n.user_id,
                kind: n.kind,
                title: n.title,
                message: n.message,
                read: false,
                created_at: Utc::now(),
            })
            .collect();
        self.notifications
            .lock()
            .unwrap()
            .extend(created.iter().cloned());
        Ok(created)
    }

    fn list_for_user(
        &self,
        user_id: Uuid,
        unread_only: bool,
    ) -> Result<Vec<Notification>, DomainError> {
        Ok(self
            .notifications
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.user_id == user_id && (!unread_only || !n.read))
            .cloned()
            .collect())
    }

    fn mark_read(&self, id: Uuid, user_id: Uuid) -> Result<bool, DomainError> {
        let mut notifications = self.notifications.lock().unwrap();
        match notifications
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id)
        {
            Some(n) => {
                n.read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn mark_all_read(&self, user_id: Uuid) -> Result<usize, DomainError> {
        let mut notifications = self.notifications.lock().unwrap();
        let mut count = 0;
        for n in notifications
            .iter_mut()
            .filter(|n| n.user_id == user_id && !n.read)
        {
            n.read = true;
            count += 1;
        }
        Ok(count)
    }
}
