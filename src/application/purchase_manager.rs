use std::sync::Arc;

use bigdecimal::{BigDecimal, Zero};
use chrono::Utc;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::notification::NotificationKind;
use crate::domain::ports::{ProductRepository, PurchaseRepository, SiteRepository, SupplierRepository};
use crate::domain::purchase::{
    NewPurchase, Purchase, PurchaseFilter, PurchaseLine, PurchaseLineInput, PurchaseStatus,
};
use crate::domain::user::Role;
use crate::domain::validation::{positive_quantity, round_money};

use super::inventory_manager::InventoryManager;
use super::notification_manager::NotificationManager;

#[derive(Debug, Clone)]
pub struct PurchaseRequest {
    pub supplier_id: Uuid,
    pub site_id: Uuid,
    pub lines: Vec<PurchaseLineInput>,
    pub receive_now: bool,
}

#[derive(Clone)]
pub struct PurchaseManager {
    purchases: Arc<dyn PurchaseRepository>,
    suppliers: Arc<dyn SupplierRepository>,
    sites: Arc<dyn SiteRepository>,
    products: Arc<dyn ProductRepository>,
    inventory: InventoryManager,
    notifications: NotificationManager,
}

impl PurchaseManager {
    pub fn new(
        purchases: Arc<dyn PurchaseRepository>,
        suppliers: Arc<dyn SupplierRepository>,
        sites: Arc<dyn SiteRepository>,
        products: Arc<dyn ProductRepository>,
        inventory: InventoryManager,
        notifications: NotificationManager,
    ) -> Self {
        Self {
            purchases,
            suppliers,
            sites,
            products,
            inventory,
            notifications,
        }
    }

    pub fn create(&self, request: PurchaseRequest, created_by: Uuid) -> Result<Purchase, DomainError> {
        let supplier = self
            .suppliers
            .find_by_id(request.supplier_id)?
            .ok_or(DomainError::NotFound("Supplier"))?;
        if !supplier.active {
            return Err(DomainError::invalid(format!(
                "supplier '{}' is inactive",
                supplier.name
            )));
        }
        self.sites
            .find_by_id(request.site_id)?
            .ok_or(DomainError::NotFound("Site"))?;

        if request.lines.is_empty() {
            return Err(DomainError::invalid("a purchase needs at least one line"));
        }
        let mut total = BigDecimal::zero();
        for line in &request.lines {
            positive_quantity("quantity", line.quantity)?;
            if line.unit_cost < BigDecimal::zero() {
                return Err(DomainError::invalid("unit_cost must not be negative"));
            }
            total += &line.unit_cost * BigDecimal::from(line.quantity);
        }
        self.ensure_products_exist(&request.lines)?;

        let header = self.purchases.insert(NewPurchase {
            supplier_id: request.supplier_id,
            site_id: request.site_id,
            total: round_money(&total),
            created_by,
        })?;

        let lines = match self.purchases.insert_lines(header.id, &request.lines) {
            Ok(lines) => lines,
            Err(e) => {
                log::warn!("Purchase {} lines failed, removing header: {}", header.id, e);
                if let Err(cleanup) = self.purchases.delete(header.id) {
                    log::error!("Could not remove purchase header {}: {}", header.id, cleanup);
                }
                return Err(e);
            }
        };
        log::info!(
            "Created purchase {} from supplier {} with {} lines",
            header.id,
            supplier.id,
            lines.len()
        );

        let purchase = Purchase { lines, ..header };
        if !request.receive_now {
            return Ok(purchase);
        }
        let id = purchase.id;
        self.receive_loaded(purchase).map_err(|e| {
            log::warn!("Purchase {} could not be received, removing it: {}", id, e);
            if let Err(cleanup) = self.purchases.delete(id) {
                log::error!("Could not remove purchase {}: {}", id, cleanup);
            }
            e
        })
    }

    /// Books every line into stock at the purchase site, then marks the
    /// purchase received.
    pub fn receive(&self, id: Uuid) -> Result<Purchase, DomainError> {
        let purchase = self.get(id)?;
        self.receive_loaded(purchase)
    }

    pub fn cancel(&self, id: Uuid) -> Result<Purchase, DomainError> {
        let purchase = self.get(id)?;
        purchase.status.ensure_transition(PurchaseStatus::Cancelled)?;
        let cancelled = self
            .purchases
            .update_status(id, PurchaseStatus::Cancelled, None)?
            .ok_or(DomainError::NotFound("Purchase"))?;
        log::info!("Cancelled purchase {}", id);
        Ok(Purchase {
            lines: purchase.lines,
            ..cancelled
        })
    }

    pub fn get(&self, id: Uuid) -> Result<Purchase, DomainError> {
        self.purchases
            .find_by_id(id)?
            .ok_or(DomainError::NotFound("Purchase"))
    }

    pub fn list(&self, filter: PurchaseFilter) -> Result<Vec<Purchase>, DomainError> {
        self.purchases.list(&filter)
    }

    fn receive_loaded(&self, purchase: Purchase) -> Result<Purchase, DomainError> {
        purchase.status.ensure_transition(PurchaseStatus::Received)?;

        let mut applied: Vec<&PurchaseLine> = Vec::with_capacity(purchase.lines.len());
        for line in &purchase.lines {
            if let Err(e) = self
                .inventory
                .increment(line.product_id, purchase.site_id, line.quantity)
            {
                log::warn!(
                    "Receiving purchase {} failed on product {}: {}",
                    purchase.id,
                    line.product_id,
                    e
                );
                self.revert(purchase.id, purchase.site_id, &applied);
                return Err(e);
            }
            applied.push(line);
        }

        let received = match self.purchases.update_status(
            purchase.id,
            PurchaseStatus::Received,
            Some(Utc::now()),
        ) {
            Ok(Some(received)) => received,
            Ok(None) => {
                self.revert(purchase.id, purchase.site_id, &applied);
                return Err(DomainError::NotFound("Purchase"));
            }
            Err(e) => {
                log::warn!("Could not mark purchase {} received: {}", purchase.id, e);
                self.revert(purchase.id, purchase.site_id, &applied);
                return Err(e);
            }
        };

        log::info!("Received purchase {}", purchase.id);
        self.notifications.try_notify_roles(
            &[Role::Admin],
            NotificationKind::Purchase,
            "Purchase received",
            &format!(
                "Purchase {} was received with {} lines",
                purchase.id,
                purchase.lines.len()
            ),
        );
        Ok(Purchase {
            lines: purchase.lines,
            ..received
        })
    }

    fn revert(&self, purchase_id: Uuid, site_id: Uuid, applied: &[&PurchaseLine]) {
        for line in applied {
            if let Err(e) = self
                .inventory
                .decrement(line.product_id, site_id, line.quantity)
            {
                log::error!(
                    "Could not revert {} of product {} for purchase {}: {}",
                    line.quantity,
                    line.product_id,
                    purchase_id,
                    e
                );
            }
        }
    }

    fn ensure_products_exist(&self, lines: &[PurchaseLineInput]) -> Result<(), DomainError> {
        let mut ids: Vec<Uuid> = lines.iter().map(|l| l.product_id).collect();
        ids.sort();
        ids.dedup();
        let found = self.products.find_many(&ids)?;
        match ids.iter().find(|id| !found.iter().any(|p| p.id == **id)) {
            Some(missing) => Err(DomainError::invalid(format!(
                "product {missing} does not exist"
            ))),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::sync::Arc;

    use super::*;
    use crate::application::testing::MemoryDb;

    fn manager(db: &Arc<MemoryDb>) -> PurchaseManager {
        let notifications = NotificationManager::new(db.clone(), db.clone());
        let inventory =
            InventoryManager::new(db.clone(), db.clone(), db.clone(), notifications.clone());
        PurchaseManager::new(
            db.clone(),
            db.clone(),
            db.clone(),
            db.clone(),
            inventory,
            notifications,
        )
    }

    fn money(value: &str) -> BigDecimal {
        BigDecimal::from_str(value).unwrap()
    }

    struct Fixture {
        db: Arc<MemoryDb>,
        supplier: Uuid,
        site: Uuid,
        flour: Uuid,
        butter: Uuid,
        buyer: Uuid,
    }

    fn fixture() -> Fixture {
        let db = MemoryDb::new();
        let supplier = db.seed_supplier("Molinos del Sur").id;
        let site = db.seed_site("Centro").id;
        let flour = db.seed_product("Flour 25kg", "18.00").id;
        let butter = db.seed_product("Butter 1kg", "7.50").id;
        let buyer = db.seed_user(Role::Employee).id;
        Fixture {
            db,
            supplier,
            site,
            flour,
            butter,
            buyer,
        }
    }

    fn request(f: &Fixture, receive_now: bool) -> PurchaseRequest {
        PurchaseRequest {
            supplier_id: f.supplier,
            site_id: f.site,
            lines: vec![
                PurchaseLineInput {
                    product_id: f.flour,
                    quantity: 4,
                    unit_cost: money("12.25"),
                },
                PurchaseLineInput {
                    product_id: f.butter,
                    quantity: 10,
                    unit_cost: money("3.10"),
                },
            ],
            receive_now,
        }
    }

    #[test]
    fn create_computes_total_and_stays_pending() {
        let f = fixture();
        let purchase = manager(&f.db).create(request(&f, false), f.buyer).unwrap();

        assert_eq!(purchase.status, PurchaseStatus::Pending);
        assert_eq!(purchase.total, money("80.00"));
        assert_eq!(purchase.lines.len(), 2);
        assert_eq!(f.db.stock_of(f.flour, f.site), None);
    }

    #[test]
    fn receive_now_books_stock() {
        let f = fixture();
        let purchase = manager(&f.db).create(request(&f, true), f.buyer).unwrap();

        assert_eq!(purchase.status, PurchaseStatus::Received);
        assert!(purchase.received_at.is_some());
        assert_eq!(f.db.stock_of(f.flour, f.site), Some(4));
        assert_eq!(f.db.stock_of(f.butter, f.site), Some(10));
    }

    #[test]
    fn inactive_supplier_is_rejected() {
        let f = fixture();
        f.db.suppliers.lock().unwrap()[0].active = false;
        let err = manager(&f.db).create(request(&f, false), f.buyer).unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
        assert!(f.db.purchases.lock().unwrap().is_empty());
    }

    #[test]
    fn empty_or_invalid_lines_are_rejected() {
        let f = fixture();
        let manager = manager(&f.db);

        let mut empty = request(&f, false);
        empty.lines.clear();
        assert!(manager.create(empty, f.buyer).is_err());

        let mut negative = request(&f, false);
        negative.lines[0].unit_cost = money("-1");
        assert!(manager.create(negative, f.buyer).is_err());

        let mut unknown = request(&f, false);
        unknown.lines[1].product_id = Uuid::new_v4();
        assert!(manager.create(unknown, f.buyer).is_err());

        assert!(f.db.purchases.lock().unwrap().is_empty());
    }

    #[test]
    fn failed_lines_remove_the_header() {
        let f = fixture();
        MemoryDb::set(&f.db.fail_purchase_lines, true);

        assert!(manager(&f.db).create(request(&f, false), f.buyer).is_err());
        assert!(f.db.purchases.lock().unwrap().is_empty());
    }

    #[test]
    fn failed_receive_now_leaves_no_purchase() {
        let f = fixture();
        MemoryDb::set(&f.db.fail_purchase_status, true);

        assert!(manager(&f.db).create(request(&f, true), f.buyer).is_err());
        assert!(f.db.purchases.lock().unwrap().is_empty());
        assert_eq!(f.db.stock_of(f.flour, f.site), Some(0));
        assert_eq!(f.db.stock_of(f.butter, f.site), Some(0));
    }

    #[test]
    fn failing_line_reverts_earlier_increments() {
        let f = fixture();
        let manager = manager(&f.db);
        let purchase = manager.create(request(&f, false), f.buyer).unwrap();
        f.db.fail_stock_writes(f.butter, f.site);

        assert!(manager.receive(purchase.id).is_err());
        assert_eq!(f.db.stock_of(f.flour, f.site), Some(0));
        assert_eq!(manager.get(purchase.id).unwrap().status, PurchaseStatus::Pending);
    }

    #[test]
    fn failed_status_update_reverts_all_increments() {
        let f = fixture();
        let manager = manager(&f.db);
        let purchase = manager.create(request(&f, false), f.buyer).unwrap();
        f.db.seed_stock(f.flour, f.site, 1, 0);
        MemoryDb::set(&f.db.fail_purchase_status, true);

        assert!(manager.receive(purchase.id).is_err());
        assert_eq!(f.db.stock_of(f.flour, f.site), Some(1));
        assert_eq!(f.db.stock_of(f.butter, f.site), Some(0));
    }

    #[test]
    fn received_purchase_cannot_be_cancelled_or_received_again() {
        let f = fixture();
        let manager = manager(&f.db);
        let purchase = manager.create(request(&f, true), f.buyer).unwrap();

        assert!(matches!(
            manager.cancel(purchase.id),
            Err(DomainError::InvalidTransition { .. })
        ));
        assert!(matches!(
            manager.receive(purchase.id),
            Err(DomainError::InvalidTransition { .. })
        ));
        assert_eq!(f.db.stock_of(f.flour, f.site), Some(4));
    }

    #[test]
    fn receiving_notifies_admins() {
        let f = fixture();
        let admin = f.db.seed_user(Role::Admin);
        manager(&f.db).create(request(&f, true), f.buyer).unwrap();

        let sent = f.db.notifications_for(admin.id);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].kind, NotificationKind::Purchase);
    }
}
