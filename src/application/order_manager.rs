use std::sync::Arc;

use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::notification::NotificationKind;
use crate::domain::order::{
    NewOrder, NewOrderLine, Order, OrderFilter, OrderLine, OrderLineInput, OrderPage, OrderStatus,
};
use crate::domain::ports::{OrderRepository, ProductRepository, SiteRepository};
use crate::domain::user::Role;
use crate::domain::validation::{optional_text, positive_quantity, round_money};

use super::inventory_manager::InventoryManager;
use super::notification_manager::NotificationManager;
use super::promotion_manager::PromotionManager;

#[derive(Debug, Clone)]
pub struct OrderRequest {
    pub client_id: Uuid,
    pub site_id: Uuid,
    pub lines: Vec<OrderLineInput>,
    pub promotion_code: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum StockMove {
    Take,
    Return,
}

impl StockMove {
    fn inverse(self) -> Self {
        match self {
            StockMove::Take => StockMove::Return,
            StockMove::Return => StockMove::Take,
        }
    }
}

#[derive(Clone)]
pub struct OrderManager {
    orders: Arc<dyn OrderRepository>,
    products: Arc<dyn ProductRepository>,
    sites: Arc<dyn SiteRepository>,
    promotions: PromotionManager,
    inventory: InventoryManager,
    notifications: NotificationManager,
}

impl OrderManager {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        products: Arc<dyn ProductRepository>,
        sites: Arc<dyn SiteRepository>,
        promotions: PromotionManager,
        inventory: InventoryManager,
        notifications: NotificationManager,
    ) -> Self {
        Self {
            orders,
            products,
            sites,
            promotions,
            inventory,
            notifications,
        }
    }

    /// Prices the request at current product prices, applies the promotion
    /// code valid at `now` and stores the order as pending.
    pub fn create(&self, request: OrderRequest, now: DateTime<Utc>) -> Result<Order, DomainError> {
        let site = self
            .sites
            .find_by_id(request.site_id)?
            .ok_or(DomainError::NotFound("Site"))?;
        if !site.active {
            return Err(DomainError::invalid(format!(
                "site '{}' is not taking orders",
                site.name
            )));
        }

        let requested = merge_lines(&request.lines)?;
        let ids: Vec<Uuid> = requested.iter().map(|l| l.product_id).collect();
        let products = self.products.find_many(&ids)?;

        let mut lines = Vec::with_capacity(requested.len());
        for line in requested {
            let product = products
                .iter()
                .find(|p| p.id == line.product_id)
                .filter(|p| p.active)
                .ok_or_else(|| {
                    DomainError::invalid(format!("product {} is not available", line.product_id))
                })?;
            lines.push(NewOrderLine {
                product_id: product.id,
                quantity: line.quantity,
                unit_price: product.price.clone(),
            });
        }

        let subtotal = round_money(&lines.iter().fold(BigDecimal::zero(), |acc, l| {
            acc + &l.unit_price * BigDecimal::from(l.quantity)
        }));

        let (discount, promotion_code) = match request.promotion_code.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() => {
                let promotion = self.promotions.validate_code(code, now)?;
                let eligible = match promotion.product_id {
                    Some(product_id) => {
                        let scoped: Vec<&NewOrderLine> =
                            lines.iter().filter(|l| l.product_id == product_id).collect();
                        if scoped.is_empty() {
                            return Err(DomainError::invalid(format!(
                                "promotion '{}' does not apply to any product in this order",
                                promotion.code
                            )));
                        }
                        scoped.iter().fold(BigDecimal::zero(), |acc, l| {
                            acc + &l.unit_price * BigDecimal::from(l.quantity)
                        })
                    }
                    None => subtotal.clone(),
                };
                (promotion.discount_on(&eligible), Some(promotion.code))
            }
            _ => (round_money(&BigDecimal::zero()), None),
        };
        let total = round_money(&(&subtotal - &discount));

        let header = self.orders.insert(NewOrder {
            client_id: request.client_id,
            site_id: site.id,
            subtotal,
            discount,
            total,
            promotion_code,
            notes: optional_text(request.notes),
        })?;

        let stored_lines = match self.orders.insert_lines(header.id, &lines) {
            Ok(stored) => stored,
            Err(e) => {
                log::warn!("Order {} lines failed, removing header: {}", header.id, e);
                if let Err(cleanup) = self.orders.delete(header.id) {
                    log::error!("Could not remove order header {}: {}", header.id, cleanup);
                }
                return Err(e);
            }
        };

        let order = Order {
            lines: stored_lines,
            ..header
        };
        log::info!(
            "Created order {} for client {} at site {} (total {})",
            order.id,
            order.client_id,
            order.site_id,
            order.total
        );
        self.notifications.try_notify_roles(
            &[Role::Employee, Role::Admin],
            NotificationKind::Order,
            "New order",
            &format!(
                "Order {} with {} lines was placed at {}",
                order.id,
                order.lines.len(),
                site.name
            ),
        );
        Ok(order)
    }

    /// Moves the order along its status graph. Confirming takes the stock,
    /// cancelling a stock-holding order gives it back.
    pub fn change_status(&self, id: Uuid, status: OrderStatus) -> Result<Order, DomainError> {
        let order = self.get(id)?;
        order.status.ensure_transition(status)?;

        let stock_move = match status {
            OrderStatus::Confirmed => Some(StockMove::Take),
            OrderStatus::Cancelled if order.status.holds_stock() => Some(StockMove::Return),
            _ => None,
        };
        if let Some(mv) = stock_move {
            self.apply_stock(&order, mv)?;
        }

        let updated = match self.orders.update_status(id, status) {
            Ok(Some(updated)) => updated,
            Ok(None) => {
                if let Some(mv) = stock_move {
                    self.undo_stock(&order, &order.lines.iter().collect::<Vec<_>>(), mv);
                }
                return Err(DomainError::NotFound("Order"));
            }
            Err(e) => {
                log::warn!("Could not move order {} to {}: {}", id, status, e);
                if let Some(mv) = stock_move {
                    self.undo_stock(&order, &order.lines.iter().collect::<Vec<_>>(), mv);
                }
                return Err(e);
            }
        };

        log::info!("Order {} moved from {} to {}", id, order.status, status);
        self.notifications.try_notify_user(
            order.client_id,
            NotificationKind::Order,
            &format!("Order {status}"),
            &format!("Your order {id} is now {status}"),
        );
        Ok(Order {
            lines: order.lines,
            ..updated
        })
    }

    /// Clients may withdraw their own orders until staff confirm them.
    pub fn cancel_by_client(&self, id: Uuid, client_id: Uuid) -> Result<Order, DomainError> {
        let order = self.get(id)?;
        if order.client_id != client_id {
            return Err(DomainError::Forbidden(
                "only the client who placed the order can cancel it".to_string(),
            ));
        }
        if order.status != OrderStatus::Pending {
            return Err(DomainError::InvalidTransition {
                entity: "order",
                from: order.status.to_string(),
                to: OrderStatus::Cancelled.to_string(),
            });
        }
        self.change_status(id, OrderStatus::Cancelled)
    }

    pub fn get(&self, id: Uuid) -> Result<Order, DomainError> {
        self.orders
            .find_by_id(id)?
            .ok_or(DomainError::NotFound("Order"))
    }

    pub fn list(&self, filter: OrderFilter) -> Result<OrderPage, DomainError> {
        self.orders.list(&filter.normalized())
    }

    fn move_line(&self, site_id: Uuid, line: &OrderLine, mv: StockMove) -> Result<(), DomainError> {
        match mv {
            StockMove::Take => self.inventory.decrement(line.product_id, site_id, line.quantity),
            StockMove::Return => self.inventory.increment(line.product_id, site_id, line.quantity),
        }
        .map(|_| ())
    }

    fn apply_stock(&self, order: &Order, mv: StockMove) -> Result<(), DomainError> {
        let mut applied = Vec::with_capacity(order.lines.len());
        for line in &order.lines {
            if let Err(e) = self.move_line(order.site_id, line, mv) {
                log::warn!(
                    "Stock {:?} for order {} failed on product {}: {}",
                    mv,
                    order.id,
                    line.product_id,
                    e
                );
                self.undo_stock(order, &applied, mv);
                return Err(e);
            }
            applied.push(line);
        }
        Ok(())
    }

    fn undo_stock(&self, order: &Order, applied: &[&OrderLine], mv: StockMove) {
        for line in applied {
            if let Err(e) = self.move_line(order.site_id, line, mv.inverse()) {
                log::error!(
                    "Could not undo stock {:?} of product {} for order {}: {}",
                    mv,
                    line.product_id,
                    order.id,
                    e
                );
            }
        }
    }
}

/// Validates quantities and folds repeated products into one line, keeping
/// the order in which products first appear.
fn merge_lines(lines: &[OrderLineInput]) -> Result<Vec<OrderLineInput>, DomainError> {
    if lines.is_empty() {
        return Err(DomainError::invalid("an order needs at least one line"));
    }
    let mut merged: Vec<OrderLineInput> = Vec::with_capacity(lines.len());
    for line in lines {
        positive_quantity("quantity", line.quantity)?;
        match merged.iter_mut().find(|m| m.product_id == line.product_id) {
            Some(existing) => {
                existing.quantity = existing
                    .quantity
                    .checked_add(line.quantity)
                    .ok_or_else(|| DomainError::invalid("quantity is too large"))?;
            }
            None => merged.push(line.clone()),
        }
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::sync::Arc;

    use chrono::Duration;

    use super::*;
    use crate::application::testing::MemoryDb;
    use crate::domain::promotion::NewPromotion;

    fn manager(db: &Arc<MemoryDb>) -> OrderManager {
        let notifications = NotificationManager::new(db.clone(), db.clone());
        let inventory =
            InventoryManager::new(db.clone(), db.clone(), db.clone(), notifications.clone());
        OrderManager::new(
            db.clone(),
            db.clone(),
            db.clone(),
            PromotionManager::new(db.clone(), db.clone()),
            inventory,
            notifications,
        )
    }

    fn money(value: &str) -> BigDecimal {
        BigDecimal::from_str(value).unwrap()
    }

    struct Fixture {
        db: Arc<MemoryDb>,
        client: Uuid,
        site: Uuid,
        bread: Uuid,
        cake: Uuid,
    }

    fn fixture() -> Fixture {
        let db = MemoryDb::new();
        let client = db.seed_user(Role::Client).id;
        let site = db.seed_site("Centro").id;
        let bread = db.seed_product("Sourdough", "3.50").id;
        let cake = db.seed_product("Carrot cake", "12.00").id;
        db.seed_stock(bread, site, 20, 2);
        db.seed_stock(cake, site, 3, 0);
        Fixture {
            db,
            client,
            site,
            bread,
            cake,
        }
    }

    fn line(product_id: Uuid, quantity: i32) -> OrderLineInput {
        OrderLineInput {
            product_id,
            quantity,
        }
    }

    fn request(f: &Fixture, lines: Vec<OrderLineInput>) -> OrderRequest {
        OrderRequest {
            client_id: f.client,
            site_id: f.site,
            lines,
            promotion_code: None,
            notes: Some("  ".to_string()),
        }
    }

    fn seed_promotion(db: &Arc<MemoryDb>, code: &str, percent: i32, product_id: Option<Uuid>) {
        let now = Utc::now();
        PromotionManager::new(db.clone(), db.clone())
            .create(NewPromotion {
                code: code.to_string(),
                description: String::new(),
                discount_percent: percent,
                product_id,
                starts_at: now - Duration::days(1),
                ends_at: now + Duration::days(1),
            })
            .unwrap();
    }

    #[test]
    fn create_merges_lines_and_snapshots_prices() {
        let f = fixture();
        let order = manager(&f.db)
            .create(
                request(&f, vec![line(f.bread, 2), line(f.cake, 1), line(f.bread, 1)]),
                Utc::now(),
            )
            .unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.lines.len(), 2);
        assert_eq!(order.lines[0].product_id, f.bread);
        assert_eq!(order.lines[0].quantity, 3);
        assert_eq!(order.subtotal, money("22.50"));
        assert_eq!(order.discount, money("0"));
        assert_eq!(order.total, money("22.50"));
        assert_eq!(order.notes, None);
        // creation does not touch stock
        assert_eq!(f.db.stock_of(f.bread, f.site), Some(20));
    }

    #[test]
    fn create_rejects_bad_lines() {
        let f = fixture();
        let manager = manager(&f.db);
        let now = Utc::now();

        assert!(manager.create(request(&f, vec![]), now).is_err());
        assert!(manager.create(request(&f, vec![line(f.bread, 0)]), now).is_err());
        assert!(manager
            .create(request(&f, vec![line(Uuid::new_v4(), 1)]), now)
            .is_err());

        f.db.products.lock().unwrap()[1].active = false;
        assert!(manager.create(request(&f, vec![line(f.cake, 1)]), now).is_err());
        assert!(f.db.orders.lock().unwrap().is_empty());
    }

    #[test]
    fn order_wide_promotion_discounts_the_subtotal() {
        let f = fixture();
        seed_promotion(&f.db, "TENOFF", 10, None);
        let mut req = request(&f, vec![line(f.bread, 3)]);
        req.promotion_code = Some("tenoff".to_string());

        let order = manager(&f.db).create(req, Utc::now()).unwrap();
        // 10.50 * 10% = 1.05
        assert_eq!(order.discount, money("1.05"));
        assert_eq!(order.total, money("9.45"));
        assert_eq!(order.promotion_code.as_deref(), Some("TENOFF"));
    }

    #[test]
    fn product_promotion_only_discounts_its_lines() {
        let f = fixture();
        seed_promotion(&f.db, "CAKE-15", 15, Some(f.cake));
        let mut req = request(&f, vec![line(f.bread, 1), line(f.cake, 1)]);
        req.promotion_code = Some("CAKE-15".to_string());

        let order = manager(&f.db).create(req, Utc::now()).unwrap();
        assert_eq!(order.discount, money("1.80"));
        assert_eq!(order.total, money("13.70"));

        let mut unrelated = request(&f, vec![line(f.bread, 1)]);
        unrelated.promotion_code = Some("CAKE-15".to_string());
        assert!(matches!(
            manager(&f.db).create(unrelated, Utc::now()),
            Err(DomainError::InvalidInput(_))
        ));
    }

    #[test]
    fn expired_promotion_is_rejected() {
        let f = fixture();
        seed_promotion(&f.db, "SOON-GONE", 10, None);
        let mut req = request(&f, vec![line(f.bread, 1)]);
        req.promotion_code = Some("SOON-GONE".to_string());

        assert!(manager(&f.db)
            .create(req, Utc::now() + Duration::days(5))
            .is_err());
        assert!(f.db.orders.lock().unwrap().is_empty());
    }

    #[test]
    fn failed_lines_remove_the_header() {
        let f = fixture();
        MemoryDb::set(&f.db.fail_order_lines, true);
        assert!(manager(&f.db)
            .create(request(&f, vec![line(f.bread, 1)]), Utc::now())
            .is_err());
        assert!(f.db.orders.lock().unwrap().is_empty());
    }

    #[test]
    fn new_orders_notify_staff() {
        let f = fixture();
        let employee = f.db.seed_user(Role::Employee);
        manager(&f.db)
            .create(request(&f, vec![line(f.bread, 1)]), Utc::now())
            .unwrap();
        assert_eq!(f.db.notifications_for(employee.id).len(), 1);
        assert!(f.db.notifications_for(f.client).is_empty());
    }

    #[test]
    fn confirming_takes_stock_and_notifies_the_client() {
        let f = fixture();
        let manager = manager(&f.db);
        let order = manager
            .create(request(&f, vec![line(f.bread, 5), line(f.cake, 2)]), Utc::now())
            .unwrap();

        let confirmed = manager.change_status(order.id, OrderStatus::Confirmed).unwrap();
        assert_eq!(confirmed.status, OrderStatus::Confirmed);
        assert_eq!(confirmed.lines.len(), 2);
        assert_eq!(f.db.stock_of(f.bread, f.site), Some(15));
        assert_eq!(f.db.stock_of(f.cake, f.site), Some(1));
        assert_eq!(f.db.notifications_for(f.client).len(), 1);
    }

    #[test]
    fn insufficient_stock_on_confirm_reverts_earlier_lines() {
        let f = fixture();
        let manager = manager(&f.db);
        let order = manager
            .create(request(&f, vec![line(f.bread, 5), line(f.cake, 4)]), Utc::now())
            .unwrap();

        let err = manager
            .change_status(order.id, OrderStatus::Confirmed)
            .unwrap_err();
        assert!(matches!(err, DomainError::InsufficientStock { .. }));
        assert_eq!(f.db.stock_of(f.bread, f.site), Some(20));
        assert_eq!(f.db.stock_of(f.cake, f.site), Some(3));
        assert_eq!(manager.get(order.id).unwrap().status, OrderStatus::Pending);
    }

    #[test]
    fn failed_status_update_gives_stock_back() {
        let f = fixture();
        let manager = manager(&f.db);
        let order = manager
            .create(request(&f, vec![line(f.bread, 5)]), Utc::now())
            .unwrap();
        MemoryDb::set(&f.db.fail_order_status, true);

        assert!(manager.change_status(order.id, OrderStatus::Confirmed).is_err());
        assert_eq!(f.db.stock_of(f.bread, f.site), Some(20));
    }

    #[test]
    fn cancelling_a_confirmed_order_restocks() {
        let f = fixture();
        let manager = manager(&f.db);
        let order = manager
            .create(request(&f, vec![line(f.bread, 5)]), Utc::now())
            .unwrap();
        manager.change_status(order.id, OrderStatus::Confirmed).unwrap();
        manager.change_status(order.id, OrderStatus::Preparing).unwrap();
        assert_eq!(f.db.stock_of(f.bread, f.site), Some(15));

        manager.change_status(order.id, OrderStatus::Cancelled).unwrap();
        assert_eq!(f.db.stock_of(f.bread, f.site), Some(20));
    }

    #[test]
    fn invalid_transitions_are_rejected_without_side_effects() {
        let f = fixture();
        let manager = manager(&f.db);
        let order = manager
            .create(request(&f, vec![line(f.bread, 1)]), Utc::now())
            .unwrap();

        let err = manager
            .change_status(order.id, OrderStatus::Delivered)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot change order status from pending to delivered"
        );
        assert!(f.db.notifications_for(f.client).is_empty());
        assert!(matches!(
            manager.change_status(Uuid::new_v4(), OrderStatus::Confirmed),
            Err(DomainError::NotFound("Order"))
        ));
    }

    #[test]
    fn clients_cancel_only_their_pending_orders() {
        let f = fixture();
        let manager = manager(&f.db);
        let stranger = f.db.seed_user(Role::Client).id;
        let first = manager
            .create(request(&f, vec![line(f.bread, 1)]), Utc::now())
            .unwrap();
        let second = manager
            .create(request(&f, vec![line(f.bread, 1)]), Utc::now())
            .unwrap();

        assert!(matches!(
            manager.cancel_by_client(first.id, stranger),
            Err(DomainError::Forbidden(_))
        ));
        let cancelled = manager.cancel_by_client(first.id, f.client).unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);

        manager.change_status(second.id, OrderStatus::Confirmed).unwrap();
        assert!(matches!(
            manager.cancel_by_client(second.id, f.client),
            Err(DomainError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn list_pages_newest_first() {
        let f = fixture();
        let manager = manager(&f.db);
        for _ in 0..3 {
            manager
                .create(request(&f, vec![line(f.bread, 1)]), Utc::now())
                .unwrap();
        }

        let page = manager
            .list(OrderFilter {
                client_id: Some(f.client),
                page: 2,
                limit: 2,
                ..OrderFilter::default()
            })
            .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 1);
    }
}
