use std::sync::Arc;

use crate::application::attendance_manager::AttendanceManager;
use crate::application::claim_manager::ClaimManager;
use crate::application::inventory_manager::InventoryManager;
use crate::application::notification_manager::NotificationManager;
use crate::application::order_manager::OrderManager;
use crate::application::product_manager::ProductManager;
use crate::application::promotion_manager::PromotionManager;
use crate::application::purchase_manager::PurchaseManager;
use crate::application::report_manager::ReportManager;
use crate::application::shift_manager::ShiftManager;
use crate::application::site_manager::SiteManager;
use crate::application::supplier_manager::SupplierManager;
use crate::application::user_manager::UserManager;
use crate::auth::JwtManager;
use crate::config::Config;
use crate::db::DbPool;
use crate::infrastructure::attendance_repo::DieselAttendanceRepository;
use crate::infrastructure::claim_repo::DieselClaimRepository;
use crate::infrastructure::inventory_repo::DieselInventoryRepository;
use crate::infrastructure::notification_repo::DieselNotificationRepository;
use crate::infrastructure::order_repo::DieselOrderRepository;
use crate::infrastructure::product_repo::DieselProductRepository;
use crate::infrastructure::promotion_repo::DieselPromotionRepository;
use crate::infrastructure::purchase_repo::DieselPurchaseRepository;
use crate::infrastructure::shift_repo::DieselShiftRepository;
use crate::infrastructure::site_repo::DieselSiteRepository;
use crate::infrastructure::supplier_repo::DieselSupplierRepository;
use crate::infrastructure::user_repo::DieselUserRepository;

/// Everything a request handler needs, shared across actix workers.
#[derive(Clone)]
pub struct AppState {
    pub jwt: Arc<JwtManager>,
    pub users: UserManager,
    pub sites: SiteManager,
    pub products: ProductManager,
    pub suppliers: SupplierManager,
    pub inventory: InventoryManager,
    pub purchases: PurchaseManager,
    pub orders: OrderManager,
    pub promotions: PromotionManager,
    pub shifts: ShiftManager,
    pub attendance: AttendanceManager,
    pub claims: ClaimManager,
    pub notifications: NotificationManager,
    pub reports: ReportManager,
}

impl AppState {
    pub fn from_pool(pool: DbPool, config: &Config) -> Self {
        let jwt = Arc::new(JwtManager::new(&config.jwt_secret, config.token_ttl_secs));

        let user_repo = Arc::new(DieselUserRepository::new(pool.clone()));
        let site_repo = Arc::new(DieselSiteRepository::new(pool.clone()));
        let product_repo = Arc::new(DieselProductRepository::new(pool.clone()));
        let supplier_repo = Arc::new(DieselSupplierRepository::new(pool.clone()));
        let inventory_repo = Arc::new(DieselInventoryRepository::new(pool.clone()));
        let purchase_repo = Arc::new(DieselPurchaseRepository::new(pool.clone()));
        let order_repo = Arc::new(DieselOrderRepository::new(pool.clone()));
        let promotion_repo = Arc::new(DieselPromotionRepository::new(pool.clone()));
        let shift_repo = Arc::new(DieselShiftRepository::new(pool.clone()));
        let attendance_repo = Arc::new(DieselAttendanceRepository::new(pool.clone()));
        let claim_repo = Arc::new(DieselClaimRepository::new(pool.clone()));
        let notification_repo = Arc::new(DieselNotificationRepository::new(pool));

        let notifications = NotificationManager::new(notification_repo, user_repo.clone());
        let inventory = InventoryManager::new(
            inventory_repo.clone(),
            product_repo.clone(),
            site_repo.clone(),
            notifications.clone(),
        );
        let promotions = PromotionManager::new(promotion_repo, product_repo.clone());

        AppState {
            jwt: jwt.clone(),
            users: UserManager::new(user_repo.clone(), jwt),
            sites: SiteManager::new(site_repo.clone()),
            products: ProductManager::new(product_repo.clone()),
            suppliers: SupplierManager::new(supplier_repo.clone()),
            purchases: PurchaseManager::new(
                purchase_repo,
                supplier_repo,
                site_repo.clone(),
                product_repo.clone(),
                inventory.clone(),
                notifications.clone(),
            ),
            orders: OrderManager::new(
                order_repo.clone(),
                product_repo.clone(),
                site_repo.clone(),
                promotions.clone(),
                inventory.clone(),
                notifications.clone(),
            ),
            shifts: ShiftManager::new(
                shift_repo.clone(),
                user_repo,
                site_repo.clone(),
                notifications.clone(),
            ),
            attendance: AttendanceManager::new(attendance_repo.clone(), shift_repo),
            claims: ClaimManager::new(claim_repo, order_repo.clone(), notifications.clone()),
            reports: ReportManager::new(
                order_repo,
                inventory_repo,
                product_repo,
                site_repo,
                attendance_repo,
            ),
            inventory,
            promotions,
            notifications,
        }
    }
}
