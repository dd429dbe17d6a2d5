pub mod attendance_manager;
pub mod claim_manager;
pub mod inventory_manager;
pub mod notification_manager;
pub mod order_manager;
pub mod product_manager;
pub mod promotion_manager;
pub mod purchase_manager;
pub mod report_manager;
pub mod shift_manager;
pub mod site_manager;
pub mod supplier_manager;
pub mod user_manager;

#[cfg(test)]
pub(crate) mod testing;
