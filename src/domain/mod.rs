pub mod attendance;
pub mod claim;
pub mod errors;
pub mod inventory;
pub mod notification;
pub mod order;
pub mod ports;
pub mod product;
pub mod promotion;
pub mod purchase;
pub mod shift;
pub mod site;
pub mod supplier;
pub mod user;
pub mod validation;
