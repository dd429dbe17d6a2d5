use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseStatus {
    Pending,
    Received,
    Cancelled,
}

impl PurchaseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PurchaseStatus::Pending => "pending",
            PurchaseStatus::Received => "received",
            PurchaseStatus::Cancelled => "cancelled",
        }
    }

    pub fn next(self) -> &'static [PurchaseStatus] {
        match self {
            PurchaseStatus::Pending => &[PurchaseStatus::Received, PurchaseStatus::Cancelled],
            PurchaseStatus::Received | PurchaseStatus::Cancelled => &[],
        }
    }

    pub fn ensure_transition(self, to: PurchaseStatus) -> Result<(), DomainError> {
        if self.next().contains(&to) {
            Ok(())
        } else {
            Err(DomainError::InvalidTransition {
                entity: "purchase",
                from: self.to_string(),
                to: to.to_string(),
            })
        }
    }
}

impl fmt::Display for PurchaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PurchaseStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PurchaseStatus::Pending),
            "received" => Ok(PurchaseStatus::Received),
            "cancelled" => Ok(PurchaseStatus::Cancelled),
            other => Err(DomainError::invalid(format!("unknown purchase status '{other}'"))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PurchaseLineInput {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_cost: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct PurchaseLine {
    pub id: Uuid,
    pub purchase_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_cost: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct Purchase {
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub site_id: Uuid,
    pub status: PurchaseStatus,
    pub total: BigDecimal,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub received_at: Option<DateTime<Utc>>,
    pub lines: Vec<PurchaseLine>,
}

#[derive(Debug, Clone)]
pub struct NewPurchase {
    pub supplier_id: Uuid,
    pub site_id: Uuid,
    pub total: BigDecimal,
    pub created_by: Uuid,
}

#[derive(Debug, Clone, Default)]
pub struct PurchaseFilter {
    pub status: Option<PurchaseStatus>,
    pub site_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
}
