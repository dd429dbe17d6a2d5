use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Order,
    Stock,
    Purchase,
    Claim,
    Shift,
    General,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::Order => "order",
            NotificationKind::Stock => "stock",
            NotificationKind::Purchase => "purchase",
            NotificationKind::Claim => "claim",
            NotificationKind::Shift => "shift",
            NotificationKind::General => "general",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "order" => Ok(NotificationKind::Order),
            "stock" => Ok(NotificationKind::Stock),
            "purchase" => Ok(NotificationKind::Purchase),
            "claim" => Ok(NotificationKind::Claim),
            "shift" => Ok(NotificationKind::Shift),
            "general" => Ok(NotificationKind::General),
            other => Err(DomainError::invalid(format!("unknown notification kind '{other}'"))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}
