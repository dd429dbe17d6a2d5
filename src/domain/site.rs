use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A store or workshop that holds its own stock.
#[derive(Debug, Clone)]
pub struct Site {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSite {
    pub name: String,
    pub address: String,
}

#[derive(Debug, Clone, Default)]
pub struct SiteUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub active: Option<bool>,
}

impl SiteUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.address.is_none() && self.active.is_none()
    }
}
