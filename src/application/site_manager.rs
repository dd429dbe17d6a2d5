use std::sync::Arc;

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::SiteRepository;
use crate::domain::site::{NewSite, Site, SiteUpdate};
use crate::domain::validation::required_text;

#[derive(Clone)]
pub struct SiteManager {
    sites: Arc<dyn SiteRepository>,
}

impl SiteManager {
    pub fn new(sites: Arc<dyn SiteRepository>) -> Self {
        Self { sites }
    }

    pub fn create(&self, name: &str, address: &str) -> Result<Site, DomainError> {
        self.sites.create(NewSite {
            name: required_text("name", name, 255)?,
            address: address.trim().to_string(),
        })
    }

    pub fn get(&self, id: Uuid) -> Result<Site, DomainError> {
        self.sites.find_by_id(id)?.ok_or(DomainError::NotFound("Site"))
    }

    pub fn list(&self, active_only: bool) -> Result<Vec<Site>, DomainError> {
        self.sites.list(active_only)
    }

    pub fn update(&self, id: Uuid, mut changes: SiteUpdate) -> Result<Site, DomainError> {
        if changes.is_empty() {
            return Err(DomainError::invalid("nothing to update"));
        }
        if let Some(name) = &changes.name {
            changes.name = Some(required_text("name", name, 255)?);
        }
        self.sites
            .update(id, changes)?
            .ok_or(DomainError::NotFound("Site"))
    }
}
