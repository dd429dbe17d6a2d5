use std::sync::Arc;

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::SupplierRepository;
use crate::domain::supplier::{NewSupplier, Supplier, SupplierUpdate};
use crate::domain::validation::{normalize_email, optional_text, required_text};

#[derive(Clone)]
pub struct SupplierManager {
    suppliers: Arc<dyn SupplierRepository>,
}

impl SupplierManager {
    pub fn new(suppliers: Arc<dyn SupplierRepository>) -> Self {
        Self { suppliers }
    }

    pub fn create(&self, input: NewSupplier) -> Result<Supplier, DomainError> {
        self.suppliers.create(NewSupplier {
            name: required_text("name", &input.name, 255)?,
            contact_name: optional_text(input.contact_name),
            phone: optional_text(input.phone),
            email: optional_email(input.email)?,
        })
    }

    pub fn get(&self, id: Uuid) -> Result<Supplier, DomainError> {
        self.suppliers
            .find_by_id(id)?
            .ok_or(DomainError::NotFound("Supplier"))
    }

    pub fn list(&self, active_only: bool) -> Result<Vec<Supplier>, DomainError> {
        self.suppliers.list(active_only)
    }

    pub fn update(&self, id: Uuid, changes: SupplierUpdate) -> Result<Supplier, DomainError> {
        if changes.is_empty() {
            return Err(DomainError::invalid("nothing to update"));
        }
        let changes = SupplierUpdate {
            name: changes
                .name
                .map(|n| required_text("name", &n, 255))
                .transpose()?,
            contact_name: optional_text(changes.contact_name),
            phone: optional_text(changes.phone),
            email: optional_email(changes.email)?,
            active: changes.active,
        };
        self.suppliers
            .update(id, changes)?
            .ok_or(DomainError::NotFound("Supplier"))
    }

    pub fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        if self.suppliers.delete(id)? {
            Ok(())
        } else {
            Err(DomainError::NotFound("Supplier"))
        }
    }
}

fn optional_email(email: Option<String>) -> Result<Option<String>, DomainError> {
    optional_text(email).map(|e| normalize_email(&e)).transpose()
}
