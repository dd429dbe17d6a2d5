use std::sync::Arc;

use uuid::Uuid;

use crate::domain::claim::{Claim, ClaimFilter, ClaimStatus, NewClaim};
use crate::domain::errors::DomainError;
use crate::domain::notification::NotificationKind;
use crate::domain::ports::{ClaimRepository, OrderRepository};
use crate::domain::user::Role;
use crate::domain::validation::{optional_text, required_text};

use super::notification_manager::NotificationManager;

const MAX_SUBJECT_LEN: usize = 120;
const MAX_DESCRIPTION_LEN: usize = 4000;

#[derive(Clone)]
pub struct ClaimManager {
    claims: Arc<dyn ClaimRepository>,
    orders: Arc<dyn OrderRepository>,
    notifications: NotificationManager,
}

impl ClaimManager {
    pub fn new(
        claims: Arc<dyn ClaimRepository>,
        orders: Arc<dyn OrderRepository>,
        notifications: NotificationManager,
    ) -> Self {
        Self {
            claims,
            orders,
            notifications,
        }
    }

    pub fn open(&self, input: NewClaim) -> Result<Claim, DomainError> {
        let subject = required_text("subject", &input.subject, MAX_SUBJECT_LEN)?;
        let description = required_text("description", &input.description, MAX_DESCRIPTION_LEN)?;
        if let Some(order_id) = input.order_id {
            let order = self
                .orders
                .find_by_id(order_id)?
                .ok_or(DomainError::NotFound("Order"))?;
            if order.client_id != input.client_id {
                return Err(DomainError::Forbidden(
                    "claims can only reference your own orders".to_string(),
                ));
            }
        }

        let claim = self.claims.create(NewClaim {
            client_id: input.client_id,
            order_id: input.order_id,
            subject,
            description,
        })?;
        log::info!("Client {} opened claim {}", claim.client_id, claim.id);
        self.notifications.try_notify_roles(
            &[Role::Employee, Role::Admin],
            NotificationKind::Claim,
            "New claim",
            &format!("Claim {}: {}", claim.id, claim.subject),
        );
        Ok(claim)
    }

    /// Resolving or rejecting a claim needs a response for the client.
    pub fn change_status(
        &self,
        id: Uuid,
        status: ClaimStatus,
        response: Option<String>,
    ) -> Result<Claim, DomainError> {
        let claim = self.get(id)?;
        claim.status.ensure_transition(status)?;
        let response = optional_text(response);
        if status.requires_response() && response.is_none() {
            return Err(DomainError::invalid(format!(
                "a response is required to mark a claim {status}"
            )));
        }

        let updated = self
            .claims
            .update_status(id, status, response)?
            .ok_or(DomainError::NotFound("Claim"))?;
        log::info!("Claim {} moved from {} to {}", id, claim.status, status);
        self.notifications.try_notify_user(
            updated.client_id,
            NotificationKind::Claim,
            &format!("Claim {status}"),
            updated
                .response
                .as_deref()
                .unwrap_or("Your claim was updated"),
        );
        Ok(updated)
    }

    pub fn get(&self, id: Uuid) -> Result<Claim, DomainError> {
        self.claims
            .find_by_id(id)?
            .ok_or(DomainError::NotFound("Claim"))
    }

    pub fn list(&self, filter: ClaimFilter) -> Result<Vec<Claim>, DomainError> {
        self.claims.list(&filter)
    }
}
