use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimStatus {
    Open,
    InReview,
    Resolved,
    Rejected,
    Closed,
}

impl ClaimStatus {
    pub const ALL: [ClaimStatus; 5] = [
        ClaimStatus::Open,
        ClaimStatus::InReview,
        ClaimStatus::Resolved,
        ClaimStatus::Rejected,
        ClaimStatus::Closed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ClaimStatus::Open => "open",
            ClaimStatus::InReview => "in_review",
            ClaimStatus::Resolved => "resolved",
            ClaimStatus::Rejected => "rejected",
            ClaimStatus::Closed => "closed",
        }
    }

    pub fn next(self) -> &'static [ClaimStatus] {
        use ClaimStatus::*;
        match self {
            Open => &[InReview, Rejected],
            InReview => &[Resolved, Rejected],
            Resolved | Rejected => &[Closed],
            Closed => &[],
        }
    }

    pub fn ensure_transition(self, to: ClaimStatus) -> Result<(), DomainError> {
        if self.next().contains(&to) {
            Ok(())
        } else {
            Err(DomainError::InvalidTransition {
                entity: "claim",
                from: self.to_string(),
                to: to.to_string(),
            })
        }
    }

    /// Moving into these statuses requires a written answer to the client.
    pub fn requires_response(self) -> bool {
        matches!(self, ClaimStatus::Resolved | ClaimStatus::Rejected)
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClaimStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DomainError::invalid(format!("unknown claim status '{s}'")))
    }
}

#[derive(Debug, Clone)]
pub struct Claim {
    pub id: Uuid,
    pub client_id: Uuid,
    pub order_id: Option<Uuid>,
    pub subject: String,
    pub description: String,
    pub status: ClaimStatus,
    pub response: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewClaim {
    pub client_id: Uuid,
    pub order_id: Option<Uuid>,
    pub subject: String,
    pub description: String,
}

#[derive(Debug, Clone, Default)]
pub struct ClaimFilter {
    pub client_id: Option<Uuid>,
    pub status: Option<ClaimStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_close_only_after_a_decision() {
        assert!(ClaimStatus::Open.ensure_transition(ClaimStatus::Closed).is_err());
        assert!(ClaimStatus::InReview.ensure_transition(ClaimStatus::Closed).is_err());
        assert!(ClaimStatus::Resolved.ensure_transition(ClaimStatus::Closed).is_ok());
        assert!(ClaimStatus::Rejected.ensure_transition(ClaimStatus::Closed).is_ok());
    }

    #[test]
    fn open_claims_can_be_rejected_directly() {
        assert!(ClaimStatus::Open.ensure_transition(ClaimStatus::Rejected).is_ok());
        assert!(ClaimStatus::Open.ensure_transition(ClaimStatus::Resolved).is_err());
    }

    #[test]
    fn closed_is_terminal() {
        for to in ClaimStatus::ALL {
            assert!(ClaimStatus::Closed.ensure_transition(to).is_err());
        }
    }

    #[test]
    fn in_review_round_trips_through_str() {
        assert_eq!("in_review".parse::<ClaimStatus>().unwrap(), ClaimStatus::InReview);
        assert_eq!(ClaimStatus::InReview.to_string(), "in_review");
    }
}
