use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use super::errors::DomainError;

pub const MAX_SHIFT_HOURS: i64 = 12;

#[derive(Debug, Clone)]
pub struct Shift {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub site_id: Uuid,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Shift {
    /// Half-open interval overlap: a shift ending at 14:00 does not clash with one starting at 14:00.
    pub fn overlaps(&self, starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> bool {
        self.starts_at < ends_at && starts_at < self.ends_at
    }
}

#[derive(Debug, Clone)]
pub struct NewShift {
    pub employee_id: Uuid,
    pub site_id: Uuid,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ShiftFilter {
    pub employee_id: Option<Uuid>,
    pub site_id: Option<Uuid>,
    /// Shifts ending after this instant.
    pub from: Option<DateTime<Utc>>,
    /// Shifts starting before this instant.
    pub to: Option<DateTime<Utc>>,
}

pub fn validate_window(starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> Result<(), DomainError> {
    if ends_at <= starts_at {
        return Err(DomainError::invalid("shift must end after it starts"));
    }
    if ends_at - starts_at > Duration::hours(MAX_SHIFT_HOURS) {
        return Err(DomainError::invalid(format!(
            "shift must not be longer than {MAX_SHIFT_HOURS} hours"
        )));
    }
    Ok(())
}
