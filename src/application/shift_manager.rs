use std::sync::Arc;

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::notification::NotificationKind;
use crate::domain::ports::{ShiftRepository, SiteRepository, UserRepository};
use crate::domain::shift::{validate_window, NewShift, Shift, ShiftFilter};
use crate::domain::validation::optional_text;

use super::notification_manager::NotificationManager;

#[derive(Clone)]
pub struct ShiftManager {
    shifts: Arc<dyn ShiftRepository>,
    users: Arc<dyn UserRepository>,
    sites: Arc<dyn SiteRepository>,
    notifications: NotificationManager,
}

impl ShiftManager {
    pub fn new(
        shifts: Arc<dyn ShiftRepository>,
        users: Arc<dyn UserRepository>,
        sites: Arc<dyn SiteRepository>,
        notifications: NotificationManager,
    ) -> Self {
        Self {
            shifts,
            users,
            sites,
            notifications,
        }
    }

    pub fn create(&self, input: NewShift) -> Result<Shift, DomainError> {
        let input = self.validated(input, None)?;
        let shift = self.shifts.create(input)?;
        log::info!(
            "Scheduled shift {} for employee {} ({} - {})",
            shift.id,
            shift.employee_id,
            shift.starts_at,
            shift.ends_at
        );
        self.notifications.try_notify_user(
            shift.employee_id,
            NotificationKind::Shift,
            "New shift",
            &format!(
                "You have a shift from {} to {}",
                shift.starts_at.format("%Y-%m-%d %H:%M"),
                shift.ends_at.format("%Y-%m-%d %H:%M")
            ),
        );
        Ok(shift)
    }

    pub fn update(&self, id: Uuid, input: NewShift) -> Result<Shift, DomainError> {
        self.get(id)?;
        let input = self.validated(input, Some(id))?;
        self.shifts
            .update(id, input)?
            .ok_or(DomainError::NotFound("Shift"))
    }

    pub fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        if self.shifts.delete(id)? {
            log::info!("Deleted shift {}", id);
            Ok(())
        } else {
            Err(DomainError::NotFound("Shift"))
        }
    }

    pub fn get(&self, id: Uuid) -> Result<Shift, DomainError> {
        self.shifts
            .find_by_id(id)?
            .ok_or(DomainError::NotFound("Shift"))
    }

    pub fn list(&self, filter: ShiftFilter) -> Result<Vec<Shift>, DomainError> {
        self.shifts.list(&filter)
    }

    fn validated(&self, input: NewShift, existing: Option<Uuid>) -> Result<NewShift, DomainError> {
        validate_window(input.starts_at, input.ends_at)?;

        let employee = self
            .users
            .find_by_id(input.employee_id)?
            .ok_or(DomainError::NotFound("Employee"))?;
        if !employee.active || !employee.role.is_staff() {
            return Err(DomainError::invalid(format!(
                "{} cannot be scheduled",
                employee.full_name
            )));
        }
        self.sites
            .find_by_id(input.site_id)?
            .ok_or(DomainError::NotFound("Site"))?;

        let nearby = self.shifts.list(&ShiftFilter {
            employee_id: Some(input.employee_id),
            from: Some(input.starts_at),
            to: Some(input.ends_at),
            ..ShiftFilter::default()
        })?;
        if let Some(clash) = nearby
            .iter()
            .filter(|s| Some(s.id) != existing)
            .find(|s| s.overlaps(input.starts_at, input.ends_at))
        {
            return Err(DomainError::Conflict(format!(
                "overlaps shift {} ({} - {})",
                clash.id, clash.starts_at, clash.ends_at
            )));
        }

        Ok(NewShift {
            notes: optional_text(input.notes),
            ..input
        })
    }
}
