use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::attendance::{
    is_late, matching_shift, Attendance, AttendanceFilter, AttendanceSummary, NewAttendance,
};
use crate::domain::errors::DomainError;
use crate::domain::ports::{AttendanceRepository, ShiftRepository};
use crate::domain::shift::ShiftFilter;

/// Clock-in and clock-out for staff. Check-ins are matched against the
/// employee's scheduled shifts to flag late arrivals.
#[derive(Clone)]
pub struct AttendanceManager {
    attendance: Arc<dyn AttendanceRepository>,
    shifts: Arc<dyn ShiftRepository>,
}

impl AttendanceManager {
    pub fn new(attendance: Arc<dyn AttendanceRepository>, shifts: Arc<dyn ShiftRepository>) -> Self {
        Self { attendance, shifts }
    }

    pub fn check_in(&self, employee_id: Uuid, at: DateTime<Utc>) -> Result<Attendance, DomainError> {
        if let Some(open) = self.attendance.find_open(employee_id)? {
            return Err(DomainError::Conflict(format!(
                "already checked in since {}",
                open.check_in
            )));
        }

        // coarse window; matching_shift applies the exact rule
        let candidates = self.shifts.list(&ShiftFilter {
            employee_id: Some(employee_id),
            from: Some(at - Duration::days(1)),
            to: Some(at + Duration::days(1)),
            ..ShiftFilter::default()
        })?;
        let shift = matching_shift(&candidates, at);

        let record = self.attendance.create(NewAttendance {
            employee_id,
            shift_id: shift.map(|s| s.id),
            check_in: at,
            late: shift.is_some_and(|s| is_late(s, at)),
        })?;
        if record.late {
            log::info!("Employee {} checked in late at {}", employee_id, at);
        }
        Ok(record)
    }

    pub fn check_out(&self, employee_id: Uuid, at: DateTime<Utc>) -> Result<Attendance, DomainError> {
        let open = self
            .attendance
            .find_open(employee_id)?
            .ok_or(DomainError::NotFound("Open attendance record"))?;
        if at < open.check_in {
            return Err(DomainError::invalid("check-out cannot precede check-in"));
        }
        self.attendance
            .close(open.id, at)?
            .ok_or(DomainError::NotFound("Open attendance record"))
    }

    pub fn list(&self, filter: AttendanceFilter) -> Result<Vec<Attendance>, DomainError> {
        self.attendance.list(&filter)
    }

    pub fn summary(
        &self,
        employee_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<AttendanceSummary, DomainError> {
        if to <= from {
            return Err(DomainError::invalid("'to' must be after 'from'"));
        }
        let records = self.attendance.list(&AttendanceFilter {
            employee_id: Some(employee_id),
            from: Some(from),
            to: Some(to),
        })?;
        Ok(AttendanceSummary::from_records(employee_id, records))
    }
}
