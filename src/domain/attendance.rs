use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use super::shift::Shift;

/// Minutes after shift start before a check-in counts as late.
pub const LATE_TOLERANCE_MINUTES: i64 = 10;
/// How early before shift start a check-in is still matched to that shift.
pub const EARLY_CHECK_IN_MINUTES: i64 = 60;

#[derive(Debug, Clone)]
pub struct Attendance {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub shift_id: Option<Uuid>,
    pub check_in: DateTime<Utc>,
    pub check_out: Option<DateTime<Utc>>,
    pub late: bool,
}

impl Attendance {
    pub fn is_open(&self) -> bool {
        self.check_out.is_none()
    }

    pub fn worked_minutes(&self) -> Option<i64> {
        self.check_out
            .map(|out| (out - self.check_in).num_minutes())
    }
}

#[derive(Debug, Clone)]
pub struct NewAttendance {
    pub employee_id: Uuid,
    pub shift_id: Option<Uuid>,
    pub check_in: DateTime<Utc>,
    pub late: bool,
}

#[derive(Debug, Clone, Default)]
pub struct AttendanceFilter {
    pub employee_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct AttendanceSummary {
    pub employee_id: Uuid,
    pub records: Vec<Attendance>,
    pub worked_minutes: i64,
    pub late_count: usize,
}

impl AttendanceSummary {
    pub fn from_records(employee_id: Uuid, records: Vec<Attendance>) -> Self {
        let worked_minutes = records.iter().filter_map(Attendance::worked_minutes).sum();
        let late_count = records.iter().filter(|r| r.late).count();
        Self {
            employee_id,
            records,
            worked_minutes,
            late_count,
        }
    }
}

/// Picks the shift a check-in at `at` belongs to, if any.
pub fn matching_shift(shifts: &[Shift], at: DateTime<Utc>) -> Option<&Shift> {
    shifts.iter().find(|s| {
        s.starts_at - Duration::minutes(EARLY_CHECK_IN_MINUTES) <= at && at <= s.ends_at
    })
}

pub fn is_late(shift: &Shift, at: DateTime<Utc>) -> bool {
    at > shift.starts_at + Duration::minutes(LATE_TOLERANCE_MINUTES)
}
