use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::attendance::{Attendance, AttendanceFilter, NewAttendance};
use crate::domain::errors::DomainError;
use crate::domain::ports::AttendanceRepository;
use crate::schema::attendance;

use super::models::{AttendanceRow, NewAttendanceRow};

pub struct DieselAttendanceRepository {
    pool: DbPool,
}

impl DieselAttendanceRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl AttendanceRepository for DieselAttendanceRepository {
    fn create(&self, record: NewAttendance) -> Result<Attendance, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(attendance::table)
            .values(&NewAttendanceRow {
                id: Uuid::new_v4(),
                employee_id: record.employee_id,
                shift_id: record.shift_id,
                check_in: record.check_in,
                late: record.late,
            })
            .returning(AttendanceRow::as_returning())
            .get_result::<AttendanceRow>(&mut conn)?;
        Ok(row.into())
    }

    fn find_open(&self, employee_id: Uuid) -> Result<Option<Attendance>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = attendance::table
            .filter(attendance::employee_id.eq(employee_id))
            .filter(attendance::check_out.is_null())
            .order(attendance::check_in.desc())
            .select(AttendanceRow::as_select())
            .first::<AttendanceRow>(&mut conn)
            .optional()?;
        Ok(row.map(Attendance::from))
    }

    fn close(
        &self,
        id: Uuid,
        check_out: DateTime<Utc>,
    ) -> Result<Option<Attendance>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::update(attendance::table.find(id))
            .set(attendance::check_out.eq(Some(check_out)))
            .returning(AttendanceRow::as_returning())
            .get_result::<AttendanceRow>(&mut conn)
            .optional()?;
        Ok(row.map(Attendance::from))
    }

    fn list(&self, filter: &AttendanceFilter) -> Result<Vec<Attendance>, DomainError> {
        let mut conn = self.pool.get()?;
        let mut query = attendance::table
            .select(AttendanceRow::as_select())
            .into_boxed();
        if let Some(employee_id) = filter.employee_id {
            query = query.filter(attendance::employee_id.eq(employee_id));
        }
        if let Some(from) = filter.from {
            query = query.filter(attendance::check_in.ge(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(attendance::check_in.lt(to));
        }
        let rows = query
            .order(attendance::check_in.asc())
            .load::<AttendanceRow>(&mut conn)?;
        Ok(rows.into_iter().map(Attendance::from).collect())
    }
}
