use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::ShiftRepository;
use crate::domain::shift::{NewShift, Shift, ShiftFilter};
use crate::schema::shifts;

use super::models::{NewShiftRow, ShiftChangeset, ShiftRow};

pub struct DieselShiftRepository {
    pool: DbPool,
}

impl DieselShiftRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl ShiftRepository for DieselShiftRepository {
    fn create(&self, shift: NewShift) -> Result<Shift, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(shifts::table)
            .values(&NewShiftRow {
                id: Uuid::new_v4(),
                employee_id: shift.employee_id,
                site_id: shift.site_id,
                starts_at: shift.starts_at,
                ends_at: shift.ends_at,
                notes: shift.notes,
            })
            .returning(ShiftRow::as_returning())
            .get_result::<ShiftRow>(&mut conn)?;
        Ok(row.into())
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Shift>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = shifts::table
            .find(id)
            .select(ShiftRow::as_select())
            .first::<ShiftRow>(&mut conn)
            .optional()?;
        Ok(row.map(Shift::from))
    }

    fn list(&self, filter: &ShiftFilter) -> Result<Vec<Shift>, DomainError> {
        let mut conn = self.pool.get()?;
        let mut query = shifts::table.select(ShiftRow::as_select()).into_boxed();
        if let Some(employee_id) = filter.employee_id {
            query = query.filter(shifts::employee_id.eq(employee_id));
        }
        if let Some(site_id) = filter.site_id {
            query = query.filter(shifts::site_id.eq(site_id));
        }
        if let Some(from) = filter.from {
            query = query.filter(shifts::ends_at.gt(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(shifts::starts_at.lt(to));
        }
        let rows = query
            .order(shifts::starts_at.asc())
            .load::<ShiftRow>(&mut conn)?;
        Ok(rows.into_iter().map(Shift::from).collect())
    }

    fn update(&self, id: Uuid, shift: NewShift) -> Result<Option<Shift>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::update(shifts::table.find(id))
            .set(&ShiftChangeset {
                employee_id: shift.employee_id,
                site_id: shift.site_id,
                starts_at: shift.starts_at,
                ends_at: shift.ends_at,
                notes: shift.notes,
            })
            .returning(ShiftRow::as_returning())
            .get_result::<ShiftRow>(&mut conn)
            .optional()?;
        Ok(row.map(Shift::from))
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(shifts::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }
}
