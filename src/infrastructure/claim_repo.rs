use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::claim::{Claim, ClaimFilter, ClaimStatus, NewClaim};
use crate::domain::errors::DomainError;
use crate::domain::ports::ClaimRepository;
use crate::schema::claims;

use super::models::{ClaimRow, NewClaimRow};

pub struct DieselClaimRepository {
    pool: DbPool,
}

impl DieselClaimRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl ClaimRepository for DieselClaimRepository {
    fn create(&self, claim: NewClaim) -> Result<Claim, DomainError> {
        let mut conn = self.pool.get()?;
        diesel::insert_into(claims::table)
            .values(&NewClaimRow {
                id: Uuid::new_v4(),
                client_id: claim.client_id,
                order_id: claim.order_id,
                subject: claim.subject,
                description: claim.description,
                status: ClaimStatus::Open.as_str().to_string(),
            })
            .returning(ClaimRow::as_returning())
            .get_result::<ClaimRow>(&mut conn)?
            .try_into()
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Claim>, DomainError> {
        let mut conn = self.pool.get()?;
        claims::table
            .find(id)
            .select(ClaimRow::as_select())
            .first::<ClaimRow>(&mut conn)
            .optional()?
            .map(Claim::try_from)
            .transpose()
    }

    fn list(&self, filter: &ClaimFilter) -> Result<Vec<Claim>, DomainError> {
        let mut conn = self.pool.get()?;
        let mut query = claims::table.select(ClaimRow::as_select()).into_boxed();
        if let Some(client_id) = filter.client_id {
            query = query.filter(claims::client_id.eq(client_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(claims::status.eq(status.as_str()));
        }
        query
            .order(claims::created_at.desc())
            .load::<ClaimRow>(&mut conn)?
            .into_iter()
            .map(Claim::try_from)
            .collect()
    }

    fn update_status(
        &self,
        id: Uuid,
        status: ClaimStatus,
        response: Option<String>,
    ) -> Result<Option<Claim>, DomainError> {
        let mut conn = self.pool.get()?;
        let target = claims::table.find(id);
        let now = Utc::now();
        let row = match response {
            Some(response) => diesel::update(target)
                .set((
                    claims::status.eq(status.as_str()),
                    claims::response.eq(Some(response)),
                    claims::updated_at.eq(now),
                ))
                .returning(ClaimRow::as_returning())
                .get_result::<ClaimRow>(&mut conn),
            None => diesel::update(target)
                .set((
                    claims::status.eq(status.as_str()),
                    claims::updated_at.eq(now),
                ))
                .returning(ClaimRow::as_returning())
                .get_result::<ClaimRow>(&mut conn),
        };
        row.optional()?.map(Claim::try_from).transpose()
    }
}
