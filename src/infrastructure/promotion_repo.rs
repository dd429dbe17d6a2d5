use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::PromotionRepository;
use crate::domain::promotion::{NewPromotion, Promotion, PromotionUpdate};
use crate::schema::promotions;

use super::models::{NewPromotionRow, PromotionChangeset, PromotionRow};

pub struct DieselPromotionRepository {
    pool: DbPool,
}

impl DieselPromotionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl PromotionRepository for DieselPromotionRepository {
    fn create(&self, promotion: NewPromotion) -> Result<Promotion, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(promotions::table)
            .values(&NewPromotionRow {
                id: Uuid::new_v4(),
                code: promotion.code,
                description: promotion.description,
                discount_percent: promotion.discount_percent,
                product_id: promotion.product_id,
                starts_at: promotion.starts_at,
                ends_at: promotion.ends_at,
            })
            .returning(PromotionRow::as_returning())
            .get_result::<PromotionRow>(&mut conn)?;
        Ok(row.into())
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Promotion>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = promotions::table
            .find(id)
            .select(PromotionRow::as_select())
            .first::<PromotionRow>(&mut conn)
            .optional()?;
        Ok(row.map(Promotion::from))
    }

    fn find_by_code(&self, code: &str) -> Result<Option<Promotion>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = promotions::table
            .filter(promotions::code.eq(code))
            .select(PromotionRow::as_select())
            .first::<PromotionRow>(&mut conn)
            .optional()?;
        Ok(row.map(Promotion::from))
    }

    fn list(&self, active_only: bool) -> Result<Vec<Promotion>, DomainError> {
        let mut conn = self.pool.get()?;
        let mut query = promotions::table
            .select(PromotionRow::as_select())
            .into_boxed();
        if active_only {
            query = query.filter(promotions::active.eq(true));
        }
        let rows = query
            .order(promotions::starts_at.desc())
            .load::<PromotionRow>(&mut conn)?;
        Ok(rows.into_iter().map(Promotion::from).collect())
    }

    fn update(
        &self,
        id: Uuid,
        changes: PromotionUpdate,
    ) -> Result<Option<Promotion>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::update(promotions::table.find(id))
            .set(&PromotionChangeset::from(changes))
            .returning(PromotionRow::as_returning())
            .get_result::<PromotionRow>(&mut conn)
            .optional()?;
        Ok(row.map(Promotion::from))
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(promotions::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }
}
