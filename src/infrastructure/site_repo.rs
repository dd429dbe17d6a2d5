use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::SiteRepository;
use crate::domain::site::{NewSite, Site, SiteUpdate};
use crate::schema::sites;

use super::models::{NewSiteRow, SiteChangeset, SiteRow};

pub struct DieselSiteRepository {
    pool: DbPool,
}

impl DieselSiteRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl SiteRepository for DieselSiteRepository {
    fn create(&self, site: NewSite) -> Result<Site, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(sites::table)
            .values(&NewSiteRow {
                id: Uuid::new_v4(),
                name: site.name,
                address: site.address,
            })
            .returning(SiteRow::as_returning())
            .get_result::<SiteRow>(&mut conn)?;
        Ok(row.into())
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Site>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = sites::table
            .find(id)
            .select(SiteRow::as_select())
            .first::<SiteRow>(&mut conn)
            .optional()?;
        Ok(row.map(Site::from))
    }

    fn list(&self, active_only: bool) -> Result<Vec<Site>, DomainError> {
        let mut conn = self.pool.get()?;
        let mut query = sites::table.select(SiteRow::as_select()).into_boxed();
        if active_only {
            query = query.filter(sites::active.eq(true));
        }
        let rows = query.order(sites::name.asc()).load::<SiteRow>(&mut conn)?;
        Ok(rows.into_iter().map(Site::from).collect())
    }

    fn update(&self, id: Uuid, changes: SiteUpdate) -> Result<Option<Site>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::update(sites::table.find(id))
            .set(&SiteChangeset::from(changes))
            .returning(SiteRow::as_returning())
            .get_result::<SiteRow>(&mut conn)
            .optional()?;
        Ok(row.map(Site::from))
    }
}
