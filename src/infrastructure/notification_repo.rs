use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::notification::{NewNotification, Notification};
use crate::domain::ports::NotificationRepository;
use crate::schema::notifications;

use super::models::{NewNotificationRow, NotificationRow};

pub struct DieselNotificationRepository {
    pool: DbPool,
}

impl DieselNotificationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl NotificationRepository for DieselNotificationRepository {
    fn create_many(&self, items: Vec<NewNotification>) -> Result<Vec<Notification>, DomainError> {
        if items.is_empty() {
            return Ok(vec![]);
        }
        let mut conn = self.pool.get()?;
        let rows: Vec<NewNotificationRow> = items
            .into_iter()
            .map(|n| NewNotificationRow {
                id: Uuid::new_v4(),
                user_id: n.user_id,
                kind: n.kind.as_str().to_string(),
                title: n.title,
                message: n.message,
            })
            .collect();
        diesel::insert_into(notifications::table)
            .values(&rows)
            .returning(NotificationRow::as_returning())
            .get_results::<NotificationRow>(&mut conn)?
            .into_iter()
            .map(Notification::try_from)
            .collect()
    }

    fn list_for_user(
        &self,
        user_id: Uuid,
        unread_only: bool,
    ) -> Result<Vec<Notification>, DomainError> {
        let mut conn = self.pool.get()?;
        let mut query = notifications::table
            .filter(notifications::user_id.eq(user_id))
            .select(NotificationRow::as_select())
            .into_boxed();
        if unread_only {
            query = query.filter(notifications::read.eq(false));
        }
        query
            .order(notifications::created_at.desc())
            .load::<NotificationRow>(&mut conn)?
            .into_iter()
            .map(Notification::try_from)
            .collect()
    }

    fn mark_read(&self, id: Uuid, user_id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let updated = diesel::update(
            notifications::table
                .filter(notifications::id.eq(id))
                .filter(notifications::user_id.eq(user_id)),
        )
        .set(notifications::read.eq(true))
        .execute(&mut conn)?;
        Ok(updated > 0)
    }

    fn mark_all_read(&self, user_id: Uuid) -> Result<usize, DomainError> {
        let mut conn = self.pool.get()?;
        let updated = diesel::update(
            notifications::table
                .filter(notifications::user_id.eq(user_id))
                .filter(notifications::read.eq(false)),
        )
        .set(notifications::read.eq(true))
        .execute(&mut conn)?;
        Ok(updated)
    }
}
