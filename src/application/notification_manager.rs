use std::sync::Arc;

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::notification::{NewNotification, Notification, NotificationKind};
use crate::domain::ports::{NotificationRepository, UserRepository};
use crate::domain::user::Role;
use crate::domain::validation::required_text;

#[derive(Clone)]
pub struct NotificationManager {
    notifications: Arc<dyn NotificationRepository>,
    users: Arc<dyn UserRepository>,
}

impl NotificationManager {
    pub fn new(
        notifications: Arc<dyn NotificationRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            notifications,
            users,
        }
    }

    pub fn notify_user(
        &self,
        user_id: Uuid,
        kind: NotificationKind,
        title: &str,
        message: &str,
    ) -> Result<Notification, DomainError> {
        let title = required_text("title", title, 255)?;
        let mut created = self.notifications.create_many(vec![NewNotification {
            user_id,
            kind,
            title,
            message: message.to_string(),
        }])?;
        created
            .pop()
            .ok_or_else(|| DomainError::Internal("notification was not stored".to_string()))
    }

    /// Sends the same notification to every active user holding one of `roles`.
    pub fn notify_roles(
        &self,
        roles: &[Role],
        kind: NotificationKind,
        title: &str,
        message: &str,
    ) -> Result<Vec<Notification>, DomainError> {
        let title = required_text("title", title, 255)?;
        let mut recipients = Vec::new();
        for role in roles {
            recipients.extend(
                self.users
                    .list(Some(*role))?
                    .into_iter()
                    .filter(|u| u.active)
                    .map(|u| u.id),
            );
        }
        recipients.sort();
        recipients.dedup();

        let batch = recipients
            .into_iter()
            .map(|user_id| NewNotification {
                user_id,
                kind,
                title: title.clone(),
                message: message.to_string(),
            })
            .collect();
        self.notifications.create_many(batch)
    }

    /// Like [`Self::notify_user`], but a failure is only logged.
    pub fn try_notify_user(&self, user_id: Uuid, kind: NotificationKind, title: &str, message: &str) {
        if let Err(e) = self.notify_user(user_id, kind, title, message) {
            log::warn!("Could not notify user {}: {}", user_id, e);
        }
    }

    /// Like [`Self::notify_roles`], but a failure is only logged.
    pub fn try_notify_roles(&self, roles: &[Role], kind: NotificationKind, title: &str, message: &str) {
        if let Err(e) = self.notify_roles(roles, kind, title, message) {
            log::warn!("Could not notify {:?}: {}", roles, e);
        }
    }

    pub fn list_for_user(
        &self,
        user_id: Uuid,
        unread_only: bool,
    ) -> Result<Vec<Notification>, DomainError> {
        self.notifications.list_for_user(user_id, unread_only)
    }

    pub fn mark_read(&self, id: Uuid, user_id: Uuid) -> Result<(), DomainError> {
        if self.notifications.mark_read(id, user_id)? {
            Ok(())
        } else {
            Err(DomainError::NotFound("Notification"))
        }
    }

    pub fn mark_all_read(&self, user_id: Uuid) -> Result<usize, DomainError> {
        self.notifications.mark_all_read(user_id)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::application::testing::MemoryDb;

    fn manager(db: &Arc<MemoryDb>) -> NotificationManager {
        NotificationManager::new(db.clone(), db.clone())
    }

    #[test]
    fn fan_out_reaches_active_users_of_each_role_once() {
        let db = MemoryDb::new();
        let admin = db.seed_user(Role::Admin);
        let employee = db.seed_user(Role::Employee);
        let inactive = db.seed_user(Role::Employee);
        db.users
            .lock()
            .unwrap()
            .iter_mut()
            .find(|u| u.id == inactive.id)
            .unwrap()
            .active = false;
        let client = db.seed_user(Role::Client);

        let sent = manager(&db)
            .notify_roles(
                &[Role::Admin, Role::Employee, Role::Admin],
                NotificationKind::General,
                "Closing early",
                "The shop closes at 16:00 today",
            )
            .unwrap();

        assert_eq!(sent.len(), 2);
        assert_eq!(db.notifications_for(admin.id).len(), 1);
        assert_eq!(db.notifications_for(employee.id).len(), 1);
        assert!(db.notifications_for(inactive.id).is_empty());
        assert!(db.notifications_for(client.id).is_empty());
    }

    #[test]
    fn blank_title_is_rejected() {
        let db = MemoryDb::new();
        let user = db.seed_user(Role::Client);
        let err = manager(&db)
            .notify_user(user.id, NotificationKind::General, "  ", "body")
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn mark_read_is_scoped_to_the_owner() {
        let db = MemoryDb::new();
        let owner = db.seed_user(Role::Client);
        let other = db.seed_user(Role::Client);
        let manager = manager(&db);
        let n = manager
            .notify_user(owner.id, NotificationKind::Order, "Ready", "Your order is ready")
            .unwrap();

        assert!(matches!(
            manager.mark_read(n.id, other.id),
            Err(DomainError::NotFound(_))
        ));
        manager.mark_read(n.id, owner.id).unwrap();
        assert!(manager.list_for_user(owner.id, true).unwrap().is_empty());
    }

    #[test]
    fn mark_all_read_counts_only_unread() {
        let db = MemoryDb::new();
        let user = db.seed_user(Role::Client);
        let manager = manager(&db);
        for title in ["a", "b", "c"] {
            manager
                .notify_user(user.id, NotificationKind::General, title, "")
                .unwrap();
        }
        let first = manager.list_for_user(user.id, false).unwrap()[0].id;
        manager.mark_read(first, user.id).unwrap();

        assert_eq!(manager.mark_all_read(user.id).unwrap(), 2);
        assert_eq!(manager.mark_all_read(user.id).unwrap(), 0);
    }
}
