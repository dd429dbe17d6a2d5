use std::sync::Arc;

use uuid::Uuid;

use crate::auth::jwt::JwtManager;
use crate::auth::password::{hash_password, verify_password};
use crate::domain::errors::DomainError;
use crate::domain::ports::UserRepository;
use crate::domain::user::{NewUser, Role, User};
use crate::domain::validation::{normalize_email, optional_text, required_text};

#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub expires_in: i64,
    pub user: User,
}

#[derive(Clone)]
pub struct UserManager {
    users: Arc<dyn UserRepository>,
    jwt: Arc<JwtManager>,
}

impl UserManager {
    pub fn new(users: Arc<dyn UserRepository>, jwt: Arc<JwtManager>) -> Self {
        Self { users, jwt }
    }

    /// Self-service sign-up; always creates a client.
    pub fn register(&self, input: Registration) -> Result<User, DomainError> {
        self.create_with_role(input, Role::Client)
    }

    /// Accounts created by an administrator, for any role.
    pub fn create_staff(&self, input: Registration, role: Role) -> Result<User, DomainError> {
        self.create_with_role(input, role)
    }

    /// Creates the first administrator. Does nothing once any admin exists.
    pub fn ensure_admin(&self, email: &str, password: &str) -> Result<Option<User>, DomainError> {
        if !self.users.list(Some(Role::Admin))?.is_empty() {
            return Ok(None);
        }
        let admin = self.create_with_role(
            Registration {
                email: email.to_string(),
                password: password.to_string(),
                full_name: "Administrator".to_string(),
                phone: None,
            },
            Role::Admin,
        )?;
        log::warn!("Created initial administrator {}", admin.email);
        Ok(Some(admin))
    }

    fn create_with_role(&self, input: Registration, role: Role) -> Result<User, DomainError> {
        let email = normalize_email(&input.email)?;
        let full_name = required_text("full_name", &input.full_name, 255)?;
        if self.users.find_by_email(&email)?.is_some() {
            return Err(DomainError::Conflict(format!("{email} is already registered")));
        }
        let password_hash = hash_password(&input.password)?;

        let user = self.users.create(NewUser {
            email,
            full_name,
            phone: optional_text(input.phone),
            role,
            password_hash,
        })?;
        log::info!("Registered {} user {}", user.role, user.id);
        Ok(user)
    }

    pub fn login(&self, email: &str, password: &str) -> Result<AuthSession, DomainError> {
        let invalid = || DomainError::Unauthorized("invalid credentials".to_string());
        let email = normalize_email(email).map_err(|_| invalid())?;
        let user = self.users.find_by_email(&email)?.ok_or_else(invalid)?;
        if !verify_password(password, &user.password_hash) {
            return Err(invalid());
        }
        if !user.active {
            return Err(DomainError::Unauthorized("account is disabled".to_string()));
        }

        Ok(AuthSession {
            token: self.jwt.issue(&user)?,
            expires_in: self.jwt.lifetime_secs(),
            user,
        })
    }

    pub fn get(&self, id: Uuid) -> Result<User, DomainError> {
        self.users.find_by_id(id)?.ok_or(DomainError::NotFound("User"))
    }

    pub fn list(&self, role: Option<Role>) -> Result<Vec<User>, DomainError> {
        self.users.list(role)
    }

    pub fn change_role(&self, acting_admin: Uuid, id: Uuid, role: Role) -> Result<User, DomainError> {
        if acting_admin == id && role != Role::Admin {
            return Err(DomainError::Forbidden(
                "administrators cannot demote themselves".to_string(),
            ));
        }
        self.users
            .update_role(id, role)?
            .ok_or(DomainError::NotFound("User"))
    }

    pub fn set_active(&self, acting_admin: Uuid, id: Uuid, active: bool) -> Result<User, DomainError> {
        if acting_admin == id && !active {
            return Err(DomainError::Forbidden(
                "administrators cannot deactivate themselves".to_string(),
            ));
        }
        self.users
            .set_active(id, active)?
            .ok_or(DomainError::NotFound("User"))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::application::testing::MemoryDb;

    fn manager(db: &Arc<MemoryDb>) -> UserManager {
        UserManager::new(
            db.clone(),
            Arc::new(JwtManager::new("unit-test-secret-123", 3600)),
        )
    }

    fn registration(email: &str) -> Registration {
        Registration {
            email: email.to_string(),
            password: "pan-de-masa-madre".to_string(),
            full_name: "Lucia Flores".to_string(),
            phone: Some("  ".to_string()),
        }
    }

    #[test]
    fn register_creates_a_client_with_normalized_email() {
        let db = MemoryDb::new();
        let user = manager(&db).register(registration("Lucia@Bakery.com")).unwrap();

        assert_eq!(user.role, Role::Client);
        assert_eq!(user.email, "lucia@bakery.com");
        assert_eq!(user.phone, None);
        assert_ne!(user.password_hash, "pan-de-masa-madre");
    }

    #[test]
    fn duplicate_email_is_a_conflict() {
        let db = MemoryDb::new();
        let manager = manager(&db);
        manager.register(registration("lucia@bakery.com")).unwrap();

        let err = manager
            .register(registration("LUCIA@bakery.com"))
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn login_issues_a_token_for_the_user() {
        let db = MemoryDb::new();
        let manager = manager(&db);
        let user = manager.register(registration("lucia@bakery.com")).unwrap();

        let session = manager.login("lucia@bakery.com", "pan-de-masa-madre").unwrap();
        assert_eq!(session.user.id, user.id);
        assert_eq!(session.expires_in, 3600);
        assert!(!session.token.is_empty());
    }

    #[test]
    fn login_rejects_bad_password_and_disabled_accounts() {
        let db = MemoryDb::new();
        let manager = manager(&db);
        let admin = db.seed_user(Role::Admin);
        let user = manager.register(registration("lucia@bakery.com")).unwrap();

        assert!(matches!(
            manager.login("lucia@bakery.com", "wrong-password"),
            Err(DomainError::Unauthorized(_))
        ));
        assert!(matches!(
            manager.login("nobody@bakery.com", "pan-de-masa-madre"),
            Err(DomainError::Unauthorized(_))
        ));

        manager.set_active(admin.id, user.id, false).unwrap();
        assert!(matches!(
            manager.login("lucia@bakery.com", "pan-de-masa-madre"),
            Err(DomainError::Unauthorized(_))
        ));
    }

    #[test]
    fn initial_admin_is_created_once() {
        let db = MemoryDb::new();
        let manager = manager(&db);

        let admin = manager
            .ensure_admin("jefe@bakery.com", "horno-caliente")
            .unwrap()
            .unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert!(manager
            .ensure_admin("otro@bakery.com", "horno-caliente")
            .unwrap()
            .is_none());
        assert_eq!(manager.list(Some(Role::Admin)).unwrap().len(), 1);
    }

    #[test]
    fn admins_cannot_lock_themselves_out() {
        let db = MemoryDb::new();
        let manager = manager(&db);
        let admin = db.seed_user(Role::Admin);

        assert!(matches!(
            manager.change_role(admin.id, admin.id, Role::Employee),
            Err(DomainError::Forbidden(_))
        ));
        assert!(matches!(
            manager.set_active(admin.id, admin.id, false),
            Err(DomainError::Forbidden(_))
        ));
    }

    #[test]
    fn staff_accounts_get_the_requested_role() {
        let db = MemoryDb::new();
        let user = manager(&db)
            .create_staff(registration("baker@bakery.com"), Role::Employee)
            .unwrap();
        assert_eq!(user.role, Role::Employee);
    }
}
