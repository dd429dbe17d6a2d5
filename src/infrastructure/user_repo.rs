use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::UserRepository;
use crate::domain::user::{NewUser, Role, User};
use crate::schema::users;

use super::models::{NewUserRow, UserRow};

pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl UserRepository for DieselUserRepository {
    fn create(&self, user: NewUser) -> Result<User, DomainError> {
        let mut conn = self.pool.get()?;
        diesel::insert_into(users::table)
            .values(&NewUserRow {
                id: Uuid::new_v4(),
                email: user.email,
                full_name: user.full_name,
                phone: user.phone,
                role: user.role.as_str().to_string(),
                password_hash: user.password_hash,
            })
            .returning(UserRow::as_returning())
            .get_result::<UserRow>(&mut conn)?
            .try_into()
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        let mut conn = self.pool.get()?;
        users::table
            .find(id)
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .optional()?
            .map(User::try_from)
            .transpose()
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let mut conn = self.pool.get()?;
        users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .optional()?
            .map(User::try_from)
            .transpose()
    }

    fn list(&self, role: Option<Role>) -> Result<Vec<User>, DomainError> {
        let mut conn = self.pool.get()?;
        let mut query = users::table.select(UserRow::as_select()).into_boxed();
        if let Some(role) = role {
            query = query.filter(users::role.eq(role.as_str()));
        }
        query
            .order(users::full_name.asc())
            .load::<UserRow>(&mut conn)?
            .into_iter()
            .map(User::try_from)
            .collect()
    }

    fn update_role(&self, id: Uuid, role: Role) -> Result<Option<User>, DomainError> {
        let mut conn = self.pool.get()?;
        diesel::update(users::table.find(id))
            .set(users::role.eq(role.as_str()))
            .returning(UserRow::as_returning())
            .get_result::<UserRow>(&mut conn)
            .optional()?
            .map(User::try_from)
            .transpose()
    }

    fn set_active(&self, id: Uuid, active: bool) -> Result<Option<User>, DomainError> {
        let mut conn = self.pool.get()?;
        diesel::update(users::table.find(id))
            .set(users::active.eq(active))
            .returning(UserRow::as_returning())
            .get_result::<UserRow>(&mut conn)
            .optional()?
            .map(User::try_from)
            .transpose()
    }
}
