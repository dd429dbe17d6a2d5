use std::env;

use thiserror::Error;

const MIN_SECRET_LEN: usize = 16;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} must be a valid number, got '{value}'")]
    NotANumber { name: &'static str, value: String },
    #[error("JWT_SECRET must be at least {MIN_SECRET_LEN} bytes long")]
    WeakSecret,
}

/// Runtime settings, read from the environment (and `.env` via dotenvy).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
    pub db_pool_size: u32,
    /// Initial administrator, created at startup when no admin exists yet.
    pub bootstrap_admin: Option<AdminSeed>,
}

#[derive(Clone)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for AdminSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSeed")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| lookup(name).ok_or(ConfigError::Missing(name));

        let jwt_secret = required("JWT_SECRET")?;
        if jwt_secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::WeakSecret);
        }

        Ok(Config {
            database_url: required("DATABASE_URL")?,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parsed(&lookup, "PORT", 8080)?,
            jwt_secret,
            token_ttl_secs: parsed(&lookup, "TOKEN_TTL_SECS", 8 * 60 * 60)?,
            db_pool_size: parsed(&lookup, "DB_POOL_SIZE", 10)?,
            bootstrap_admin: match (lookup("ADMIN_EMAIL"), lookup("ADMIN_PASSWORD")) {
                (Some(email), Some(password)) => Some(AdminSeed { email, password }),
                _ => None,
            },
        })
    }
}

fn parsed<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::NotANumber { name, value }),
        None => Ok(default),
    }
}
