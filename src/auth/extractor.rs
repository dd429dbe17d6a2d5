use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};
use uuid::Uuid;

use super::jwt::extract_bearer_token;
use crate::domain::errors::DomainError;
use crate::domain::user::Role;
use crate::errors::AppError;
use crate::state::AppState;

/// The caller behind a valid bearer token.
///
/// Use `Option<CurrentUser>` for routes that also serve anonymous callers.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

impl CurrentUser {
    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }

    pub fn require_staff(&self) -> Result<(), AppError> {
        if self.is_staff() {
            Ok(())
        } else {
            Err(DomainError::Forbidden("staff only".to_string()).into())
        }
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(DomainError::Forbidden("administrators only".to_string()).into())
        }
    }

    /// Staff may act on anyone's records, everyone else only on their own.
    pub fn require_self_or_staff(&self, owner: Uuid) -> Result<(), AppError> {
        if self.is_staff() || self.id == owner {
            Ok(())
        } else {
            Err(DomainError::Forbidden("not your record".to_string()).into())
        }
    }
}

fn authenticate(req: &HttpRequest) -> Result<CurrentUser, AppError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::Internal("application state is not configured".to_string()))?;

    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("missing authorization header".to_string()))?;
    let token = extract_bearer_token(header)
        .ok_or_else(|| AppError::Unauthorized("expected a bearer token".to_string()))?;

    let claims = state.jwt.validate(token)?;
    Ok(CurrentUser {
        id: claims.sub,
        role: claims.role()?,
        email: claims.email,
    })
}

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}
