use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{blocking, parse_enum, timestamp};
use crate::application::user_manager::Registration;
use crate::auth::CurrentUser;
use crate::domain::user::{Role, User};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role: String,
    pub active: bool,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        UserResponse {
            id: u.id,
            email: u.email,
            full_name: u.full_name,
            phone: u.phone,
            role: u.role.to_string(),
            active: u.active,
            created_at: timestamp(u.created_at),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone: Option<String>,
    /// client, employee or admin
    pub role: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListUsersParams {
    pub role: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangeRoleRequest {
    pub role: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetActiveRequest {
    pub active: bool,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .route("", web::get().to(list_users))
            .route("", web::post().to(create_user))
            .route("/{id}/role", web::put().to(change_role))
            .route("/{id}/active", web::put().to(set_active)),
    );
}

/// GET /users
#[utoipa::path(
    get,
    path = "/users",
    params(("role" = Option<String>, Query, description = "Only users with this role")),
    responses(
        (status = 200, description = "Users", body = [UserResponse]),
        (status = 403, description = "Administrators only"),
    ),
    tag = "users"
)]
pub async fn list_users(
    state: web::Data<AppState>,
    user: CurrentUser,
    query: web::Query<ListUsersParams>,
) -> Result<HttpResponse, AppError> {
    user.require_admin()?;
    let role = query
        .into_inner()
        .role
        .as_deref()
        .map(parse_enum::<Role>)
        .transpose()?;

    let users = blocking(move || state.users.list(role)).await?;
    let body: Vec<UserResponse> = users.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// POST /users
///
/// Administrators create staff (or client) accounts directly.
#[utoipa::path(
    post,
    path = "/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email already registered"),
    ),
    tag = "users"
)]
pub async fn create_user(
    state: web::Data<AppState>,
    user: CurrentUser,
    body: web::Json<CreateUserRequest>,
) -> Result<HttpResponse, AppError> {
    user.require_admin()?;
    let body = body.into_inner();
    let role = parse_enum::<Role>(&body.role)?;
    let registration = Registration {
        email: body.email,
        password: body.password,
        full_name: body.full_name,
        phone: body.phone,
    };

    let created = blocking(move || state.users.create_staff(registration, role)).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(created)))
}

/// PUT /users/{id}/role
#[utoipa::path(
    put,
    path = "/users/{id}/role",
    params(("id" = Uuid, Path, description = "User UUID")),
    request_body = ChangeRoleRequest,
    responses(
        (status = 200, description = "Role changed", body = UserResponse),
        (status = 403, description = "Administrators only, and not on themselves"),
        (status = 404, description = "User not found"),
    ),
    tag = "users"
)]
pub async fn change_role(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<Uuid>,
    body: web::Json<ChangeRoleRequest>,
) -> Result<HttpResponse, AppError> {
    user.require_admin()?;
    let id = path.into_inner();
    let role = parse_enum::<Role>(&body.role)?;

    let updated = blocking(move || state.users.change_role(user.id, id, role)).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(updated)))
}

/// PUT /users/{id}/active
#[utoipa::path(
    put,
    path = "/users/{id}/active",
    params(("id" = Uuid, Path, description = "User UUID")),
    request_body = SetActiveRequest,
    responses(
        (status = 200, description = "Account updated", body = UserResponse),
        (status = 403, description = "Administrators only, and not on themselves"),
        (status = 404, description = "User not found"),
    ),
    tag = "users"
)]
pub async fn set_active(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<Uuid>,
    body: web::Json<SetActiveRequest>,
) -> Result<HttpResponse, AppError> {
    user.require_admin()?;
    let id = path.into_inner();
    let active = body.active;

    let updated = blocking(move || state.users.set_active(user.id, id, active)).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(updated)))
}
