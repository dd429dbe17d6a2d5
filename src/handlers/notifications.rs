use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{blocking, parse_enum, timestamp};
use crate::auth::CurrentUser;
use crate::domain::notification::{Notification, NotificationKind};
use crate::domain::user::Role;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct NotificationResponse {
    pub id: Uuid,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub created_at: String,
}

impl From<Notification> for NotificationResponse {
    fn from(n: Notification) -> Self {
        NotificationResponse {
            id: n.id,
            kind: n.kind.to_string(),
            title: n.title,
            message: n.message,
            read: n.read,
            created_at: timestamp(n.created_at),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListNotificationsParams {
    #[serde(default)]
    pub unread_only: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BroadcastRequest {
    /// Roles to reach: client, employee and/or admin.
    pub roles: Vec<String>,
    /// Defaults to "general".
    pub kind: Option<String>,
    pub title: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CountResponse {
    pub count: usize,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/notifications")
            .route("", web::get().to(list_notifications))
            .route("/read-all", web::post().to(mark_all_read))
            .route("/broadcast", web::post().to(broadcast))
            .route("/{id}/read", web::post().to(mark_read)),
    );
}

/// GET /notifications
#[utoipa::path(
    get,
    path = "/notifications",
    params(("unread_only" = Option<bool>, Query, description = "Hide notifications already read")),
    responses((status = 200, description = "Caller's notifications, newest first", body = [NotificationResponse])),
    tag = "notifications"
)]
pub async fn list_notifications(
    state: web::Data<AppState>,
    user: CurrentUser,
    query: web::Query<ListNotificationsParams>,
) -> Result<HttpResponse, AppError> {
    let unread_only = query.unread_only;
    let notifications =
        blocking(move || state.notifications.list_for_user(user.id, unread_only)).await?;
    let body: Vec<NotificationResponse> = notifications.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// POST /notifications/{id}/read
#[utoipa::path(
    post,
    path = "/notifications/{id}/read",
    params(("id" = Uuid, Path, description = "Notification UUID")),
    responses(
        (status = 204, description = "Marked as read"),
        (status = 404, description = "No such notification for this user"),
    ),
    tag = "notifications"
)]
pub async fn mark_read(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    blocking(move || state.notifications.mark_read(id, user.id)).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /notifications/read-all
#[utoipa::path(
    post,
    path = "/notifications/read-all",
    responses((status = 200, description = "Number of notifications marked", body = CountResponse)),
    tag = "notifications"
)]
pub async fn mark_all_read(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    let count = blocking(move || state.notifications.mark_all_read(user.id)).await?;
    Ok(HttpResponse::Ok().json(CountResponse { count }))
}

/// POST /notifications/broadcast
#[utoipa::path(
    post,
    path = "/notifications/broadcast",
    request_body = BroadcastRequest,
    responses(
        (status = 200, description = "Number of users notified", body = CountResponse),
        (status = 400, description = "Unknown role or kind, or empty title"),
        (status = 403, description = "Administrators only"),
    ),
    tag = "notifications"
)]
pub async fn broadcast(
    state: web::Data<AppState>,
    user: CurrentUser,
    body: web::Json<BroadcastRequest>,
) -> Result<HttpResponse, AppError> {
    user.require_admin()?;
    let body = body.into_inner();
    if body.roles.is_empty() {
        return Err(AppError::BadRequest("at least one role is required".to_string()));
    }
    let roles = body
        .roles
        .iter()
        .map(|r| parse_enum::<Role>(r))
        .collect::<Result<Vec<_>, _>>()?;
    let kind = match body.kind.as_deref() {
        Some(kind) => parse_enum::<NotificationKind>(kind)?,
        None => NotificationKind::General,
    };

    let sent = blocking(move || {
        state
            .notifications
            .notify_roles(&roles, kind, &body.title, &body.message)
    })
    .await?;
    log::info!("{} broadcast reached {} users", kind, sent.len());
    Ok(HttpResponse::Ok().json(CountResponse { count: sent.len() }))
}
