use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{blocking, timestamp};
use crate::auth::CurrentUser;
use crate::domain::shift::{NewShift, Shift, ShiftFilter};
use crate::domain::user::Role;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct ShiftResponse {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub site_id: Uuid,
    pub starts_at: String,
    pub ends_at: String,
    pub notes: Option<String>,
    pub created_at: String,
}

impl From<Shift> for ShiftResponse {
    fn from(s: Shift) -> Self {
        ShiftResponse {
            id: s.id,
            employee_id: s.employee_id,
            site_id: s.site_id,
            starts_at: timestamp(s.starts_at),
            ends_at: timestamp(s.ends_at),
            notes: s.notes,
            created_at: timestamp(s.created_at),
        }
    }
}

/// Body for both creating and rescheduling a shift.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ShiftRequest {
    pub employee_id: Uuid,
    pub site_id: Uuid,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub notes: Option<String>,
}

impl From<ShiftRequest> for NewShift {
    fn from(r: ShiftRequest) -> Self {
        NewShift {
            employee_id: r.employee_id,
            site_id: r.site_id,
            starts_at: r.starts_at,
            ends_at: r.ends_at,
            notes: r.notes,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListShiftsParams {
    pub employee_id: Option<Uuid>,
    pub site_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/shifts")
            .route("", web::get().to(list_shifts))
            .route("", web::post().to(create_shift))
            .route("/{id}", web::put().to(update_shift))
            .route("/{id}", web::delete().to(delete_shift)),
    );
}

/// GET /shifts
///
/// Employees only ever see their own rota.
#[utoipa::path(
    get,
    path = "/shifts",
    params(
        ("employee_id" = Option<Uuid>, Query, description = "Admin only: one employee's shifts"),
        ("site_id" = Option<Uuid>, Query, description = "Only shifts at this site"),
        ("from" = Option<String>, Query, description = "Shifts ending after this instant"),
        ("to" = Option<String>, Query, description = "Shifts starting before this instant"),
    ),
    responses(
        (status = 200, description = "Shifts ordered by start", body = [ShiftResponse]),
        (status = 403, description = "Staff only"),
    ),
    tag = "shifts"
)]
pub async fn list_shifts(
    state: web::Data<AppState>,
    user: CurrentUser,
    query: web::Query<ListShiftsParams>,
) -> Result<HttpResponse, AppError> {
    user.require_staff()?;
    let params = query.into_inner();
    let filter = ShiftFilter {
        employee_id: if user.role == Role::Admin {
            params.employee_id
        } else {
            Some(user.id)
        },
        site_id: params.site_id,
        from: params.from,
        to: params.to,
    };

    let shifts = blocking(move || state.shifts.list(filter)).await?;
    let body: Vec<ShiftResponse> = shifts.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// POST /shifts
#[utoipa::path(
    post,
    path = "/shifts",
    request_body = ShiftRequest,
    responses(
        (status = 201, description = "Shift scheduled", body = ShiftResponse),
        (status = 400, description = "Invalid window or employee"),
        (status = 404, description = "Employee or site not found"),
        (status = 409, description = "Overlaps another shift"),
    ),
    tag = "shifts"
)]
pub async fn create_shift(
    state: web::Data<AppState>,
    user: CurrentUser,
    body: web::Json<ShiftRequest>,
) -> Result<HttpResponse, AppError> {
    user.require_admin()?;
    let input = NewShift::from(body.into_inner());
    let shift = blocking(move || state.shifts.create(input)).await?;
    Ok(HttpResponse::Created().json(ShiftResponse::from(shift)))
}

/// PUT /shifts/{id}
#[utoipa::path(
    put,
    path = "/shifts/{id}",
    params(("id" = Uuid, Path, description = "Shift UUID")),
    request_body = ShiftRequest,
    responses(
        (status = 200, description = "Shift rescheduled", body = ShiftResponse),
        (status = 400, description = "Invalid window or employee"),
        (status = 404, description = "Shift not found"),
        (status = 409, description = "Overlaps another shift"),
    ),
    tag = "shifts"
)]
pub async fn update_shift(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<Uuid>,
    body: web::Json<ShiftRequest>,
) -> Result<HttpResponse, AppError> {
    user.require_admin()?;
    let id = path.into_inner();
    let input = NewShift::from(body.into_inner());
    let shift = blocking(move || state.shifts.update(id, input)).await?;
    Ok(HttpResponse::Ok().json(ShiftResponse::from(shift)))
}

/// DELETE /shifts/{id}
#[utoipa::path(
    delete,
    path = "/shifts/{id}",
    params(("id" = Uuid, Path, description = "Shift UUID")),
    responses(
        (status = 204, description = "Shift removed"),
        (status = 404, description = "Shift not found"),
    ),
    tag = "shifts"
)]
pub async fn delete_shift(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    user.require_admin()?;
    let id = path.into_inner();
    blocking(move || state.shifts.delete(id)).await?;
    Ok(HttpResponse::NoContent().finish())
}
