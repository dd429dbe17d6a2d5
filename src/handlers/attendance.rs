use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{blocking, timestamp};
use crate::auth::CurrentUser;
use crate::domain::attendance::{Attendance, AttendanceFilter};
use crate::domain::user::Role;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct AttendanceResponse {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub shift_id: Option<Uuid>,
    pub check_in: String,
    pub check_out: Option<String>,
    pub late: bool,
    pub worked_minutes: Option<i64>,
}

impl From<Attendance> for AttendanceResponse {
    fn from(a: Attendance) -> Self {
        AttendanceResponse {
            worked_minutes: a.worked_minutes(),
            id: a.id,
            employee_id: a.employee_id,
            shift_id: a.shift_id,
            check_in: timestamp(a.check_in),
            check_out: a.check_out.map(timestamp),
            late: a.late,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AttendanceSummaryResponse {
    pub employee_id: Uuid,
    pub worked_minutes: i64,
    pub late_count: usize,
    pub records: Vec<AttendanceResponse>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListAttendanceParams {
    pub employee_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SummaryParams {
    /// Admin only; everyone else gets their own summary.
    pub employee_id: Option<Uuid>,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/attendance")
            .route("", web::get().to(list_attendance))
            .route("/check-in", web::post().to(check_in))
            .route("/check-out", web::post().to(check_out))
            .route("/summary", web::get().to(summary)),
    );
}

/// Admins may look at anyone; employees are pinned to themselves.
fn scoped_employee(user: &CurrentUser, requested: Option<Uuid>) -> Option<Uuid> {
    if user.role == Role::Admin {
        requested
    } else {
        Some(user.id)
    }
}

/// POST /attendance/check-in
#[utoipa::path(
    post,
    path = "/attendance/check-in",
    responses(
        (status = 201, description = "Checked in", body = AttendanceResponse),
        (status = 403, description = "Staff only"),
        (status = 409, description = "Already checked in"),
    ),
    tag = "attendance"
)]
pub async fn check_in(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    user.require_staff()?;
    let record = blocking(move || state.attendance.check_in(user.id, Utc::now())).await?;
    Ok(HttpResponse::Created().json(AttendanceResponse::from(record)))
}

/// POST /attendance/check-out
#[utoipa::path(
    post,
    path = "/attendance/check-out",
    responses(
        (status = 200, description = "Checked out", body = AttendanceResponse),
        (status = 403, description = "Staff only"),
        (status = 404, description = "No open attendance record"),
    ),
    tag = "attendance"
)]
pub async fn check_out(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    user.require_staff()?;
    let record = blocking(move || state.attendance.check_out(user.id, Utc::now())).await?;
    Ok(HttpResponse::Ok().json(AttendanceResponse::from(record)))
}

/// GET /attendance
#[utoipa::path(
    get,
    path = "/attendance",
    params(
        ("employee_id" = Option<Uuid>, Query, description = "Admin only: one employee"),
        ("from" = Option<String>, Query, description = "Check-ins at or after"),
        ("to" = Option<String>, Query, description = "Check-ins before"),
    ),
    responses((status = 200, description = "Attendance records", body = [AttendanceResponse])),
    tag = "attendance"
)]
pub async fn list_attendance(
    state: web::Data<AppState>,
    user: CurrentUser,
    query: web::Query<ListAttendanceParams>,
) -> Result<HttpResponse, AppError> {
    user.require_staff()?;
    let params = query.into_inner();
    let filter = AttendanceFilter {
        employee_id: scoped_employee(&user, params.employee_id),
        from: params.from,
        to: params.to,
    };
    let records = blocking(move || state.attendance.list(filter)).await?;
    let body: Vec<AttendanceResponse> = records.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /attendance/summary
#[utoipa::path(
    get,
    path = "/attendance/summary",
    params(
        ("employee_id" = Option<Uuid>, Query, description = "Admin only: one employee"),
        ("from" = String, Query, description = "Period start (RFC 3339)"),
        ("to" = String, Query, description = "Period end (RFC 3339)"),
    ),
    responses(
        (status = 200, description = "Worked minutes and lateness", body = AttendanceSummaryResponse),
        (status = 400, description = "'to' is not after 'from'"),
    ),
    tag = "attendance"
)]
pub async fn summary(
    state: web::Data<AppState>,
    user: CurrentUser,
    query: web::Query<SummaryParams>,
) -> Result<HttpResponse, AppError> {
    user.require_staff()?;
    let params = query.into_inner();
    let employee_id = scoped_employee(&user, params.employee_id).unwrap_or(user.id);
    let summary =
        blocking(move || state.attendance.summary(employee_id, params.from, params.to)).await?;
    Ok(HttpResponse::Ok().json(AttendanceSummaryResponse {
        employee_id: summary.employee_id,
        worked_minutes: summary.worked_minutes,
        late_count: summary.late_count,
        records: summary.records.into_iter().map(Into::into).collect(),
    }))
}
