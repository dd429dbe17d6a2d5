use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{blocking, parse_enum};
use crate::auth::CurrentUser;
use crate::domain::order::{OrderFilter, OrderStatus};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrdersReportParams {
    pub status: Option<String>,
    pub site_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct InventoryReportParams {
    pub site_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AttendanceReportParams {
    pub employee_id: Option<Uuid>,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/reports")
            .route("/orders.csv", web::get().to(orders_report))
            .route("/inventory.csv", web::get().to(inventory_report))
            .route("/attendance.csv", web::get().to(attendance_report)),
    );
}

fn csv_response(filename: &str, body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(filename.to_string())],
        })
        .body(body)
}

/// GET /reports/orders.csv
#[utoipa::path(
    get,
    path = "/reports/orders.csv",
    params(
        ("status" = Option<String>, Query, description = "Only orders in this status"),
        ("site_id" = Option<Uuid>, Query, description = "Only orders for this site"),
        ("client_id" = Option<Uuid>, Query, description = "Only this client's orders"),
    ),
    responses(
        (status = 200, description = "Orders as CSV", content_type = "text/csv", body = String),
        (status = 403, description = "Administrators only"),
    ),
    tag = "reports"
)]
pub async fn orders_report(
    state: web::Data<AppState>,
    user: CurrentUser,
    query: web::Query<OrdersReportParams>,
) -> Result<HttpResponse, AppError> {
    user.require_admin()?;
    let params = query.into_inner();
    let filter = OrderFilter {
        client_id: params.client_id,
        site_id: params.site_id,
        status: params
            .status
            .as_deref()
            .map(parse_enum::<OrderStatus>)
            .transpose()?,
        ..OrderFilter::default()
    };
    let body = blocking(move || state.reports.orders_csv(filter)).await?;
    Ok(csv_response("orders.csv", body))
}

/// GET /reports/inventory.csv
#[utoipa::path(
    get,
    path = "/reports/inventory.csv",
    params(("site_id" = Uuid, Query, description = "Site to export")),
    responses(
        (status = 200, description = "Site stock as CSV", content_type = "text/csv", body = String),
        (status = 403, description = "Administrators only"),
        (status = 404, description = "Site not found"),
    ),
    tag = "reports"
)]
pub async fn inventory_report(
    state: web::Data<AppState>,
    user: CurrentUser,
    query: web::Query<InventoryReportParams>,
) -> Result<HttpResponse, AppError> {
    user.require_admin()?;
    let site_id = query.site_id;
    let body = blocking(move || state.reports.inventory_csv(site_id)).await?;
    Ok(csv_response("inventory.csv", body))
}

/// GET /reports/attendance.csv
#[utoipa::path(
    get,
    path = "/reports/attendance.csv",
    params(
        ("employee_id" = Option<Uuid>, Query, description = "Only this employee"),
        ("from" = String, Query, description = "Period start (RFC 3339)"),
        ("to" = String, Query, description = "Period end (RFC 3339)"),
    ),
    responses(
        (status = 200, description = "Attendance as CSV", content_type = "text/csv", body = String),
        (status = 400, description = "'to' is not after 'from'"),
        (status = 403, description = "Administrators only"),
    ),
    tag = "reports"
)]
pub async fn attendance_report(
    state: web::Data<AppState>,
    user: CurrentUser,
    query: web::Query<AttendanceReportParams>,
) -> Result<HttpResponse, AppError> {
    user.require_admin()?;
    let params = query.into_inner();
    let body = blocking(move || {
        state
            .reports
            .attendance_csv(params.employee_id, params.from, params.to)
    })
    .await?;
    Ok(csv_response("attendance.csv", body))
}
