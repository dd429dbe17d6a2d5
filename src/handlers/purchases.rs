use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{blocking, parse_enum, parse_money, timestamp};
use crate::application::purchase_manager::PurchaseRequest;
use crate::auth::CurrentUser;
use crate::domain::purchase::{Purchase, PurchaseFilter, PurchaseLineInput, PurchaseStatus};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct PurchaseLineRequest {
    pub product_id: Uuid,
    pub quantity: i32,
    /// Decimal cost as a string, e.g. "12.40"
    pub unit_cost: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePurchaseRequest {
    pub supplier_id: Uuid,
    pub site_id: Uuid,
    pub lines: Vec<PurchaseLineRequest>,
    /// Book the goods into stock right away.
    #[serde(default)]
    pub receive_now: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PurchaseLineResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_cost: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PurchaseResponse {
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub site_id: Uuid,
    pub status: String,
    pub total: String,
    pub created_by: Uuid,
    pub created_at: String,
    pub received_at: Option<String>,
    pub lines: Vec<PurchaseLineResponse>,
}

impl From<Purchase> for PurchaseResponse {
    fn from(p: Purchase) -> Self {
        PurchaseResponse {
            id: p.id,
            supplier_id: p.supplier_id,
            site_id: p.site_id,
            status: p.status.to_string(),
            total: p.total.to_string(),
            created_by: p.created_by,
            created_at: timestamp(p.created_at),
            received_at: p.received_at.map(timestamp),
            lines: p
                .lines
                .into_iter()
                .map(|l| PurchaseLineResponse {
                    id: l.id,
                    product_id: l.product_id,
                    quantity: l.quantity,
                    unit_cost: l.unit_cost.to_string(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListPurchasesParams {
    pub status: Option<String>,
    pub site_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/purchases")
            .route("", web::get().to(list_purchases))
            .route("", web::post().to(create_purchase))
            .route("/{id}", web::get().to(get_purchase))
            .route("/{id}/receive", web::post().to(receive_purchase))
            .route("/{id}/cancel", web::post().to(cancel_purchase)),
    );
}

/// GET /purchases
#[utoipa::path(
    get,
    path = "/purchases",
    params(
        ("status" = Option<String>, Query, description = "pending, received or cancelled"),
        ("site_id" = Option<Uuid>, Query, description = "Receiving site"),
        ("supplier_id" = Option<Uuid>, Query, description = "Supplier"),
    ),
    responses((status = 200, description = "Purchases, newest first", body = [PurchaseResponse])),
    tag = "purchases"
)]
pub async fn list_purchases(
    state: web::Data<AppState>,
    user: CurrentUser,
    query: web::Query<ListPurchasesParams>,
) -> Result<HttpResponse, AppError> {
    user.require_staff()?;
    let params = query.into_inner();
    let filter = PurchaseFilter {
        status: params
            .status
            .as_deref()
            .map(parse_enum::<PurchaseStatus>)
            .transpose()?,
        site_id: params.site_id,
        supplier_id: params.supplier_id,
    };

    let purchases = blocking(move || state.purchases.list(filter)).await?;
    let body: Vec<PurchaseResponse> = purchases.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// POST /purchases
#[utoipa::path(
    post,
    path = "/purchases",
    request_body = CreatePurchaseRequest,
    responses(
        (status = 201, description = "Purchase recorded", body = PurchaseResponse),
        (status = 400, description = "Invalid lines or inactive supplier"),
        (status = 404, description = "Supplier or site not found"),
    ),
    tag = "purchases"
)]
pub async fn create_purchase(
    state: web::Data<AppState>,
    user: CurrentUser,
    body: web::Json<CreatePurchaseRequest>,
) -> Result<HttpResponse, AppError> {
    user.require_staff()?;
    let body = body.into_inner();
    let lines = body
        .lines
        .into_iter()
        .map(|l| {
            Ok(PurchaseLineInput {
                product_id: l.product_id,
                quantity: l.quantity,
                unit_cost: parse_money("unit_cost", &l.unit_cost)?,
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;
    let request = PurchaseRequest {
        supplier_id: body.supplier_id,
        site_id: body.site_id,
        lines,
        receive_now: body.receive_now,
    };

    let purchase = blocking(move || state.purchases.create(request, user.id)).await?;
    Ok(HttpResponse::Created().json(PurchaseResponse::from(purchase)))
}

/// GET /purchases/{id}
#[utoipa::path(
    get,
    path = "/purchases/{id}",
    params(("id" = Uuid, Path, description = "Purchase UUID")),
    responses(
        (status = 200, description = "Purchase with its lines", body = PurchaseResponse),
        (status = 404, description = "Purchase not found"),
    ),
    tag = "purchases"
)]
pub async fn get_purchase(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    user.require_staff()?;
    let id = path.into_inner();
    let purchase = blocking(move || state.purchases.get(id)).await?;
    Ok(HttpResponse::Ok().json(PurchaseResponse::from(purchase)))
}

/// POST /purchases/{id}/receive
#[utoipa::path(
    post,
    path = "/purchases/{id}/receive",
    params(("id" = Uuid, Path, description = "Purchase UUID")),
    responses(
        (status = 200, description = "Goods booked into stock", body = PurchaseResponse),
        (status = 400, description = "Purchase is not pending"),
        (status = 404, description = "Purchase not found"),
    ),
    tag = "purchases"
)]
pub async fn receive_purchase(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    user.require_staff()?;
    let id = path.into_inner();
    let purchase = blocking(move || state.purchases.receive(id)).await?;
    Ok(HttpResponse::Ok().json(PurchaseResponse::from(purchase)))
}

/// POST /purchases/{id}/cancel
#[utoipa::path(
    post,
    path = "/purchases/{id}/cancel",
    params(("id" = Uuid, Path, description = "Purchase UUID")),
    responses(
        (status = 200, description = "Purchase cancelled", body = PurchaseResponse),
        (status = 400, description = "Purchase is not pending"),
        (status = 404, description = "Purchase not found"),
    ),
    tag = "purchases"
)]
pub async fn cancel_purchase(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    user.require_staff()?;
    let id = path.into_inner();
    let purchase = blocking(move || state.purchases.cancel(id)).await?;
    Ok(HttpResponse::Ok().json(PurchaseResponse::from(purchase)))
}
