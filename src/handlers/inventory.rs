use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{blocking, timestamp};
use crate::auth::CurrentUser;
use crate::domain::inventory::InventoryItem;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct InventoryItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub site_id: Uuid,
    pub quantity: i32,
    pub min_stock: i32,
    pub low: bool,
    pub updated_at: String,
}

impl From<InventoryItem> for InventoryItemResponse {
    fn from(i: InventoryItem) -> Self {
        InventoryItemResponse {
            low: i.is_low(),
            id: i.id,
            product_id: i.product_id,
            site_id: i.site_id,
            quantity: i.quantity,
            min_stock: i.min_stock,
            updated_at: timestamp(i.updated_at),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetStockRequest {
    pub product_id: Uuid,
    pub site_id: Uuid,
    pub quantity: i32,
    #[serde(default)]
    pub min_stock: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AdjustStockRequest {
    pub product_id: Uuid,
    pub site_id: Uuid,
    /// Positive to add stock, negative to remove it.
    pub delta: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TransferRequest {
    pub product_id: Uuid,
    pub from_site_id: Uuid,
    pub to_site_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TransferResponse {
    pub source: InventoryItemResponse,
    pub destination: InventoryItemResponse,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LowStockParams {
    pub site_id: Option<Uuid>,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/inventory")
            .route("/sites/{site_id}", web::get().to(list_site_stock))
            .route("/stock", web::put().to(set_stock))
            .route("/adjust", web::post().to(adjust_stock))
            .route("/transfer", web::post().to(transfer_stock))
            .route("/low-stock", web::get().to(low_stock)),
    );
}

/// GET /inventory/sites/{site_id}
#[utoipa::path(
    get,
    path = "/inventory/sites/{site_id}",
    params(("site_id" = Uuid, Path, description = "Site UUID")),
    responses(
        (status = 200, description = "Stock held at the site", body = [InventoryItemResponse]),
        (status = 404, description = "Site not found"),
    ),
    tag = "inventory"
)]
pub async fn list_site_stock(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    user.require_staff()?;
    let site_id = path.into_inner();
    let items = blocking(move || state.inventory.list_site(site_id)).await?;
    let body: Vec<InventoryItemResponse> = items.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// PUT /inventory/stock
///
/// Sets absolute quantity and threshold, creating the row if needed.
#[utoipa::path(
    put,
    path = "/inventory/stock",
    request_body = SetStockRequest,
    responses(
        (status = 200, description = "Stock set", body = InventoryItemResponse),
        (status = 400, description = "Negative quantity"),
        (status = 404, description = "Product or site not found"),
    ),
    tag = "inventory"
)]
pub async fn set_stock(
    state: web::Data<AppState>,
    user: CurrentUser,
    body: web::Json<SetStockRequest>,
) -> Result<HttpResponse, AppError> {
    user.require_staff()?;
    let body = body.into_inner();
    let item = blocking(move || {
        state
            .inventory
            .set_stock(body.product_id, body.site_id, body.quantity, body.min_stock)
    })
    .await?;
    Ok(HttpResponse::Ok().json(InventoryItemResponse::from(item)))
}

/// POST /inventory/adjust
#[utoipa::path(
    post,
    path = "/inventory/adjust",
    request_body = AdjustStockRequest,
    responses(
        (status = 200, description = "Stock adjusted", body = InventoryItemResponse),
        (status = 400, description = "Zero delta"),
        (status = 409, description = "Insufficient stock"),
    ),
    tag = "inventory"
)]
pub async fn adjust_stock(
    state: web::Data<AppState>,
    user: CurrentUser,
    body: web::Json<AdjustStockRequest>,
) -> Result<HttpResponse, AppError> {
    user.require_staff()?;
    let body = body.into_inner();
    let item = blocking(move || {
        state
            .inventory
            .adjust(body.product_id, body.site_id, body.delta)
    })
    .await?;
    Ok(HttpResponse::Ok().json(InventoryItemResponse::from(item)))
}

/// POST /inventory/transfer
#[utoipa::path(
    post,
    path = "/inventory/transfer",
    request_body = TransferRequest,
    responses(
        (status = 200, description = "Stock moved", body = TransferResponse),
        (status = 400, description = "Same site or invalid quantity"),
        (status = 409, description = "Insufficient stock at the source"),
    ),
    tag = "inventory"
)]
pub async fn transfer_stock(
    state: web::Data<AppState>,
    user: CurrentUser,
    body: web::Json<TransferRequest>,
) -> Result<HttpResponse, AppError> {
    user.require_staff()?;
    let body = body.into_inner();
    let transfer = blocking(move || {
        state.inventory.transfer(
            body.product_id,
            body.from_site_id,
            body.to_site_id,
            body.quantity,
        )
    })
    .await?;
    Ok(HttpResponse::Ok().json(TransferResponse {
        source: transfer.source.into(),
        destination: transfer.destination.into(),
    }))
}

/// GET /inventory/low-stock
#[utoipa::path(
    get,
    path = "/inventory/low-stock",
    params(("site_id" = Option<Uuid>, Query, description = "Restrict to one site")),
    responses((status = 200, description = "Rows at or below their minimum", body = [InventoryItemResponse])),
    tag = "inventory"
)]
pub async fn low_stock(
    state: web::Data<AppState>,
    user: CurrentUser,
    query: web::Query<LowStockParams>,
) -> Result<HttpResponse, AppError> {
    user.require_staff()?;
    let site_id = query.site_id;
    let items = blocking(move || state.inventory.low_stock(site_id)).await?;
    let body: Vec<InventoryItemResponse> = items.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}
