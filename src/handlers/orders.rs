use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{blocking, parse_enum, timestamp};
use crate::application::order_manager::OrderRequest;
use crate::auth::CurrentUser;
use crate::domain::order::{Order, OrderFilter, OrderLineInput, OrderStatus};
use crate::errors::AppError;
use crate::state::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderLineRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub site_id: Uuid,
    pub lines: Vec<CreateOrderLineRequest>,
    pub promotion_code: Option<String>,
    pub notes: Option<String>,
    /// Staff placing an order on behalf of a client. Ignored for clients.
    pub client_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangeStatusRequest {
    /// confirmed, preparing, ready, delivered or cancelled
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderLineResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: String,
    pub line_total: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub client_id: Uuid,
    pub site_id: Uuid,
    pub status: String,
    pub subtotal: String,
    pub discount: String,
    pub total: String,
    pub promotion_code: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub lines: Vec<OrderLineResponse>,
}

impl From<Order> for OrderResponse {
    fn from(o: Order) -> Self {
        OrderResponse {
            id: o.id,
            client_id: o.client_id,
            site_id: o.site_id,
            status: o.status.to_string(),
            subtotal: o.subtotal.to_string(),
            discount: o.discount.to_string(),
            total: o.total.to_string(),
            promotion_code: o.promotion_code,
            notes: o.notes,
            created_at: timestamp(o.created_at),
            updated_at: timestamp(o.updated_at),
            lines: o
                .lines
                .into_iter()
                .map(|l| OrderLineResponse {
                    line_total: l.line_total().to_string(),
                    id: l.id,
                    product_id: l.product_id,
                    quantity: l.quantity,
                    unit_price: l.unit_price.to_string(),
                })
                .collect(),
        }
    }
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListOrdersParams {
    /// Page number (1-based). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Number of items per page. Defaults to 20, maximum 100.
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub status: Option<String>,
    pub site_id: Option<Uuid>,
    /// Staff only; clients always see their own orders.
    pub client_id: Option<Uuid>,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListOrdersResponse {
    pub items: Vec<OrderResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/orders")
            .route("", web::get().to(list_orders))
            .route("", web::post().to(create_order))
            .route("/{id}", web::get().to(get_order))
            .route("/{id}/status", web::put().to(change_status))
            .route("/{id}/cancel", web::post().to(cancel_order)),
    );
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Prices the lines at current catalogue prices and applies the promotion
/// code, if any. Stock is only taken when staff confirm the order.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created successfully", body = OrderResponse),
        (status = 400, description = "Invalid lines, product or promotion"),
        (status = 404, description = "Site or promotion not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    state: web::Data<AppState>,
    user: CurrentUser,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let client_id = match body.client_id {
        Some(client_id) if user.is_staff() => client_id,
        _ => user.id,
    };
    let request = OrderRequest {
        client_id,
        site_id: body.site_id,
        lines: body
            .lines
            .into_iter()
            .map(|l| OrderLineInput {
                product_id: l.product_id,
                quantity: l.quantity,
            })
            .collect(),
        promotion_code: body.promotion_code,
        notes: body.notes,
    };

    let order = blocking(move || state.orders.create(request, Utc::now())).await?;
    Ok(HttpResponse::Created().json(OrderResponse::from(order)))
}

/// GET /orders/{id}
///
/// Returns the order together with its order lines.
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 403, description = "Not your order"),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let order = blocking(move || state.orders.get(order_id)).await?;
    user.require_self_or_staff(order.client_id)?;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// GET /orders
///
/// Returns a paginated list of orders (without their lines).
/// Use `page` (1-based) and `limit` to control pagination.
#[utoipa::path(
    get,
    path = "/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (default 20, max 100)"),
        ("status" = Option<String>, Query, description = "Only orders in this status"),
        ("site_id" = Option<Uuid>, Query, description = "Only orders for this site"),
        ("client_id" = Option<Uuid>, Query, description = "Staff only: one client's orders"),
    ),
    responses(
        (status = 200, description = "Paginated list of orders", body = ListOrdersResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    state: web::Data<AppState>,
    user: CurrentUser,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let filter = OrderFilter {
        client_id: if user.is_staff() {
            params.client_id
        } else {
            Some(user.id)
        },
        site_id: params.site_id,
        status: params
            .status
            .as_deref()
            .map(parse_enum::<OrderStatus>)
            .transpose()?,
        page: params.page,
        limit: params.limit,
    }
    .normalized();
    let (page, limit) = (filter.page, filter.limit);

    let result = blocking(move || state.orders.list(filter)).await?;
    Ok(HttpResponse::Ok().json(ListOrdersResponse {
        items: result.items.into_iter().map(Into::into).collect(),
        total: result.total,
        page,
        limit,
    }))
}

/// PUT /orders/{id}/status
#[utoipa::path(
    put,
    path = "/orders/{id}/status",
    params(("id" = Uuid, Path, description = "Order UUID")),
    request_body = ChangeStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = OrderResponse),
        (status = 400, description = "Transition not allowed"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Insufficient stock to confirm"),
    ),
    tag = "orders"
)]
pub async fn change_status(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<Uuid>,
    body: web::Json<ChangeStatusRequest>,
) -> Result<HttpResponse, AppError> {
    user.require_staff()?;
    let order_id = path.into_inner();
    let status = parse_enum::<OrderStatus>(&body.status)?;
    let order = blocking(move || state.orders.change_status(order_id, status)).await?;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// POST /orders/{id}/cancel
///
/// Clients withdraw their own pending orders.
#[utoipa::path(
    post,
    path = "/orders/{id}/cancel",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Order cancelled", body = OrderResponse),
        (status = 400, description = "Order is no longer pending"),
        (status = 403, description = "Not your order"),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn cancel_order(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let order = blocking(move || state.orders.cancel_by_client(order_id, user.id)).await?;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}
