use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{blocking, timestamp};
use crate::auth::CurrentUser;
use crate::domain::promotion::{NewPromotion, Promotion, PromotionUpdate};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct PromotionResponse {
    pub id: Uuid,
    pub code: String,
    pub description: String,
    pub discount_percent: i32,
    pub product_id: Option<Uuid>,
    pub starts_at: String,
    pub ends_at: String,
    pub active: bool,
    pub created_at: String,
}

impl From<Promotion> for PromotionResponse {
    fn from(p: Promotion) -> Self {
        PromotionResponse {
            id: p.id,
            code: p.code,
            description: p.description,
            discount_percent: p.discount_percent,
            product_id: p.product_id,
            starts_at: timestamp(p.starts_at),
            ends_at: timestamp(p.ends_at),
            active: p.active,
            created_at: timestamp(p.created_at),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePromotionRequest {
    pub code: String,
    #[serde(default)]
    pub description: String,
    pub discount_percent: i32,
    pub product_id: Option<Uuid>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePromotionRequest {
    pub description: Option<String>,
    pub discount_percent: Option<i32>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListPromotionsParams {
    #[serde(default)]
    pub active_only: bool,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/promotions")
            .route("", web::get().to(list_promotions))
            .route("", web::post().to(create_promotion))
            .route("/code/{code}", web::get().to(validate_code))
            .route("/{id}", web::get().to(get_promotion))
            .route("/{id}", web::put().to(update_promotion))
            .route("/{id}", web::delete().to(delete_promotion)),
    );
}

/// GET /promotions
#[utoipa::path(
    get,
    path = "/promotions",
    params(("active_only" = Option<bool>, Query, description = "Hide disabled promotions")),
    responses((status = 200, description = "Promotions", body = [PromotionResponse])),
    tag = "promotions"
)]
pub async fn list_promotions(
    state: web::Data<AppState>,
    query: web::Query<ListPromotionsParams>,
) -> Result<HttpResponse, AppError> {
    let active_only = query.active_only;
    let promotions = blocking(move || state.promotions.list(active_only)).await?;
    let body: Vec<PromotionResponse> = promotions.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// POST /promotions
#[utoipa::path(
    post,
    path = "/promotions",
    request_body = CreatePromotionRequest,
    responses(
        (status = 201, description = "Promotion created", body = PromotionResponse),
        (status = 400, description = "Invalid code, percent or dates"),
        (status = 409, description = "Code already exists"),
    ),
    tag = "promotions"
)]
pub async fn create_promotion(
    state: web::Data<AppState>,
    user: CurrentUser,
    body: web::Json<CreatePromotionRequest>,
) -> Result<HttpResponse, AppError> {
    user.require_admin()?;
    let body = body.into_inner();
    let input = NewPromotion {
        code: body.code,
        description: body.description,
        discount_percent: body.discount_percent,
        product_id: body.product_id,
        starts_at: body.starts_at,
        ends_at: body.ends_at,
    };
    let promotion = blocking(move || state.promotions.create(input)).await?;
    Ok(HttpResponse::Created().json(PromotionResponse::from(promotion)))
}

/// GET /promotions/{id}
#[utoipa::path(
    get,
    path = "/promotions/{id}",
    params(("id" = Uuid, Path, description = "Promotion UUID")),
    responses(
        (status = 200, description = "Promotion found", body = PromotionResponse),
        (status = 404, description = "Promotion not found"),
    ),
    tag = "promotions"
)]
pub async fn get_promotion(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let promotion = blocking(move || state.promotions.get(id)).await?;
    Ok(HttpResponse::Ok().json(PromotionResponse::from(promotion)))
}

/// GET /promotions/code/{code}
///
/// Checks a code the way order creation will, at the current time.
#[utoipa::path(
    get,
    path = "/promotions/code/{code}",
    params(("code" = String, Path, description = "Promotion code, case-insensitive")),
    responses(
        (status = 200, description = "Code is usable now", body = PromotionResponse),
        (status = 400, description = "Code exists but is not usable now"),
        (status = 404, description = "Unknown code"),
    ),
    tag = "promotions"
)]
pub async fn validate_code(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let code = path.into_inner();
    let promotion = blocking(move || state.promotions.validate_code(&code, Utc::now())).await?;
    Ok(HttpResponse::Ok().json(PromotionResponse::from(promotion)))
}

/// PUT /promotions/{id}
#[utoipa::path(
    put,
    path = "/promotions/{id}",
    params(("id" = Uuid, Path, description = "Promotion UUID")),
    request_body = UpdatePromotionRequest,
    responses(
        (status = 200, description = "Promotion updated", body = PromotionResponse),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Promotion not found"),
    ),
    tag = "promotions"
)]
pub async fn update_promotion(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePromotionRequest>,
) -> Result<HttpResponse, AppError> {
    user.require_admin()?;
    let id = path.into_inner();
    let body = body.into_inner();
    let changes = PromotionUpdate {
        description: body.description,
        discount_percent: body.discount_percent,
        starts_at: body.starts_at,
        ends_at: body.ends_at,
        active: body.active,
    };
    let promotion = blocking(move || state.promotions.update(id, changes)).await?;
    Ok(HttpResponse::Ok().json(PromotionResponse::from(promotion)))
}

/// DELETE /promotions/{id}
#[utoipa::path(
    delete,
    path = "/promotions/{id}",
    params(("id" = Uuid, Path, description = "Promotion UUID")),
    responses(
        (status = 204, description = "Promotion deleted"),
        (status = 404, description = "Promotion not found"),
    ),
    tag = "promotions"
)]
pub async fn delete_promotion(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    user.require_admin()?;
    let id = path.into_inner();
    blocking(move || state.promotions.delete(id)).await?;
    Ok(HttpResponse::NoContent().finish())
}
