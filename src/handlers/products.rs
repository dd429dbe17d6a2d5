use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{blocking, parse_money, timestamp};
use crate::auth::CurrentUser;
use crate::domain::product::{NewProduct, Product, ProductFilter, ProductUpdate};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    /// Decimal price as a string, e.g. "3.50"
    pub price: String,
    pub active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        ProductResponse {
            id: p.id,
            name: p.name,
            description: p.description,
            category: p.category,
            price: p.price.to_string(),
            active: p.active,
            created_at: timestamp(p.created_at),
            updated_at: timestamp(p.updated_at),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub price: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListProductsParams {
    pub category: Option<String>,
    pub search: Option<String>,
    /// Ignored for clients and anonymous callers, who only see active products.
    #[serde(default)]
    pub active_only: bool,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/products")
            .route("", web::get().to(list_products))
            .route("", web::post().to(create_product))
            .route("/{id}", web::get().to(get_product))
            .route("/{id}", web::put().to(update_product))
            .route("/{id}", web::delete().to(delete_product)),
    );
}

/// GET /products
///
/// Open to anonymous callers.
#[utoipa::path(
    get,
    path = "/products",
    params(
        ("category" = Option<String>, Query, description = "Exact category"),
        ("search" = Option<String>, Query, description = "Case-insensitive name search"),
        ("active_only" = Option<bool>, Query, description = "Staff only: hide inactive products"),
    ),
    responses((status = 200, description = "Catalogue", body = [ProductResponse])),
    tag = "products"
)]
pub async fn list_products(
    state: web::Data<AppState>,
    user: Option<CurrentUser>,
    query: web::Query<ListProductsParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let is_staff = user.as_ref().is_some_and(CurrentUser::is_staff);
    let filter = ProductFilter {
        category: params.category,
        search: params.search,
        active_only: params.active_only || !is_staff,
    };

    let products = blocking(move || state.products.list(filter)).await?;
    let body: Vec<ProductResponse> = products.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// POST /products
#[utoipa::path(
    post,
    path = "/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Administrators only"),
    ),
    tag = "products"
)]
pub async fn create_product(
    state: web::Data<AppState>,
    user: CurrentUser,
    body: web::Json<CreateProductRequest>,
) -> Result<HttpResponse, AppError> {
    user.require_admin()?;
    let body = body.into_inner();
    let input = NewProduct {
        price: parse_money("price", &body.price)?,
        name: body.name,
        description: body.description,
        category: body.category,
    };

    let product = blocking(move || state.products.create(input)).await?;
    Ok(HttpResponse::Created().json(ProductResponse::from(product)))
}

/// GET /products/{id}
#[utoipa::path(
    get,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, description = "Product not found"),
    ),
    tag = "products"
)]
pub async fn get_product(
    state: web::Data<AppState>,
    user: Option<CurrentUser>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let product = blocking(move || state.products.get(id)).await?;
    if !product.active && !user.as_ref().is_some_and(CurrentUser::is_staff) {
        return Err(AppError::NotFound("Product not found".to_string()));
    }
    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

/// PUT /products/{id}
#[utoipa::path(
    put,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Product not found"),
    ),
    tag = "products"
)]
pub async fn update_product(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<Uuid>,
    body: web::Json<UpdateProductRequest>,
) -> Result<HttpResponse, AppError> {
    user.require_admin()?;
    let id = path.into_inner();
    let body = body.into_inner();
    let changes = ProductUpdate {
        price: body
            .price
            .as_deref()
            .map(|p| parse_money("price", p))
            .transpose()?,
        name: body.name,
        description: body.description,
        category: body.category,
        active: body.active,
    };

    let product = blocking(move || state.products.update(id, changes)).await?;
    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

/// DELETE /products/{id}
#[utoipa::path(
    delete,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Product not found"),
        (status = 400, description = "Product is still referenced by orders or stock"),
    ),
    tag = "products"
)]
pub async fn delete_product(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    user.require_admin()?;
    let id = path.into_inner();
    blocking(move || state.products.delete(id)).await?;
    Ok(HttpResponse::NoContent().finish())
}
