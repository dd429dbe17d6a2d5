use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{blocking, timestamp};
use crate::auth::CurrentUser;
use crate::domain::supplier::{NewSupplier, Supplier, SupplierUpdate};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct SupplierResponse {
    pub id: Uuid,
    pub name: String,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub active: bool,
    pub created_at: String,
}

impl From<Supplier> for SupplierResponse {
    fn from(s: Supplier) -> Self {
        SupplierResponse {
            id: s.id,
            name: s.name,
            contact_name: s.contact_name,
            phone: s.phone,
            email: s.email,
            active: s.active,
            created_at: timestamp(s.created_at),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSupplierRequest {
    pub name: String,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSupplierRequest {
    pub name: Option<String>,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListSuppliersParams {
    #[serde(default)]
    pub active_only: bool,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/suppliers")
            .route("", web::get().to(list_suppliers))
            .route("", web::post().to(create_supplier))
            .route("/{id}", web::get().to(get_supplier))
            .route("/{id}", web::put().to(update_supplier))
            .route("/{id}", web::delete().to(delete_supplier)),
    );
}

/// GET /suppliers
#[utoipa::path(
    get,
    path = "/suppliers",
    params(("active_only" = Option<bool>, Query, description = "Hide inactive suppliers")),
    responses(
        (status = 200, description = "Suppliers", body = [SupplierResponse]),
        (status = 403, description = "Staff only"),
    ),
    tag = "suppliers"
)]
pub async fn list_suppliers(
    state: web::Data<AppState>,
    user: CurrentUser,
    query: web::Query<ListSuppliersParams>,
) -> Result<HttpResponse, AppError> {
    user.require_staff()?;
    let active_only = query.active_only;
    let suppliers = blocking(move || state.suppliers.list(active_only)).await?;
    let body: Vec<SupplierResponse> = suppliers.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// POST /suppliers
#[utoipa::path(
    post,
    path = "/suppliers",
    request_body = CreateSupplierRequest,
    responses(
        (status = 201, description = "Supplier created", body = SupplierResponse),
        (status = 400, description = "Invalid input"),
    ),
    tag = "suppliers"
)]
pub async fn create_supplier(
    state: web::Data<AppState>,
    user: CurrentUser,
    body: web::Json<CreateSupplierRequest>,
) -> Result<HttpResponse, AppError> {
    user.require_staff()?;
    let body = body.into_inner();
    let input = NewSupplier {
        name: body.name,
        contact_name: body.contact_name,
        phone: body.phone,
        email: body.email,
    };
    let supplier = blocking(move || state.suppliers.create(input)).await?;
    Ok(HttpResponse::Created().json(SupplierResponse::from(supplier)))
}

/// GET /suppliers/{id}
#[utoipa::path(
    get,
    path = "/suppliers/{id}",
    params(("id" = Uuid, Path, description = "Supplier UUID")),
    responses(
        (status = 200, description = "Supplier found", body = SupplierResponse),
        (status = 404, description = "Supplier not found"),
    ),
    tag = "suppliers"
)]
pub async fn get_supplier(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    user.require_staff()?;
    let id = path.into_inner();
    let supplier = blocking(move || state.suppliers.get(id)).await?;
    Ok(HttpResponse::Ok().json(SupplierResponse::from(supplier)))
}

/// PUT /suppliers/{id}
#[utoipa::path(
    put,
    path = "/suppliers/{id}",
    params(("id" = Uuid, Path, description = "Supplier UUID")),
    request_body = UpdateSupplierRequest,
    responses(
        (status = 200, description = "Supplier updated", body = SupplierResponse),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Supplier not found"),
    ),
    tag = "suppliers"
)]
pub async fn update_supplier(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<Uuid>,
    body: web::Json<UpdateSupplierRequest>,
) -> Result<HttpResponse, AppError> {
    user.require_staff()?;
    let id = path.into_inner();
    let body = body.into_inner();
    let changes = SupplierUpdate {
        name: body.name,
        contact_name: body.contact_name,
        phone: body.phone,
        email: body.email,
        active: body.active,
    };
    let supplier = blocking(move || state.suppliers.update(id, changes)).await?;
    Ok(HttpResponse::Ok().json(SupplierResponse::from(supplier)))
}

/// DELETE /suppliers/{id}
#[utoipa::path(
    delete,
    path = "/suppliers/{id}",
    params(("id" = Uuid, Path, description = "Supplier UUID")),
    responses(
        (status = 204, description = "Supplier deleted"),
        (status = 404, description = "Supplier not found"),
    ),
    tag = "suppliers"
)]
pub async fn delete_supplier(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    user.require_staff()?;
    let id = path.into_inner();
    blocking(move || state.suppliers.delete(id)).await?;
    Ok(HttpResponse::NoContent().finish())
}
