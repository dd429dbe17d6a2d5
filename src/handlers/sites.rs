use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{blocking, timestamp};
use crate::auth::CurrentUser;
use crate::domain::site::{Site, SiteUpdate};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct SiteResponse {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub active: bool,
    pub created_at: String,
}

impl From<Site> for SiteResponse {
    fn from(s: Site) -> Self {
        SiteResponse {
            id: s.id,
            name: s.name,
            address: s.address,
            active: s.active,
            created_at: timestamp(s.created_at),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSiteRequest {
    pub name: String,
    #[serde(default)]
    pub address: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSiteRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListSitesParams {
    #[serde(default)]
    pub active_only: bool,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/sites")
            .route("", web::get().to(list_sites))
            .route("", web::post().to(create_site))
            .route("/{id}", web::get().to(get_site))
            .route("/{id}", web::put().to(update_site)),
    );
}

/// GET /sites
#[utoipa::path(
    get,
    path = "/sites",
    params(("active_only" = Option<bool>, Query, description = "Hide closed sites")),
    responses((status = 200, description = "Sites", body = [SiteResponse])),
    tag = "sites"
)]
pub async fn list_sites(
    state: web::Data<AppState>,
    query: web::Query<ListSitesParams>,
) -> Result<HttpResponse, AppError> {
    let active_only = query.active_only;
    let sites = blocking(move || state.sites.list(active_only)).await?;
    let body: Vec<SiteResponse> = sites.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// POST /sites
#[utoipa::path(
    post,
    path = "/sites",
    request_body = CreateSiteRequest,
    responses(
        (status = 201, description = "Site created", body = SiteResponse),
        (status = 403, description = "Administrators only"),
    ),
    tag = "sites"
)]
pub async fn create_site(
    state: web::Data<AppState>,
    user: CurrentUser,
    body: web::Json<CreateSiteRequest>,
) -> Result<HttpResponse, AppError> {
    user.require_admin()?;
    let body = body.into_inner();
    let site = blocking(move || state.sites.create(&body.name, &body.address)).await?;
    Ok(HttpResponse::Created().json(SiteResponse::from(site)))
}

/// GET /sites/{id}
#[utoipa::path(
    get,
    path = "/sites/{id}",
    params(("id" = Uuid, Path, description = "Site UUID")),
    responses(
        (status = 200, description = "Site found", body = SiteResponse),
        (status = 404, description = "Site not found"),
    ),
    tag = "sites"
)]
pub async fn get_site(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let site = blocking(move || state.sites.get(id)).await?;
    Ok(HttpResponse::Ok().json(SiteResponse::from(site)))
}

/// PUT /sites/{id}
#[utoipa::path(
    put,
    path = "/sites/{id}",
    params(("id" = Uuid, Path, description = "Site UUID")),
    request_body = UpdateSiteRequest,
    responses(
        (status = 200, description = "Site updated", body = SiteResponse),
        (status = 400, description = "Nothing to update"),
        (status = 404, description = "Site not found"),
    ),
    tag = "sites"
)]
pub async fn update_site(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<Uuid>,
    body: web::Json<UpdateSiteRequest>,
) -> Result<HttpResponse, AppError> {
    user.require_admin()?;
    let id = path.into_inner();
    let body = body.into_inner();
    let changes = SiteUpdate {
        name: body.name,
        address: body.address,
        active: body.active,
    };
    let site = blocking(move || state.sites.update(id, changes)).await?;
    Ok(HttpResponse::Ok().json(SiteResponse::from(site)))
}
