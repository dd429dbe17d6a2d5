use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{blocking, parse_enum, timestamp};
use crate::auth::CurrentUser;
use crate::domain::claim::{Claim, ClaimFilter, ClaimStatus, NewClaim};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct ClaimResponse {
    pub id: Uuid,
    pub client_id: Uuid,
    pub order_id: Option<Uuid>,
    pub subject: String,
    pub description: String,
    pub status: String,
    pub response: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Claim> for ClaimResponse {
    fn from(c: Claim) -> Self {
        ClaimResponse {
            id: c.id,
            client_id: c.client_id,
            order_id: c.order_id,
            subject: c.subject,
            description: c.description,
            status: c.status.to_string(),
            response: c.response,
            created_at: timestamp(c.created_at),
            updated_at: timestamp(c.updated_at),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OpenClaimRequest {
    pub order_id: Option<Uuid>,
    pub subject: String,
    pub description: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangeClaimStatusRequest {
    /// in_review, resolved, rejected or closed
    pub status: String,
    /// Required when resolving or rejecting.
    pub response: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListClaimsParams {
    pub status: Option<String>,
    pub client_id: Option<Uuid>,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/claims")
            .route("", web::get().to(list_claims))
            .route("", web::post().to(open_claim))
            .route("/{id}", web::get().to(get_claim))
            .route("/{id}/status", web::put().to(change_claim_status)),
    );
}

/// GET /claims
#[utoipa::path(
    get,
    path = "/claims",
    params(
        ("status" = Option<String>, Query, description = "Only claims in this status"),
        ("client_id" = Option<Uuid>, Query, description = "Staff only: one client's claims"),
    ),
    responses((status = 200, description = "Claims, newest first", body = [ClaimResponse])),
    tag = "claims"
)]
pub async fn list_claims(
    state: web::Data<AppState>,
    user: CurrentUser,
    query: web::Query<ListClaimsParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let filter = ClaimFilter {
        client_id: if user.is_staff() {
            params.client_id
        } else {
            Some(user.id)
        },
        status: params
            .status
            .as_deref()
            .map(parse_enum::<ClaimStatus>)
            .transpose()?,
    };
    let claims = blocking(move || state.claims.list(filter)).await?;
    let body: Vec<ClaimResponse> = claims.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// POST /claims
///
/// Opens a claim on behalf of the calling client.
#[utoipa::path(
    post,
    path = "/claims",
    request_body = OpenClaimRequest,
    responses(
        (status = 201, description = "Claim opened", body = ClaimResponse),
        (status = 400, description = "Invalid subject or description"),
        (status = 403, description = "The order belongs to someone else"),
        (status = 404, description = "Order not found"),
    ),
    tag = "claims"
)]
pub async fn open_claim(
    state: web::Data<AppState>,
    user: CurrentUser,
    body: web::Json<OpenClaimRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let input = NewClaim {
        client_id: user.id,
        order_id: body.order_id,
        subject: body.subject,
        description: body.description,
    };
    let claim = blocking(move || state.claims.open(input)).await?;
    Ok(HttpResponse::Created().json(ClaimResponse::from(claim)))
}

/// GET /claims/{id}
#[utoipa::path(
    get,
    path = "/claims/{id}",
    params(("id" = Uuid, Path, description = "Claim UUID")),
    responses(
        (status = 200, description = "Claim found", body = ClaimResponse),
        (status = 403, description = "Not your claim"),
        (status = 404, description = "Claim not found"),
    ),
    tag = "claims"
)]
pub async fn get_claim(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let claim = blocking(move || state.claims.get(id)).await?;
    user.require_self_or_staff(claim.client_id)?;
    Ok(HttpResponse::Ok().json(ClaimResponse::from(claim)))
}

/// PUT /claims/{id}/status
#[utoipa::path(
    put,
    path = "/claims/{id}/status",
    params(("id" = Uuid, Path, description = "Claim UUID")),
    request_body = ChangeClaimStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = ClaimResponse),
        (status = 400, description = "Transition not allowed or response missing"),
        (status = 404, description = "Claim not found"),
    ),
    tag = "claims"
)]
pub async fn change_claim_status(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<Uuid>,
    body: web::Json<ChangeClaimStatusRequest>,
) -> Result<HttpResponse, AppError> {
    user.require_staff()?;
    let id = path.into_inner();
    let body = body.into_inner();
    let status = parse_enum::<ClaimStatus>(&body.status)?;
    let claim =
        blocking(move || state.claims.change_status(id, status, body.response)).await?;
    Ok(HttpResponse::Ok().json(ClaimResponse::from(claim)))
}
