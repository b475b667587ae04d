use actix_web::{http::StatusCode, web, HttpResponse};

use super::{failure, list_response, record_response};
use crate::database::SortBy;
use crate::models::{CreateSiteVisitRequest, SiteVisit, SiteVisitFilter, UpdateSiteVisitRequest};
use crate::services::auth_service::Claims;
use crate::services::crud;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/v1/site-visits",
    tag = "Leads",
    request_body = CreateSiteVisitRequest,
    responses(
        (status = 201, description = "Site visit scheduled", body = SiteVisit),
        (status = 400, description = "Invalid site visit")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_site_visit(
    state: web::Data<AppState>,
    claims: web::ReqData<Claims>,
    request: web::Json<CreateSiteVisitRequest>,
) -> HttpResponse {
    log::info!("📅 POST /site-visits - lead {} at {}", request.lead_id, request.scheduled_at);

    match crud::create(&state, &claims.sub, request.into_inner()).await {
        Ok(visit) => {
            log::info!("✅ Site visit scheduled: {}", visit.id);
            record_response(StatusCode::CREATED, "site_visit", &visit)
        }
        Err(e) => failure("POST /site-visits", e),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/site-visits",
    tag = "Leads",
    params(SiteVisitFilter),
    responses((status = 200, description = "Site visits, soonest first", body = [SiteVisit])),
    security(("bearer_auth" = []))
)]
pub async fn list_site_visits(state: web::Data<AppState>, filter: web::Query<SiteVisitFilter>) -> HttpResponse {
    log::info!("📋 GET /site-visits");

    match crud::list::<SiteVisit, _>(&state, &filter.into_inner(), SortBy::asc("scheduled_at")).await {
        Ok(visits) => list_response("site_visits", &visits),
        Err(e) => failure("GET /site-visits", e),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/site-visits/{id}",
    tag = "Leads",
    params(("id" = String, Path, description = "Site visit id")),
    responses(
        (status = 200, description = "Site visit found", body = SiteVisit),
        (status = 404, description = "Site visit not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_site_visit(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let id = path.into_inner();

    match crud::get::<SiteVisit>(&state, &id).await {
        Ok(visit) => record_response(StatusCode::OK, "site_visit", &visit),
        Err(e) => failure("GET /site-visits/{id}", e),
    }
}

#[utoipa::path(
    patch,
    path = "/api/v1/site-visits/{id}",
    tag = "Leads",
    params(("id" = String, Path, description = "Site visit id")),
    request_body = UpdateSiteVisitRequest,
    responses(
        (status = 200, description = "Site visit updated", body = SiteVisit),
        (status = 400, description = "Invalid changes"),
        (status = 404, description = "Site visit not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_site_visit(
    state: web::Data<AppState>,
    path: web::Path<String>,
    request: web::Json<UpdateSiteVisitRequest>,
) -> HttpResponse {
    let id = path.into_inner();
    log::info!("✏️ PATCH /site-visits/{}", id);

    match crud::update::<SiteVisit, _>(&state, &id, request.into_inner()).await {
        Ok(visit) => {
            log::info!("✅ Site visit {} is {:?}", visit.id, visit.data.status);
            record_response(StatusCode::OK, "site_visit", &visit)
        }
        Err(e) => failure("PATCH /site-visits/{id}", e),
    }
}
