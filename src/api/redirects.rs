use actix_web::{http::header, http::StatusCode, web, HttpResponse};

use super::{failure, list_response, record_response};
use crate::database::SortBy;
use crate::models::{CreateRedirectRequest, Redirect, RedirectFilter, UpdateRedirectRequest};
use crate::services::auth_service::Claims;
use crate::services::{crud, redirect_service};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/v1/redirects",
    tag = "Redirects",
    request_body = CreateRedirectRequest,
    responses(
        (status = 201, description = "Redirect created", body = Redirect),
        (status = 400, description = "Invalid redirect"),
        (status = 409, description = "Source already in use")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_redirect(
    state: web::Data<AppState>,
    claims: web::ReqData<Claims>,
    request: web::Json<CreateRedirectRequest>,
) -> HttpResponse {
    log::info!("🔗 POST /redirects - {} -> {}", request.source, request.destination);

    match crud::create(&state, &claims.sub, request.into_inner()).await {
        Ok(redirect) => record_response(StatusCode::CREATED, "redirect", &redirect),
        Err(e) => failure("POST /redirects", e),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/redirects",
    tag = "Redirects",
    params(RedirectFilter),
    responses((status = 200, description = "Redirects by source", body = [Redirect])),
    security(("bearer_auth" = []))
)]
pub async fn list_redirects(state: web::Data<AppState>, filter: web::Query<RedirectFilter>) -> HttpResponse {
    log::info!("📋 GET /redirects");

    match crud::list::<Redirect, _>(&state, &filter.into_inner(), SortBy::asc("source")).await {
        Ok(redirects) => list_response("redirects", &redirects),
        Err(e) => failure("GET /redirects", e),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/redirects/{id}",
    tag = "Redirects",
    params(("id" = String, Path, description = "Redirect id")),
    responses(
        (status = 200, description = "Redirect found", body = Redirect),
        (status = 404, description = "Redirect not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_redirect(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let id = path.into_inner();

    match crud::get::<Redirect>(&state, &id).await {
        Ok(redirect) => record_response(StatusCode::OK, "redirect", &redirect),
        Err(e) => failure("GET /redirects/{id}", e),
    }
}

#[utoipa::path(
    patch,
    path = "/api/v1/redirects/{id}",
    tag = "Redirects",
    params(("id" = String, Path, description = "Redirect id")),
    request_body = UpdateRedirectRequest,
    responses(
        (status = 200, description = "Redirect updated", body = Redirect),
        (status = 400, description = "Invalid changes"),
        (status = 404, description = "Redirect not found"),
        (status = 409, description = "Source already in use")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_redirect(
    state: web::Data<AppState>,
    path: web::Path<String>,
    request: web::Json<UpdateRedirectRequest>,
) -> HttpResponse {
    let id = path.into_inner();
    log::info!("✏️ PATCH /redirects/{}", id);

    match redirect_service::update(&state, &id, request.into_inner()).await {
        Ok(redirect) => record_response(StatusCode::OK, "redirect", &redirect),
        Err(e) => failure("PATCH /redirects/{id}", e),
    }
}

#[utoipa::path(
    get,
    path = "/r/{source}",
    tag = "Redirects",
    params(("source" = String, Path, description = "Short link source")),
    responses(
        (status = 301, description = "Permanent redirect"),
        (status = 302, description = "Temporary redirect"),
        (status = 404, description = "Unknown or inactive redirect")
    )
)]
pub async fn resolve_redirect(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let source = path.into_inner();

    match redirect_service::resolve(&state, &source).await {
        Ok(redirect) => {
            log::info!("↪️ /r/{} -> {} (hits={})", source, redirect.data.destination, redirect.data.hits);
            let status = if redirect.data.permanent {
                StatusCode::MOVED_PERMANENTLY
            } else {
                StatusCode::FOUND
            };
            HttpResponse::build(status)
                .insert_header((header::LOCATION, redirect.data.destination))
                .finish()
        }
        Err(e) => failure("GET /r/{source}", e),
    }
}
