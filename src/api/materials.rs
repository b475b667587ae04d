use actix_web::{http::StatusCode, web, HttpResponse};

use super::{failure, list_response, record_response};
use crate::database::SortBy;
use crate::models::{CreateMaterialRequest, Material, MaterialFilter, UpdateMaterialRequest};
use crate::services::auth_service::Claims;
use crate::services::crud;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/v1/materials",
    tag = "Site",
    request_body = CreateMaterialRequest,
    responses(
        (status = 201, description = "Material requested", body = Material),
        (status = 400, description = "Invalid material")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_material(
    state: web::Data<AppState>,
    claims: web::ReqData<Claims>,
    request: web::Json<CreateMaterialRequest>,
) -> HttpResponse {
    log::info!("🧱 POST /materials - {} {} {}", request.quantity, request.unit, request.name);

    match crud::create(&state, &claims.sub, request.into_inner()).await {
        Ok(material) => record_response(StatusCode::CREATED, "material", &material),
        Err(e) => failure("POST /materials", e),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/materials",
    tag = "Site",
    params(MaterialFilter),
    responses((status = 200, description = "Materials, newest first", body = [Material])),
    security(("bearer_auth" = []))
)]
pub async fn list_materials(state: web::Data<AppState>, filter: web::Query<MaterialFilter>) -> HttpResponse {
    log::info!("📋 GET /materials");

    match crud::list::<Material, _>(&state, &filter.into_inner(), SortBy::desc("created_at")).await {
        Ok(materials) => list_response("materials", &materials),
        Err(e) => failure("GET /materials", e),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/materials/{id}",
    tag = "Site",
    params(("id" = String, Path, description = "Material id")),
    responses(
        (status = 200, description = "Material found", body = Material),
        (status = 404, description = "Material not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_material(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let id = path.into_inner();

    match crud::get::<Material>(&state, &id).await {
        Ok(material) => record_response(StatusCode::OK, "material", &material),
        Err(e) => failure("GET /materials/{id}", e),
    }
}

#[utoipa::path(
    patch,
    path = "/api/v1/materials/{id}",
    tag = "Site",
    params(("id" = String, Path, description = "Material id")),
    request_body = UpdateMaterialRequest,
    responses(
        (status = 200, description = "Material updated", body = Material),
        (status = 400, description = "Invalid changes"),
        (status = 404, description = "Material not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_material(
    state: web::Data<AppState>,
    path: web::Path<String>,
    request: web::Json<UpdateMaterialRequest>,
) -> HttpResponse {
    let id = path.into_inner();
    log::info!("✏️ PATCH /materials/{}", id);

    match crud::update::<Material, _>(&state, &id, request.into_inner()).await {
        Ok(material) => record_response(StatusCode::OK, "material", &material),
        Err(e) => failure("PATCH /materials/{id}", e),
    }
}
