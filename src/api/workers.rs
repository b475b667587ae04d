use actix_web::{http::StatusCode, web, HttpResponse};

use super::{failure, list_response, record_response};
use crate::database::SortBy;
use crate::models::{CreateWorkerRequest, UpdateWorkerRequest, Worker, WorkerFilter};
use crate::services::auth_service::Claims;
use crate::services::crud;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/v1/workers",
    tag = "Workforce",
    request_body = CreateWorkerRequest,
    responses(
        (status = 201, description = "Worker registered", body = Worker),
        (status = 400, description = "Invalid worker")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_worker(
    state: web::Data<AppState>,
    claims: web::ReqData<Claims>,
    request: web::Json<CreateWorkerRequest>,
) -> HttpResponse {
    log::info!("👷 POST /workers - {} ({:?})", request.name, request.skill);

    match crud::create(&state, &claims.sub, request.into_inner()).await {
        Ok(worker) => {
            log::info!("✅ Worker registered: {}", worker.id);
            record_response(StatusCode::CREATED, "worker", &worker)
        }
        Err(e) => failure("POST /workers", e),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/workers",
    tag = "Workforce",
    params(WorkerFilter),
    responses((status = 200, description = "Workers", body = [Worker])),
    security(("bearer_auth" = []))
)]
pub async fn list_workers(state: web::Data<AppState>, filter: web::Query<WorkerFilter>) -> HttpResponse {
    log::info!("📋 GET /workers");

    match crud::list::<Worker, _>(&state, &filter.into_inner(), SortBy::asc("name")).await {
        Ok(workers) => list_response("workers", &workers),
        Err(e) => failure("GET /workers", e),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/workers/{id}",
    tag = "Workforce",
    params(("id" = String, Path, description = "Worker id")),
    responses(
        (status = 200, description = "Worker found", body = Worker),
        (status = 404, description = "Worker not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_worker(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let id = path.into_inner();

    match crud::get::<Worker>(&state, &id).await {
        Ok(worker) => record_response(StatusCode::OK, "worker", &worker),
        Err(e) => failure("GET /workers/{id}", e),
    }
}

#[utoipa::path(
    patch,
    path = "/api/v1/workers/{id}",
    tag = "Workforce",
    params(("id" = String, Path, description = "Worker id")),
    request_body = UpdateWorkerRequest,
    responses(
        (status = 200, description = "Worker updated", body = Worker),
        (status = 400, description = "Invalid changes"),
        (status = 404, description = "Worker not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_worker(
    state: web::Data<AppState>,
    path: web::Path<String>,
    request: web::Json<UpdateWorkerRequest>,
) -> HttpResponse {
    let id = path.into_inner();
    log::info!("✏️ PATCH /workers/{}", id);

    match crud::update::<Worker, _>(&state, &id, request.into_inner()).await {
        Ok(worker) => record_response(StatusCode::OK, "worker", &worker),
        Err(e) => failure("PATCH /workers/{id}", e),
    }
}
