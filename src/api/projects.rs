use actix_web::{http::StatusCode, web, HttpResponse};

use super::{failure, list_response, record_response};
use crate::database::SortBy;
use crate::models::{CreateProjectRequest, Project, ProjectFilter, UpdateProjectRequest};
use crate::services::auth_service::Claims;
use crate::services::{crud, project_service};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/v1/projects",
    tag = "Projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created", body = Project),
        (status = 400, description = "Invalid project"),
        (status = 409, description = "A project with this name already exists")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_project(
    state: web::Data<AppState>,
    claims: web::ReqData<Claims>,
    request: web::Json<CreateProjectRequest>,
) -> HttpResponse {
    log::info!("🏗️ POST /projects - {}", request.name);

    match crud::create(&state, &claims.sub, request.into_inner()).await {
        Ok(project) => {
            log::info!("✅ Project created: {} ({})", project.data.name, project.id);
            record_response(StatusCode::CREATED, "project", &project)
        }
        Err(e) => failure("POST /projects", e),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/projects",
    tag = "Projects",
    params(ProjectFilter),
    responses((status = 200, description = "Projects, newest first", body = [Project])),
    security(("bearer_auth" = []))
)]
pub async fn list_projects(state: web::Data<AppState>, filter: web::Query<ProjectFilter>) -> HttpResponse {
    log::info!("📋 GET /projects");

    match crud::list::<Project, _>(&state, &filter.into_inner(), SortBy::desc("created_at")).await {
        Ok(projects) => list_response("projects", &projects),
        Err(e) => failure("GET /projects", e),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}",
    tag = "Projects",
    params(("id" = String, Path, description = "Project id")),
    responses(
        (status = 200, description = "Project found", body = Project),
        (status = 404, description = "Project not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_project(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let id = path.into_inner();
    log::info!("🔍 GET /projects/{}", id);

    match crud::get::<Project>(&state, &id).await {
        Ok(project) => record_response(StatusCode::OK, "project", &project),
        Err(e) => failure("GET /projects/{id}", e),
    }
}

#[utoipa::path(
    patch,
    path = "/api/v1/projects/{id}",
    tag = "Projects",
    params(("id" = String, Path, description = "Project id")),
    request_body = UpdateProjectRequest,
    responses(
        (status = 200, description = "Project updated", body = Project),
        (status = 400, description = "Invalid changes (e.g. sold_units above total_units)"),
        (status = 404, description = "Project not found"),
        (status = 409, description = "A project with this name already exists")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_project(
    state: web::Data<AppState>,
    path: web::Path<String>,
    request: web::Json<UpdateProjectRequest>,
) -> HttpResponse {
    let id = path.into_inner();
    log::info!("✏️ PATCH /projects/{}", id);

    match project_service::update(&state, &id, request.into_inner()).await {
        Ok(project) => {
            log::info!(
                "✅ Project updated: {} ({}/{} units sold)",
                project.data.name,
                project.data.sold_units,
                project.data.total_units
            );
            record_response(StatusCode::OK, "project", &project)
        }
        Err(e) => failure("PATCH /projects/{id}", e),
    }
}
