use actix_web::{http::StatusCode, web, HttpResponse};

use super::{failure, list_response, record_response};
use crate::database::SortBy;
use crate::models::{CreateMilestoneRequest, Milestone, MilestoneFilter, UpdateMilestoneRequest};
use crate::services::auth_service::Claims;
use crate::services::{crud, milestone_service};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/v1/milestones",
    tag = "Projects",
    request_body = CreateMilestoneRequest,
    responses(
        (status = 201, description = "Milestone created", body = Milestone),
        (status = 400, description = "Invalid milestone")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_milestone(
    state: web::Data<AppState>,
    claims: web::ReqData<Claims>,
    request: web::Json<CreateMilestoneRequest>,
) -> HttpResponse {
    log::info!("🎯 POST /milestones - {} ({})", request.title, request.project_id);

    match crud::create(&state, &claims.sub, request.into_inner()).await {
        Ok(milestone) => record_response(StatusCode::CREATED, "milestone", &milestone),
        Err(e) => failure("POST /milestones", e),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/milestones",
    tag = "Projects",
    params(MilestoneFilter),
    responses((status = 200, description = "Milestones by due date", body = [Milestone])),
    security(("bearer_auth" = []))
)]
pub async fn list_milestones(state: web::Data<AppState>, filter: web::Query<MilestoneFilter>) -> HttpResponse {
    log::info!("📋 GET /milestones");

    match crud::list::<Milestone, _>(&state, &filter.into_inner(), SortBy::asc("due_date")).await {
        Ok(milestones) => list_response("milestones", &milestones),
        Err(e) => failure("GET /milestones", e),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/milestones/{id}",
    tag = "Projects",
    params(("id" = String, Path, description = "Milestone id")),
    responses(
        (status = 200, description = "Milestone found", body = Milestone),
        (status = 404, description = "Milestone not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_milestone(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let id = path.into_inner();

    match crud::get::<Milestone>(&state, &id).await {
        Ok(milestone) => record_response(StatusCode::OK, "milestone", &milestone),
        Err(e) => failure("GET /milestones/{id}", e),
    }
}

#[utoipa::path(
    patch,
    path = "/api/v1/milestones/{id}",
    tag = "Projects",
    params(("id" = String, Path, description = "Milestone id")),
    request_body = UpdateMilestoneRequest,
    responses(
        (status = 200, description = "Milestone updated", body = Milestone),
        (status = 400, description = "Invalid changes"),
        (status = 404, description = "Milestone not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_milestone(
    state: web::Data<AppState>,
    path: web::Path<String>,
    request: web::Json<UpdateMilestoneRequest>,
) -> HttpResponse {
    let id = path.into_inner();
    log::info!("✏️ PATCH /milestones/{}", id);

    match milestone_service::update(&state, &id, request.into_inner()).await {
        Ok(milestone) => {
            log::info!(
                "✅ Milestone {} at {}% ({:?})",
                milestone.id,
                milestone.data.progress,
                milestone.data.status
            );
            record_response(StatusCode::OK, "milestone", &milestone)
        }
        Err(e) => failure("PATCH /milestones/{id}", e),
    }
}
