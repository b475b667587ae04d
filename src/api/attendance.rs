use actix_web::{http::StatusCode, web, HttpResponse};

use super::{failure, list_response, record_response};
use crate::database::SortBy;
use crate::models::{Attendance, AttendanceFilter, CreateAttendanceRequest, UpdateAttendanceRequest};
use crate::services::auth_service::Claims;
use crate::services::{attendance_service, crud};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/v1/attendance",
    tag = "Workforce",
    request_body = CreateAttendanceRequest,
    responses(
        (status = 201, description = "Attendance marked", body = Attendance),
        (status = 400, description = "Invalid attendance"),
        (status = 404, description = "Worker not found"),
        (status = 409, description = "Attendance already marked for this worker and date")
    ),
    security(("bearer_auth" = []))
)]
pub async fn mark_attendance(
    state: web::Data<AppState>,
    claims: web::ReqData<Claims>,
    request: web::Json<CreateAttendanceRequest>,
) -> HttpResponse {
    log::info!(
        "🗓️ POST /attendance - worker {} on {} ({:?})",
        request.worker_id,
        request.date,
        request.status
    );

    match attendance_service::mark(&state, &claims.sub, request.into_inner()).await {
        Ok(attendance) => {
            log::info!("✅ Attendance marked: {} wage {:.2}", attendance.id, attendance.data.wage);
            record_response(StatusCode::CREATED, "attendance", &attendance)
        }
        Err(e) => failure("POST /attendance", e),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    tag = "Workforce",
    params(AttendanceFilter),
    responses((status = 200, description = "Attendance marks, latest day first", body = [Attendance])),
    security(("bearer_auth" = []))
)]
pub async fn list_attendance(state: web::Data<AppState>, filter: web::Query<AttendanceFilter>) -> HttpResponse {
    log::info!("📋 GET /attendance");

    match crud::list::<Attendance, _>(&state, &filter.into_inner(), SortBy::desc("date")).await {
        Ok(marks) => list_response("attendance", &marks),
        Err(e) => failure("GET /attendance", e),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/attendance/{id}",
    tag = "Workforce",
    params(("id" = String, Path, description = "Attendance id")),
    responses(
        (status = 200, description = "Attendance found", body = Attendance),
        (status = 404, description = "Attendance not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_attendance(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let id = path.into_inner();

    match crud::get::<Attendance>(&state, &id).await {
        Ok(attendance) => record_response(StatusCode::OK, "attendance", &attendance),
        Err(e) => failure("GET /attendance/{id}", e),
    }
}

#[utoipa::path(
    patch,
    path = "/api/v1/attendance/{id}",
    tag = "Workforce",
    params(("id" = String, Path, description = "Attendance id")),
    request_body = UpdateAttendanceRequest,
    responses(
        (status = 200, description = "Attendance updated", body = Attendance),
        (status = 400, description = "Invalid changes"),
        (status = 404, description = "Attendance not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_attendance(
    state: web::Data<AppState>,
    path: web::Path<String>,
    request: web::Json<UpdateAttendanceRequest>,
) -> HttpResponse {
    let id = path.into_inner();
    log::info!("✏️ PATCH /attendance/{}", id);

    match crud::update::<Attendance, _>(&state, &id, request.into_inner()).await {
        Ok(attendance) => record_response(StatusCode::OK, "attendance", &attendance),
        Err(e) => failure("PATCH /attendance/{id}", e),
    }
}
