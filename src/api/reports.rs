use actix_web::{http::StatusCode, web, HttpResponse};

use super::{failure, list_response, record_response};
use crate::database::SortBy;
use crate::models::{CreateReportRequest, Report, ReportFilter, UpdateReportRequest};
use crate::services::auth_service::Claims;
use crate::services::{crud, report_service};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/v1/reports",
    tag = "Reports",
    request_body = CreateReportRequest,
    responses(
        (status = 201, description = "Report stored", body = Report),
        (status = 400, description = "Invalid report")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_report(
    state: web::Data<AppState>,
    claims: web::ReqData<Claims>,
    request: web::Json<CreateReportRequest>,
) -> HttpResponse {
    log::info!("📊 POST /reports - {} ({:?})", request.title, request.report_type);

    match crud::create(&state, &claims.sub, request.into_inner()).await {
        Ok(report) => record_response(StatusCode::CREATED, "report", &report),
        Err(e) => failure("POST /reports", e),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/reports",
    tag = "Reports",
    params(ReportFilter),
    responses((status = 200, description = "Reports, newest first", body = [Report])),
    security(("bearer_auth" = []))
)]
pub async fn list_reports(state: web::Data<AppState>, filter: web::Query<ReportFilter>) -> HttpResponse {
    log::info!("📋 GET /reports");

    match crud::list::<Report, _>(&state, &filter.into_inner(), SortBy::desc("created_at")).await {
        Ok(reports) => list_response("reports", &reports),
        Err(e) => failure("GET /reports", e),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/reports/{id}",
    tag = "Reports",
    params(("id" = String, Path, description = "Report id")),
    responses(
        (status = 200, description = "Report found", body = Report),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_report(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let id = path.into_inner();

    match crud::get::<Report>(&state, &id).await {
        Ok(report) => record_response(StatusCode::OK, "report", &report),
        Err(e) => failure("GET /reports/{id}", e),
    }
}

#[utoipa::path(
    patch,
    path = "/api/v1/reports/{id}",
    tag = "Reports",
    params(("id" = String, Path, description = "Report id")),
    request_body = UpdateReportRequest,
    responses(
        (status = 200, description = "Report updated", body = Report),
        (status = 400, description = "Invalid changes"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_report(
    state: web::Data<AppState>,
    path: web::Path<String>,
    request: web::Json<UpdateReportRequest>,
) -> HttpResponse {
    let id = path.into_inner();
    log::info!("✏️ PATCH /reports/{}", id);

    match report_service::update(&state, &id, request.into_inner()).await {
        Ok(report) => record_response(StatusCode::OK, "report", &report),
        Err(e) => failure("PATCH /reports/{id}", e),
    }
}

#[cfg(test)]
mod tests {
    use crate::api::routes;
    use crate::models::UserRole;
    use crate::test_support::{bearer, test_state, user_with_token};
    use actix_web::{test, web, App};
    use serde_json::{json, Value};

    #[actix_rt::test]
    async fn report_period_is_enforced_on_create_and_update() {
        let state = test_state();
        let (_, token) = user_with_token(&state, "pm@example.com", UserRole::Manager).await;
        let app = test::init_service(
            App::new().app_data(web::Data::new(state)).configure(routes::configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/reports")
            .insert_header(bearer(&token))
            .set_json(json!({"title": "Q1 sales", "report_type": "sales", "period_start": "2025-04-01", "period_end": "2025-03-31"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 400);

        let req = test::TestRequest::post()
            .uri("/api/v1/reports")
            .insert_header(bearer(&token))
            .set_json(json!({"title": "Q1 sales", "report_type": "sales", "period_start": "2025-01-01", "period_end": "2025-03-31"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);
        let body: Value = test::read_body_json(resp).await;
        let id = body["report"]["_id"].as_str().unwrap().to_string();

        let req = test::TestRequest::patch()
            .uri(&format!("/api/v1/reports/{}", id))
            .insert_header(bearer(&token))
            .set_json(json!({"period_start": "2025-06-01"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 400);

        let req = test::TestRequest::get()
            .uri("/api/v1/reports?report_type=sales")
            .insert_header(bearer(&token))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["count"], 1);
        assert_eq!(body["reports"][0]["period_start"], "2025-01-01");
    }
}
