use actix_web::{http::StatusCode, web, HttpResponse};

use super::{failure, list_response, record_response};
use crate::database::SortBy;
use crate::models::{CreateSiteLogRequest, SiteLog, SiteLogFilter, UpdateSiteLogRequest};
use crate::services::auth_service::Claims;
use crate::services::crud;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/v1/site-logs",
    tag = "Site",
    request_body = CreateSiteLogRequest,
    responses(
        (status = 201, description = "Site log written", body = SiteLog),
        (status = 400, description = "Invalid site log")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_site_log(
    state: web::Data<AppState>,
    claims: web::ReqData<Claims>,
    request: web::Json<CreateSiteLogRequest>,
) -> HttpResponse {
    log::info!("📓 POST /site-logs - project {} ({} photos)", request.project_id, request.photos.len());

    match crud::create(&state, &claims.sub, request.into_inner()).await {
        Ok(site_log) => record_response(StatusCode::CREATED, "site_log", &site_log),
        Err(e) => failure("POST /site-logs", e),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/site-logs",
    tag = "Site",
    params(SiteLogFilter),
    responses((status = 200, description = "Site logs, latest day first", body = [SiteLog])),
    security(("bearer_auth" = []))
)]
pub async fn list_site_logs(state: web::Data<AppState>, filter: web::Query<SiteLogFilter>) -> HttpResponse {
    log::info!("📋 GET /site-logs");

    match crud::list::<SiteLog, _>(&state, &filter.into_inner(), SortBy::desc("date")).await {
        Ok(logs) => list_response("site_logs", &logs),
        Err(e) => failure("GET /site-logs", e),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/site-logs/{id}",
    tag = "Site",
    params(("id" = String, Path, description = "Site log id")),
    responses(
        (status = 200, description = "Site log found", body = SiteLog),
        (status = 404, description = "Site log not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_site_log(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let id = path.into_inner();

    match crud::get::<SiteLog>(&state, &id).await {
        Ok(site_log) => record_response(StatusCode::OK, "site_log", &site_log),
        Err(e) => failure("GET /site-logs/{id}", e),
    }
}

#[utoipa::path(
    patch,
    path = "/api/v1/site-logs/{id}",
    tag = "Site",
    params(("id" = String, Path, description = "Site log id")),
    request_body = UpdateSiteLogRequest,
    responses(
        (status = 200, description = "Site log updated", body = SiteLog),
        (status = 400, description = "Invalid changes"),
        (status = 404, description = "Site log not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_site_log(
    state: web::Data<AppState>,
    path: web::Path<String>,
    request: web::Json<UpdateSiteLogRequest>,
) -> HttpResponse {
    let id = path.into_inner();
    log::info!("✏️ PATCH /site-logs/{}", id);

    match crud::update::<SiteLog, _>(&state, &id, request.into_inner()).await {
        Ok(site_log) => record_response(StatusCode::OK, "site_log", &site_log),
        Err(e) => failure("PATCH /site-logs/{id}", e),
    }
}

#[cfg(test)]
mod tests {
    use crate::api::routes;
    use crate::models::UserRole;
    use crate::test_support::{bearer, test_state, user_with_token};
    use actix_web::{test, web, App};
    use mongodb::bson::oid::ObjectId;
    use serde_json::{json, Value};

    #[actix_rt::test]
    async fn logs_are_newest_day_first() {
        let state = test_state();
        let (_, token) = user_with_token(&state, "site@example.com", UserRole::SiteEngineer).await;
        let app = test::init_service(
            App::new().app_data(web::Data::new(state)).configure(routes::configure),
        )
        .await;

        let project = ObjectId::new().to_hex();
        for (date, work) in [("2025-03-01", "Shuttering for slab"), ("2025-03-03", "Slab concreting")] {
            let req = test::TestRequest::post()
                .uri("/api/v1/site-logs")
                .insert_header(bearer(&token))
                .set_json(json!({"project_id": project, "date": date, "work_done": work, "workers_present": 18}))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), 201);
        }

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/site-logs?project_id={}", project))
            .insert_header(bearer(&token))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["count"], 2);
        assert_eq!(body["site_logs"][0]["date"], "2025-03-03");
        assert_eq!(body["site_logs"][0]["work_done"], "Slab concreting");
    }

    #[actix_rt::test]
    async fn non_url_photos_and_blank_work_are_400() {
        let state = test_state();
        let (_, token) = user_with_token(&state, "site@example.com", UserRole::SiteEngineer).await;
        let app = test::init_service(
            App::new().app_data(web::Data::new(state)).configure(routes::configure),
        )
        .await;

        let project = ObjectId::new().to_hex();
        for payload in [
            json!({"project_id": project, "work_done": "Plastering", "photos": ["C:/site/img1.jpg"]}),
            json!({"project_id": project, "work_done": "   "}),
        ] {
            let req = test::TestRequest::post()
                .uri("/api/v1/site-logs")
                .insert_header(bearer(&token))
                .set_json(payload)
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), 400);
        }
    }
}
