use actix_web::{http::StatusCode, web, HttpResponse};

use super::{failure, list_response, record_response};
use crate::database::SortBy;
use crate::models::{CreateLeadRequest, Lead, LeadFilter, UpdateLeadRequest};
use crate::services::auth_service::Claims;
use crate::services::crud;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/v1/leads",
    tag = "Leads",
    request_body = CreateLeadRequest,
    responses(
        (status = 201, description = "Lead created", body = Lead),
        (status = 400, description = "Invalid lead")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_lead(
    state: web::Data<AppState>,
    claims: web::ReqData<Claims>,
    request: web::Json<CreateLeadRequest>,
) -> HttpResponse {
    log::info!("📇 POST /leads - {} ({})", request.name, request.phone);

    match crud::create(&state, &claims.sub, request.into_inner()).await {
        Ok(lead) => {
            log::info!("✅ Lead created: {}", lead.id);
            record_response(StatusCode::CREATED, "lead", &lead)
        }
        Err(e) => failure("POST /leads", e),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/leads",
    tag = "Leads",
    params(LeadFilter),
    responses((status = 200, description = "Leads, newest first", body = [Lead])),
    security(("bearer_auth" = []))
)]
pub async fn list_leads(state: web::Data<AppState>, filter: web::Query<LeadFilter>) -> HttpResponse {
    log::info!("📋 GET /leads");

    match crud::list::<Lead, _>(&state, &filter.into_inner(), SortBy::desc("created_at")).await {
        Ok(leads) => list_response("leads", &leads),
        Err(e) => failure("GET /leads", e),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/leads/{id}",
    tag = "Leads",
    params(("id" = String, Path, description = "Lead id")),
    responses(
        (status = 200, description = "Lead found", body = Lead),
        (status = 404, description = "Lead not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_lead(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let id = path.into_inner();
    log::info!("🔍 GET /leads/{}", id);

    match crud::get::<Lead>(&state, &id).await {
        Ok(lead) => record_response(StatusCode::OK, "lead", &lead),
        Err(e) => failure("GET /leads/{id}", e),
    }
}

#[utoipa::path(
    patch,
    path = "/api/v1/leads/{id}",
    tag = "Leads",
    params(("id" = String, Path, description = "Lead id")),
    request_body = UpdateLeadRequest,
    responses(
        (status = 200, description = "Lead updated", body = Lead),
        (status = 400, description = "Invalid changes"),
        (status = 404, description = "Lead not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_lead(
    state: web::Data<AppState>,
    path: web::Path<String>,
    request: web::Json<UpdateLeadRequest>,
) -> HttpResponse {
    let id = path.into_inner();
    log::info!("✏️ PATCH /leads/{}", id);

    match crud::update::<Lead, _>(&state, &id, request.into_inner()).await {
        Ok(lead) => {
            log::info!("✅ Lead updated: {} ({:?})", lead.id, lead.data.status);
            record_response(StatusCode::OK, "lead", &lead)
        }
        Err(e) => failure("PATCH /leads/{id}", e),
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
    async fn lead_lifecycle_over_http() {
        let state = test_state();
        let (_, token) = user_with_token(&state, "sales@example.com", UserRole::Sales).await;
        let mut events = state.events.subscribe();
        let app = test::init_service(
            App::new().app_data(web::Data::new(state.clone())).configure(routes::configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/leads")
            .insert_header(bearer(&token))
            .set_json(json!({"name": "Priya Nair", "phone": "+91 98450 12345", "source": "walk_in"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["lead"]["status"], "new");
        let id = body["lead"]["_id"].as_str().unwrap().to_string();

        let req = test::TestRequest::patch()
            .uri(&format!("/api/v1/leads/{}", id))
            .insert_header(bearer(&token))
            .set_json(json!({"status": "site_visit_scheduled"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["lead"]["status"], "site_visit_scheduled");

        let req = test::TestRequest::get()
            .uri("/api/v1/leads?status=site_visit_scheduled")
            .insert_header(bearer(&token))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["count"], 1);

        let names: Vec<String> = events.drain().into_iter().map(|e| e.event).collect();
        assert_eq!(names, vec!["lead.created", "lead.updated"]);
    }

    #[actix_rt::test]
    async fn missing_fields_and_bad_enums_are_400() {
        let state = test_state();
        let (_, token) = user_with_token(&state, "sales@example.com", UserRole::Sales).await;
        let mut events = state.events.subscribe();
        let app = test::init_service(
            App::new().app_data(web::Data::new(state.clone())).configure(routes::configure),
        )
        .await;

        for payload in [
            json!({"name": "No phone", "source": "website"}),
            json!({"name": "Bad source", "phone": "9845012345", "source": "billboard"}),
            json!({"name": "", "phone": "9845012345", "source": "website"}),
        ] {
            let req = test::TestRequest::post()
                .uri("/api/v1/leads")
                .insert_header(bearer(&token))
                .set_json(payload)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), 400);
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["success"], false);
        }
        assert!(events.drain().is_empty());
    }

    #[actix_rt::test]
    async fn unknown_and_malformed_ids() {
        let state = test_state();
        let (_, token) = user_with_token(&state, "sales@example.com", UserRole::Sales).await;
        let app = test::init_service(
            App::new().app_data(web::Data::new(state)).configure(routes::configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/v1/leads/000000000000000000000000")
            .insert_header(bearer(&token))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 404);

        let req = test::TestRequest::get()
            .uri("/api/v1/leads/not-an-id")
            .insert_header(bearer(&token))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 400);

        let req = test::TestRequest::get().uri("/api/v1/leads").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 401);
    }
}
