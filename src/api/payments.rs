use actix_web::{http::StatusCode, web, HttpResponse};

use super::{failure, list_response, record_response};
use crate::database::SortBy;
use crate::models::{CreatePaymentRequest, Payment, PaymentFilter, UpdatePaymentRequest};
use crate::services::auth_service::Claims;
use crate::services::crud;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/v1/payments",
    tag = "Finance",
    request_body = CreatePaymentRequest,
    responses(
        (status = 201, description = "Payment recorded", body = Payment),
        (status = 400, description = "Invalid payment")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_payment(
    state: web::Data<AppState>,
    claims: web::ReqData<Claims>,
    request: web::Json<CreatePaymentRequest>,
) -> HttpResponse {
    log::info!(
        "💰 POST /payments - {:.2} ({:?}, {:?}) for project {}",
        request.amount,
        request.category,
        request.method,
        request.project_id
    );

    match crud::create(&state, &claims.sub, request.into_inner()).await {
        Ok(payment) => {
            log::info!("✅ Payment recorded: {}", payment.id);
            record_response(StatusCode::CREATED, "payment", &payment)
        }
        Err(e) => failure("POST /payments", e),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/payments",
    tag = "Finance",
    params(PaymentFilter),
    responses((status = 200, description = "Payments, newest first", body = [Payment])),
    security(("bearer_auth" = []))
)]
pub async fn list_payments(state: web::Data<AppState>, filter: web::Query<PaymentFilter>) -> HttpResponse {
    log::info!("📋 GET /payments");

    match crud::list::<Payment, _>(&state, &filter.into_inner(), SortBy::desc("created_at")).await {
        Ok(payments) => list_response("payments", &payments),
        Err(e) => failure("GET /payments", e),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/payments/{id}",
    tag = "Finance",
    params(("id" = String, Path, description = "Payment id")),
    responses(
        (status = 200, description = "Payment found", body = Payment),
        (status = 404, description = "Payment not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_payment(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let id = path.into_inner();

    match crud::get::<Payment>(&state, &id).await {
        Ok(payment) => record_response(StatusCode::OK, "payment", &payment),
        Err(e) => failure("GET /payments/{id}", e),
    }
}

#[utoipa::path(
    patch,
    path = "/api/v1/payments/{id}",
    tag = "Finance",
    params(("id" = String, Path, description = "Payment id")),
    request_body = UpdatePaymentRequest,
    responses(
        (status = 200, description = "Payment updated", body = Payment),
        (status = 400, description = "Invalid changes"),
        (status = 404, description = "Payment not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_payment(
    state: web::Data<AppState>,
    path: web::Path<String>,
    request: web::Json<UpdatePaymentRequest>,
) -> HttpResponse {
    let id = path.into_inner();
    log::info!("✏️ PATCH /payments/{}", id);

    match crud::update::<Payment, _>(&state, &id, request.into_inner()).await {
        Ok(payment) => {
            log::info!("✅ Payment {} is now {:?}", payment.id, payment.data.status);
            record_response(StatusCode::OK, "payment", &payment)
        }
        Err(e) => failure("PATCH /payments/{id}", e),
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
    async fn booking_payment_is_recorded_and_completed() {
        let state = test_state();
        let (accountant, token) = user_with_token(&state, "accounts@example.com", UserRole::Manager).await;
        let mut events = state.events.subscribe();
        let app = test::init_service(
            App::new().app_data(web::Data::new(state.clone())).configure(routes::configure),
        )
        .await;

        let project = ObjectId::new().to_hex();
        let lead = ObjectId::new().to_hex();
        let req = test::TestRequest::post()
            .uri("/api/v1/payments")
            .insert_header(bearer(&token))
            .set_json(json!({
                "project_id": project,
                "lead_id": lead,
                "amount": 250000,
                "category": "booking_amount",
                "method": "bank_transfer"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["payment"]["status"], "pending");
        assert_eq!(body["payment"]["recorded_by"], accountant.id.to_hex());
        let id = body["payment"]["_id"].as_str().unwrap().to_string();

        let req = test::TestRequest::patch()
            .uri(&format!("/api/v1/payments/{}", id))
            .insert_header(bearer(&token))
            .set_json(json!({"status": "completed"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["payment"]["status"], "completed");

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/payments?lead_id={}&status=completed", lead))
            .insert_header(bearer(&token))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["count"], 1);

        let names: Vec<String> = events.drain().into_iter().map(|e| e.event).collect();
        assert_eq!(names, vec!["payment.created", "payment.updated"]);
    }

    #[actix_rt::test]
    async fn zero_amount_is_400() {
        let state = test_state();
        let (_, token) = user_with_token(&state, "accounts@example.com", UserRole::Manager).await;
        let app = test::init_service(
            App::new().app_data(web::Data::new(state)).configure(routes::configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/payments")
            .insert_header(bearer(&token))
            .set_json(json!({
                "project_id": ObjectId::new().to_hex(),
                "amount": 0,
                "category": "labour",
                "method": "cash"
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 400);
    }
}
