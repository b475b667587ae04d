use actix_web::{http::StatusCode, web, HttpResponse};

use super::{failure, list_response, record_response};
use crate::models::{CreateNotificationRequest, Notification, NotificationQuery};
use crate::services::auth_service::Claims;
use crate::services::notification_service;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/v1/notifications",
    tag = "Notifications",
    request_body = CreateNotificationRequest,
    responses(
        (status = 201, description = "Notification sent", body = Notification),
        (status = 400, description = "Invalid notification")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_notification(
    state: web::Data<AppState>,
    claims: web::ReqData<Claims>,
    request: web::Json<CreateNotificationRequest>,
) -> HttpResponse {
    log::info!(
        "🔔 POST /notifications - {} to {}",
        request.title,
        request.user_id.as_deref().unwrap_or("everyone")
    );

    match notification_service::create(&state, &claims.sub, request.into_inner()).await {
        Ok(notification) => record_response(StatusCode::CREATED, "notification", &notification),
        Err(e) => failure("POST /notifications", e),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    tag = "Notifications",
    params(NotificationQuery),
    responses((status = 200, description = "Caller's notifications and broadcasts, newest first (max 100)", body = [Notification])),
    security(("bearer_auth" = []))
)]
pub async fn list_notifications(
    state: web::Data<AppState>,
    claims: web::ReqData<Claims>,
    query: web::Query<NotificationQuery>,
) -> HttpResponse {
    log::info!("📋 GET /notifications - user {} (unread_only={})", claims.sub, query.unread_only);

    match notification_service::list_for(&state, &claims.sub, query.unread_only).await {
        Ok(notifications) => list_response("notifications", &notifications),
        Err(e) => failure("GET /notifications", e),
    }
}

#[utoipa::path(
    patch,
    path = "/api/v1/notifications/{id}/read",
    tag = "Notifications",
    params(("id" = String, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Notification marked read", body = Notification),
        (status = 404, description = "Notification not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn mark_notification_read(
    state: web::Data<AppState>,
    claims: web::ReqData<Claims>,
    path: web::Path<String>,
) -> HttpResponse {
    let id = path.into_inner();

    match notification_service::mark_read(&state, &claims.sub, &id).await {
        Ok(notification) => record_response(StatusCode::OK, "notification", &notification),
        Err(e) => failure("PATCH /notifications/{id}/read", e),
    }
}

#[utoipa::path(
    patch,
    path = "/api/v1/notifications/read-all",
    tag = "Notifications",
    responses((status = 200, description = "Number of notifications marked read")),
    security(("bearer_auth" = []))
)]
pub async fn mark_all_notifications_read(state: web::Data<AppState>, claims: web::ReqData<Claims>) -> HttpResponse {
    match notification_service::mark_all_read(&state, &claims.sub).await {
        Ok(updated) => {
            log::info!("✅ {} notifications marked read for {}", updated, claims.sub);
            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "updated": updated
            }))
        }
        Err(e) => failure("PATCH /notifications/read-all", e),
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
    async fn inbox_flow() {
        let state = test_state();
        let (me, token) = user_with_token(&state, "sales@example.com", UserRole::Sales).await;
        let (_, other_token) = user_with_token(&state, "pm@example.com", UserRole::Manager).await;
        let app = test::init_service(
            App::new().app_data(web::Data::new(state.clone())).configure(routes::configure),
        )
        .await;

        for (title, user_id) in [("Follow up Priya", Some(me.id.to_hex())), ("Office closed Friday", None)] {
            let req = test::TestRequest::post()
                .uri("/api/v1/notifications")
                .insert_header(bearer(&other_token))
                .set_json(json!({"title": title, "message": "see details", "kind": "system", "user_id": user_id}))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), 201);
        }

        let req = test::TestRequest::get()
            .uri("/api/v1/notifications?unread_only=true")
            .insert_header(bearer(&token))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["count"], 2);

        let req = test::TestRequest::get()
            .uri("/api/v1/notifications")
            .insert_header(bearer(&other_token))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["count"], 1);

        let req = test::TestRequest::patch()
            .uri("/api/v1/notifications/read-all")
            .insert_header(bearer(&token))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["updated"], 1);
    }
}
