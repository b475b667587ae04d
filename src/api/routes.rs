use actix_web::{
    error::{JsonPayloadError, QueryPayloadError},
    web, Error, HttpRequest,
};

use super::*;
use crate::middleware::AuthMiddleware;
use crate::utils::AppError;

/// Registers every route plus the JSON/query extractor error handlers.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        // Public
        .route("/health", web::get().to(health::health_check))
        .route("/metrics", web::get().to(metrics::get_metrics))
        .route("/ws", web::get().to(ws::connect))
        .route("/r/{source}", web::get().to(redirects::resolve_redirect))
        .service(
            web::scope("/api/v1/auth")
                .route("/login", web::post().to(auth::login))
                .route("/register", web::post().to(auth::register))
                .route("/refresh", web::post().to(auth::refresh_token))
                .route("/verify", web::get().to(auth::verify_token))
                .service(web::resource("/me").wrap(AuthMiddleware).route(web::get().to(auth::get_me))),
        )
        // Everything below requires a Bearer access token
        .service(
            web::scope("/api/v1")
                .wrap(AuthMiddleware)
                .service(
                    web::scope("/leads")
                        .route("", web::get().to(leads::list_leads))
                        .route("", web::post().to(leads::create_lead))
                        .route("/{id}", web::get().to(leads::get_lead))
                        .route("/{id}", web::patch().to(leads::update_lead)),
                )
                .service(
                    web::scope("/projects")
                        .route("", web::get().to(projects::list_projects))
                        .route("", web::post().to(projects::create_project))
                        .route("/{id}", web::get().to(projects::get_project))
                        .route("/{id}", web::patch().to(projects::update_project)),
                )
                .service(
                    web::scope("/workers")
                        .route("", web::get().to(workers::list_workers))
                        .route("", web::post().to(workers::create_worker))
                        .route("/{id}", web::get().to(workers::get_worker))
                        .route("/{id}", web::patch().to(workers::update_worker)),
                )
                .service(
                    web::scope("/attendance")
                        .route("", web::get().to(attendance::list_attendance))
                        .route("", web::post().to(attendance::mark_attendance))
                        .route("/{id}", web::get().to(attendance::get_attendance))
                        .route("/{id}", web::patch().to(attendance::update_attendance)),
                )
                .service(
                    web::scope("/payments")
                        .route("", web::get().to(payments::list_payments))
                        .route("", web::post().to(payments::create_payment))
                        .route("/{id}", web::get().to(payments::get_payment))
                        .route("/{id}", web::patch().to(payments::update_payment)),
                )
                .service(
                    web::scope("/milestones")
                        .route("", web::get().to(milestones::list_milestones))
                        .route("", web::post().to(milestones::create_milestone))
                        .route("/{id}", web::get().to(milestones::get_milestone))
                        .route("/{id}", web::patch().to(milestones::update_milestone)),
                )
                .service(
                    web::scope("/materials")
                        .route("", web::get().to(materials::list_materials))
                        .route("", web::post().to(materials::create_material))
                        .route("/{id}", web::get().to(materials::get_material))
                        .route("/{id}", web::patch().to(materials::update_material)),
                )
                .service(
                    web::scope("/site-logs")
                        .route("", web::get().to(site_logs::list_site_logs))
                        .route("", web::post().to(site_logs::create_site_log))
                        .route("/{id}", web::get().to(site_logs::get_site_log))
                        .route("/{id}", web::patch().to(site_logs::update_site_log)),
                )
                .service(
                    web::scope("/site-visits")
                        .route("", web::get().to(site_visits::list_site_visits))
                        .route("", web::post().to(site_visits::create_site_visit))
                        .route("/{id}", web::get().to(site_visits::get_site_visit))
                        .route("/{id}", web::patch().to(site_visits::update_site_visit)),
                )
                .service(
                    web::scope("/reports")
                        .route("", web::get().to(reports::list_reports))
                        .route("", web::post().to(reports::create_report))
                        .route("/{id}", web::get().to(reports::get_report))
                        .route("/{id}", web::patch().to(reports::update_report)),
                )
                .service(
                    web::scope("/redirects")
                        .route("", web::get().to(redirects::list_redirects))
                        .route("", web::post().to(redirects::create_redirect))
                        .route("/{id}", web::get().to(redirects::get_redirect))
                        .route("/{id}", web::patch().to(redirects::update_redirect)),
                )
                .service(
                    web::scope("/notifications")
                        .route("", web::get().to(notifications::list_notifications))
                        .route("", web::post().to(notifications::create_notification))
                        .route("/read-all", web::patch().to(notifications::mark_all_notifications_read))
                        .route("/{id}/read", web::patch().to(notifications::mark_notification_read)),
                )
                .service(
                    web::scope("/ai")
                        .route("/query", web::post().to(ai::query))
                        .route("/summarize", web::post().to(ai::summarize)),
                ),
        );
}

fn json_error(err: JsonPayloadError, req: &HttpRequest) -> Error {
    log::warn!("⚠️ {} {} bad JSON body: {}", req.method(), req.path(), err);
    match err {
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            AppError::PayloadTooLarge("Request body is too large".to_string()).into()
        }
        other => AppError::Validation(other.to_string()).into(),
    }
}

fn query_error(err: QueryPayloadError, req: &HttpRequest) -> Error {
    log::warn!("⚠️ {} {} bad query string: {}", req.method(), req.path(), err);
    AppError::Validation(err.to_string()).into()
}

#[cfg(test)]
mod tests {
    use super::configure;
    use crate::models::UserRole;
    use crate::test_support::{bearer, test_state, user_with_token};
    use actix_web::{test, web, App};
    use serde_json::Value;

    #[actix_rt::test]
    async fn malformed_json_is_a_400_json_body() {
        let state = test_state();
        let (_, token) = user_with_token(&state, "pm@example.com", UserRole::Manager).await;
        let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/api/v1/workers")
            .insert_header(bearer(&token))
            .insert_header(("Content-Type", "application/json"))
            .set_payload("{ not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
    }

    #[actix_rt::test]
    async fn bad_query_enum_is_400() {
        let state = test_state();
        let (_, token) = user_with_token(&state, "pm@example.com", UserRole::Manager).await;
        let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure)).await;

        let req = test::TestRequest::get()
            .uri("/api/v1/projects?status=demolished")
            .insert_header(bearer(&token))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 400);
    }
}
