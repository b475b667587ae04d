use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "SiteOps Service API",
        version = "1.0.0",
        description = "Sales and site operations backend for construction and real-estate teams.\n\n**Authentication:** every `/api/v1` route except register, login and refresh requires a JWT Bearer access token. The event socket at `/ws` takes the token as `?token=`.\n\n**Events:** each successful create or update is pushed to socket clients as `<resource>.created` / `<resource>.updated`.",
        contact(name = "SiteOps Team")
    ),
    paths(
        // Auth
        crate::api::auth::login,
        crate::api::auth::register,
        crate::api::auth::refresh_token,
        crate::api::auth::verify_token,
        crate::api::auth::get_me,

        // Health & Metrics
        crate::api::health::health_check,
        crate::api::metrics::get_metrics,

        // Sales
        crate::api::leads::create_lead,
        crate::api::leads::list_leads,
        crate::api::leads::get_lead,
        crate::api::leads::update_lead,
        crate::api::site_visits::create_site_visit,
        crate::api::site_visits::list_site_visits,
        crate::api::site_visits::get_site_visit,
        crate::api::site_visits::update_site_visit,

        // Projects
        crate::api::projects::create_project,
        crate::api::projects::list_projects,
        crate::api::projects::get_project,
        crate::api::projects::update_project,
        crate::api::milestones::create_milestone,
        crate::api::milestones::list_milestones,
        crate::api::milestones::get_milestone,
        crate::api::milestones::update_milestone,

        // Workforce
        crate::api::workers::create_worker,
        crate::api::workers::list_workers,
        crate::api::workers::get_worker,
        crate::api::workers::update_worker,
        crate::api::attendance::mark_attendance,
        crate::api::attendance::list_attendance,
        crate::api::attendance::get_attendance,
        crate::api::attendance::update_attendance,

        // Site
        crate::api::materials::create_material,
        crate::api::materials::list_materials,
        crate::api::materials::get_material,
        crate::api::materials::update_material,
        crate::api::site_logs::create_site_log,
        crate::api::site_logs::list_site_logs,
        crate::api::site_logs::get_site_log,
        crate::api::site_logs::update_site_log,

        // Finance
        crate::api::payments::create_payment,
        crate::api::payments::list_payments,
        crate::api::payments::get_payment,
        crate::api::payments::update_payment,

        // Reports
        crate::api::reports::create_report,
        crate::api::reports::list_reports,
        crate::api::reports::get_report,
        crate::api::reports::update_report,

        // Notifications
        crate::api::notifications::create_notification,
        crate::api::notifications::list_notifications,
        crate::api::notifications::mark_notification_read,
        crate::api::notifications::mark_all_notifications_read,

        // Redirects
        crate::api::redirects::create_redirect,
        crate::api::redirects::list_redirects,
        crate::api::redirects::get_redirect,
        crate::api::redirects::update_redirect,
        crate::api::redirects::resolve_redirect,

        // AI
        crate::api::ai::query,
        crate::api::ai::summarize,
    ),
    components(
        schemas(
            crate::models::LoginRequest,
            crate::models::RegisterRequest,
            crate::models::RefreshTokenRequest,
            crate::models::AuthResponse,
            crate::models::UserInfo,
            crate::api::health::HealthResponse,
            crate::api::metrics::MetricsResponse,
            crate::api::ai::AiQueryRequest,
            crate::ai::AiAnswer,
        )
    ),
    tags(
        (name = "Auth", description = "Registration, login, token refresh and the current user."),
        (name = "Health", description = "Health check and Prometheus metrics."),
        (name = "Leads", description = "Sales leads and the site visits scheduled for them."),
        (name = "Projects", description = "Developments, their unit and budget tracking, and milestones."),
        (name = "Workforce", description = "Workers and daily attendance with wage derivation."),
        (name = "Site", description = "Material requests and daily site logs."),
        (name = "Finance", description = "Payments received and made per project."),
        (name = "Reports", description = "Stored reports, including AI document summaries."),
        (name = "Notifications", description = "Per-user and broadcast notifications."),
        (name = "Redirects", description = "Short links served at /r/{source}."),
        (name = "AI", description = "Question answering and PDF summaries via Groq, Gemini or Vertex AI."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Access token from /api/v1/auth/login"))
                        .build(),
                ),
            );
        }
    }
}
