use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: i64,
    /// Whether the document store answered a ping
    pub database: bool,
    /// AI providers with credentials configured
    pub ai_providers: Vec<String>,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Document store unreachable", body = HealthResponse)
    )
)]
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let database = match state.store.ping().await {
        Ok(()) => true,
        Err(e) => {
            log::error!("❌ Health check: store ping failed: {}", e);
            false
        }
    };

    let body = HealthResponse {
        status: if database { "healthy" } else { "degraded" }.to_string(),
        service: "siteops-service".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().timestamp(),
        database,
        ai_providers: state.ai.providers().iter().map(|p| p.to_string()).collect(),
    };

    if database {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}
