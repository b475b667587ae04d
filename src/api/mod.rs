pub mod ai;
pub mod attendance;
pub mod auth;
pub mod health;
pub mod leads;
pub mod materials;
pub mod metrics;
pub mod milestones;
pub mod notifications;
pub mod payments;
pub mod projects;
pub mod redirects;
pub mod reports;
pub mod routes;
pub mod site_logs;
pub mod site_visits;
pub mod swagger;
pub mod workers;
pub mod ws;

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::utils::AppError;

/// Logs a failed request (warn for client errors, error for server errors)
/// and renders the JSON error body.
pub(crate) fn failure(route: &str, error: AppError) -> HttpResponse {
    if error.status_code().is_server_error() {
        log::error!("❌ {} failed: {}", route, error);
    } else {
        log::warn!("⚠️ {} rejected: {}", route, error);
    }
    error.error_response()
}

/// `{"success": true, "<key>": <record>}`
pub(crate) fn record_response<T: Serialize>(status: StatusCode, key: &str, record: &T) -> HttpResponse {
    let mut body = Map::new();
    body.insert("success".to_string(), Value::Bool(true));
    body.insert(key.to_string(), to_value(record));
    HttpResponse::build(status).json(Value::Object(body))
}

/// `{"success": true, "<key>": [...], "count": n}`
pub(crate) fn list_response<T: Serialize>(key: &str, records: &[T]) -> HttpResponse {
    let mut body = Map::new();
    body.insert("success".to_string(), Value::Bool(true));
    body.insert(key.to_string(), to_value(records));
    body.insert("count".to_string(), Value::from(records.len()));
    HttpResponse::Ok().json(Value::Object(body))
}

fn to_value<T: Serialize + ?Sized>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|e| {
        log::error!("❌ Failed to serialize response: {}", e);
        Value::Null
    })
}
