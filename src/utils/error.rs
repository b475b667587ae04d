use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::ai::AiError;
use crate::database::StoreError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("database error: {0}")]
    Database(StoreError),

    #[error("ai error: {0}")]
    Ai(#[from] AiError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate { ref collection, ref key } => {
                AppError::Conflict(format!("A record with the same {} already exists in {}", key, collection))
            }
            other => AppError::Database(other),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    let msg = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                    format!("{}: {}", field, msg)
                })
            })
            .collect();
        messages.sort();

        if messages.is_empty() {
            AppError::Validation("Validation failed".to_string())
        } else {
            AppError::Validation(messages.join("; "))
        }
    }
}

impl AppError {
    /// Message returned to the client. Server-side failures are not echoed back.
    fn public_message(&self) -> String {
        match self {
            AppError::Database(_) | AppError::Internal(_) | AppError::Config(_) => {
                "Internal server error".to_string()
            }
            AppError::Ai(AiError::NotConfigured(provider)) => {
                format!("AI provider '{}' is not configured", provider)
            }
            AppError::Ai(AiError::Unsupported { provider, operation }) => {
                format!("AI provider '{}' does not support {}", provider, operation)
            }
            AppError::Ai(_) => "AI provider request failed".to_string(),
            other => other.to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Ai(AiError::NotConfigured(_)) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Ai(AiError::Unsupported { .. }) => StatusCode::BAD_REQUEST,
            AppError::Ai(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_) | AppError::Internal(_) | AppError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "success": false,
            "error": self.public_message()
        }))
    }
}
