use actix_multipart::Multipart;
use actix_web::{
    http::header::{ContentDisposition, CONTENT_DISPOSITION},
    web, HttpResponse,
};
use futures::StreamExt;
use serde::Deserialize;
use validator::Validate;

use super::failure;
use crate::models::not_blank;
use crate::ai::{AiAnswer, AiProvider};
use crate::services::auth_service::Claims;
use crate::services::report_service::{self, SummaryOptions};
use crate::state::AppState;
use crate::utils::{AppError, AppResult};

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct AiQueryRequest {
    #[validate(length(min = 1, max = 4000, message = "query is required"), custom(function = "not_blank"))]
    pub query: String,
    /// Extra facts handed to the model with the question
    #[validate(length(max = 20000, message = "context is too long"))]
    pub context: Option<String>,
    pub provider: Option<AiProvider>,
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SummarizeQuery {
    pub provider: Option<AiProvider>,
    /// Store the summary as a `document_summary` report
    #[serde(default)]
    pub save: bool,
    pub title: Option<String>,
    pub project_id: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/v1/ai/query",
    tag = "AI",
    request_body = AiQueryRequest,
    responses(
        (status = 200, description = "Model answer", body = AiAnswer),
        (status = 400, description = "Invalid query"),
        (status = 502, description = "AI provider request failed"),
        (status = 503, description = "AI provider not configured")
    ),
    security(("bearer_auth" = []))
)]
pub async fn query(state: web::Data<AppState>, request: web::Json<AiQueryRequest>) -> HttpResponse {
    let request = request.into_inner();
    log::info!(
        "🤖 POST /ai/query - provider: {}",
        request.provider.map(|p| p.to_string()).unwrap_or_else(|| "default".to_string())
    );

    if let Err(e) = request.validate() {
        return failure("POST /ai/query", e.into());
    }

    match state
        .ai
        .answer(request.provider, &request.query, request.context.as_deref())
        .await
    {
        Ok(answer) => {
            log::info!("✅ AI answer from {} ({} chars)", answer.provider, answer.text.len());
            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "answer": answer.text,
                "provider": answer.provider,
                "model": answer.model
            }))
        }
        Err(e) => failure("POST /ai/query", e.into()),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/ai/summarize",
    tag = "AI",
    params(SummarizeQuery),
    request_body(content_type = "multipart/form-data", description = "A single PDF file"),
    responses(
        (status = 200, description = "Document summary, with the stored report when save=true"),
        (status = 400, description = "Missing file or not a PDF"),
        (status = 413, description = "File exceeds the upload limit"),
        (status = 502, description = "AI provider request failed"),
        (status = 503, description = "AI provider not configured")
    ),
    security(("bearer_auth" = []))
)]
pub async fn summarize(
    state: web::Data<AppState>,
    claims: web::ReqData<Claims>,
    options: web::Query<SummarizeQuery>,
    payload: Multipart,
) -> HttpResponse {
    log::info!("📄 POST /ai/summarize - save: {}", options.save);

    let (file_name, pdf) = match read_upload(payload, state.config.max_upload_bytes).await {
        Ok(upload) => upload,
        Err(e) => return failure("POST /ai/summarize", e),
    };

    let options = options.into_inner();
    let options = SummaryOptions {
        provider: options.provider,
        save: options.save,
        title: options.title,
        project_id: options.project_id,
    };

    match report_service::summarize_document(&state, &claims.sub, file_name.as_deref(), &pdf, options).await {
        Ok(summary) => {
            log::info!("✅ Summary from {} ({} bytes in)", summary.answer.provider, pdf.len());
            HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "summary": summary.answer.text,
                "provider": summary.answer.provider,
                "model": summary.answer.model,
                "report": summary.report
            }))
        }
        Err(e) => failure("POST /ai/summarize", e),
    }
}

/// Reads the first uploaded file, stopping as soon as it grows past `max_bytes`.
async fn read_upload(mut payload: Multipart, max_bytes: usize) -> AppResult<(Option<String>, Vec<u8>)> {
    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| AppError::Validation(format!("file: invalid multipart body ({})", e)))?;

        let file_name = field
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|raw| ContentDisposition::from_raw(raw).ok())
            .and_then(|cd| cd.get_filename().map(str::to_string));
        if file_name.is_none() {
            // plain form field, skip it
            while let Some(chunk) = field.next().await {
                chunk.map_err(|e| AppError::Validation(format!("file: {}", e)))?;
            }
            continue;
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| AppError::Validation(format!("file: {}", e)))?;
            if bytes.len() + chunk.len() > max_bytes {
                return Err(AppError::PayloadTooLarge(format!(
                    "File exceeds the {} byte upload limit",
                    max_bytes
                )));
            }
            bytes.extend_from_slice(&chunk);
        }
        return Ok((file_name, bytes));
    }

    Err(AppError::Validation("file: a PDF upload is required".to_string()))
}
