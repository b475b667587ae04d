use validator::Validate;

use super::crud;
use crate::ai::{AiAnswer, AiProvider};
use crate::database::Record;
use crate::models::{CreateReportRequest, CreateRequest, Report, ReportType, UpdateReportRequest, UpdateRequest};
use crate::state::AppState;
use crate::utils::ids::parse_object_id;
use crate::utils::{AppError, AppResult};

const PDF_MAGIC: &[u8] = b"%PDF-";

pub async fn update(state: &AppState, id: &str, changes: UpdateReportRequest) -> AppResult<Record<Report>> {
    changes.validate()?;
    changes.check()?;
    let oid = parse_object_id(id, "id")?;

    let current = crud::find_by_id::<Report>(state, oid).await?;
    changes.check_against(&current.data)?;

    crud::apply_changes(state, oid, &changes).await
}

#[derive(Debug, Default, Clone)]
pub struct SummaryOptions {
    pub provider: Option<AiProvider>,
    pub save: bool,
    pub title: Option<String>,
    pub project_id: Option<String>,
}

#[derive(Debug)]
pub struct DocumentSummary {
    pub answer: AiAnswer,
    pub report: Option<Record<Report>>,
}

/// Rejects anything that is not a PDF within the upload limit.
pub fn check_pdf(bytes: &[u8], max_bytes: usize) -> AppResult<()> {
    if bytes.len() > max_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "File exceeds the {} byte upload limit",
            max_bytes
        )));
    }
    if !bytes.starts_with(PDF_MAGIC) {
        return Err(AppError::Validation("file: only PDF documents are accepted".to_string()));
    }
    Ok(())
}

/// Summarizes a PDF and, when asked, keeps the summary as a `document_summary` report.
pub async fn summarize_document(
    state: &AppState,
    actor: &str,
    file_name: Option<&str>,
    pdf: &[u8],
    options: SummaryOptions,
) -> AppResult<DocumentSummary> {
    check_pdf(pdf, state.config.max_upload_bytes)?;

    // Save options are checked before the provider is called.
    let pending = if options.save {
        let title = options
            .title
            .filter(|t| !t.trim().is_empty())
            .or_else(|| file_name.map(|name| format!("Summary of {}", name)))
            .unwrap_or_else(|| "Document summary".to_string());

        let request = CreateReportRequest {
            title,
            report_type: ReportType::DocumentSummary,
            project_id: options.project_id,
            period_start: None,
            period_end: None,
            content: None,
            summary: None,
            file_url: None,
        };
        request.validate()?;
        request.check()?;
        Some(request)
    } else {
        None
    };

    let answer = state.ai.summarize_pdf(options.provider, pdf).await?;
    let Some(mut request) = pending else {
        return Ok(DocumentSummary { answer, report: None });
    };

    request.summary = Some(answer.text.clone());
    let report = crud::create(state, actor, request).await?;

    Ok(DocumentSummary { answer, report: Some(report) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::testing::FakeModel;
    use crate::ai::AiError;
    use crate::test_support::{test_state, test_state_with_ai};
    use chrono::NaiveDate;

    const PDF: &[u8] = b"%PDF-1.4 site inspection notes";

    #[test]
    fn pdf_checks() {
        assert!(check_pdf(PDF, 1024).is_ok());
        assert!(matches!(check_pdf(b"PK\x03\x04", 1024), Err(AppError::Validation(_))));
        assert!(matches!(check_pdf(PDF, 4), Err(AppError::PayloadTooLarge(_))));
    }

    #[actix_rt::test]
    async fn saved_summary_becomes_a_report() {
        let state = test_state_with_ai(
            AiProvider::Gemini,
            vec![FakeModel::replying(AiProvider::Gemini, "Slab cast on level 4.")],
        );
        let mut events = state.events.subscribe();

        let summary = summarize_document(
            &state,
            "engineer",
            Some("inspection.pdf"),
            PDF,
            SummaryOptions { save: true, ..Default::default() },
        )
        .await
        .unwrap();

        let report = summary.report.unwrap();
        assert_eq!(report.data.report_type, ReportType::DocumentSummary);
        assert_eq!(report.data.title, "Summary of inspection.pdf");
        assert_eq!(report.data.summary.as_deref(), Some("Slab cast on level 4."));

        let published = events.drain();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].event, "report.created");
    }

    #[actix_rt::test]
    async fn unsaved_summary_stores_nothing() {
        let state = test_state_with_ai(
            AiProvider::Gemini,
            vec![FakeModel::replying(AiProvider::Gemini, "ok")],
        );
        let mut events = state.events.subscribe();

        let summary = summarize_document(&state, "u", None, PDF, SummaryOptions::default())
            .await
            .unwrap();
        assert!(summary.report.is_none());
        assert!(events.drain().is_empty());
    }

    #[actix_rt::test]
    async fn bad_project_is_rejected_before_the_provider_is_called() {
        let model = FakeModel::replying(AiProvider::Gemini, "never used");
        let state = test_state_with_ai(AiProvider::Gemini, vec![model.clone()]);

        let options = SummaryOptions { save: true, project_id: Some("tower-a".into()), ..Default::default() };
        let err = summarize_document(&state, "u", None, PDF, options).await.unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(model.calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[actix_rt::test]
    async fn missing_provider_is_reported() {
        let state = test_state();
        let err = summarize_document(&state, "u", None, PDF, SummaryOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Ai(AiError::NotConfigured(_))));
    }

    #[actix_rt::test]
    async fn period_is_checked_against_stored_report() {
        let state = test_state();
        let report = crud::create(
            &state,
            "u",
            CreateReportRequest {
                title: "April sales".into(),
                report_type: ReportType::Sales,
                project_id: None,
                period_start: NaiveDate::from_ymd_opt(2025, 4, 1),
                period_end: NaiveDate::from_ymd_opt(2025, 4, 30),
                content: None,
                summary: None,
                file_url: None,
            },
        )
        .await
        .unwrap();

        let err = update(
            &state,
            &report.id.to_hex(),
            UpdateReportRequest { period_end: NaiveDate::from_ymd_opt(2025, 3, 1), ..Default::default() },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
