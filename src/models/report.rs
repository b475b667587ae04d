use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{not_blank, CreateRequest, UpdateRequest};
use crate::database::Entity;
use crate::utils::ids::{canonical_ref, check_reference};
use crate::utils::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    Sales,
    ProjectProgress,
    Attendance,
    Financial,
    DocumentSummary,
    Custom,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Report {
    pub title: String,
    pub report_type: ReportType,
    pub project_id: Option<String>,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    pub content: Option<String>,
    /// AI-generated summary, if any
    pub summary: Option<String>,
    pub file_url: Option<String>,
    pub generated_by: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Entity for Report {
    const COLLECTION: &'static str = "reports";
    const RESOURCE: &'static str = "report";
}

fn check_period(start: Option<NaiveDate>, end: Option<NaiveDate>) -> AppResult<()> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => Err(AppError::Validation(
            "period_end cannot be before period_start".to_string(),
        )),
        _ => Ok(()),
    }
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateReportRequest {
    #[validate(length(min = 1, max = 200, message = "title is required"), custom(function = "not_blank"))]
    pub title: String,
    pub report_type: ReportType,
    pub project_id: Option<String>,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    pub content: Option<String>,
    pub summary: Option<String>,
    #[validate(url(message = "file_url must be a valid URL"))]
    pub file_url: Option<String>,
}

impl CreateRequest for CreateReportRequest {
    type Entity = Report;

    fn check(&self) -> AppResult<()> {
        check_reference(&self.project_id, "project_id")?;
        check_period(self.period_start, self.period_end)
    }

    fn into_entity(self, actor: &str, now: i64) -> Report {
        Report {
            title: self.title.trim().to_string(),
            report_type: self.report_type,
            project_id: canonical_ref(self.project_id),
            period_start: self.period_start,
            period_end: self.period_end,
            content: self.content,
            summary: self.summary,
            file_url: self.file_url,
            generated_by: actor.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, Validate, utoipa::ToSchema)]
pub struct UpdateReportRequest {
    #[validate(length(min = 1, max = 200, message = "title must not be empty"), custom(function = "not_blank"))]
    pub title: Option<String>,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    pub content: Option<String>,
    pub summary: Option<String>,
    #[validate(url(message = "file_url must be a valid URL"))]
    pub file_url: Option<String>,
}

impl UpdateRequest for UpdateReportRequest {}

impl UpdateReportRequest {
    pub fn check_against(&self, current: &Report) -> AppResult<()> {
        check_period(
            self.period_start.or(current.period_start),
            self.period_end.or(current.period_end),
        )
    }
}

#[derive(Debug, Default, Serialize, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReportFilter {
    pub report_type: Option<ReportType>,
    pub project_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_must_not_run_backwards() {
        let request: CreateReportRequest = serde_json::from_value(serde_json::json!({
            "title": "March sales",
            "report_type": "sales",
            "period_start": "2025-03-31",
            "period_end": "2025-03-01"
        }))
        .unwrap();
        assert!(request.check().is_err());
    }

    #[test]
    fn file_url_is_validated() {
        let request: CreateReportRequest = serde_json::from_value(serde_json::json!({
            "title": "Q1 financials",
            "report_type": "financial",
            "file_url": "reports/q1.pdf"
        }))
        .unwrap();
        assert!(request.validate().is_err());
    }
}
