use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{not_blank, CreateRequest, UpdateRequest};
use crate::database::Entity;
use crate::utils::ids::{canonical_id, parse_object_id};
use crate::utils::{AppError, AppResult};

/// Daily progress diary for a site.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SiteLog {
    pub project_id: String,
    pub date: NaiveDate,
    pub work_done: String,
    pub weather: Option<String>,
    pub workers_present: i32,
    pub issues: Option<String>,
    #[serde(default)]
    pub photos: Vec<String>,
    pub author_id: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Entity for SiteLog {
    const COLLECTION: &'static str = "site_logs";
    const RESOURCE: &'static str = "site_log";
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateSiteLogRequest {
    pub project_id: String,
    /// Defaults to today (UTC).
    pub date: Option<NaiveDate>,
    #[validate(length(min = 1, message = "work_done is required"), custom(function = "not_blank"))]
    pub work_done: String,
    pub weather: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0, message = "workers_present must not be negative"))]
    pub workers_present: i32,
    pub issues: Option<String>,
    #[serde(default)]
    pub photos: Vec<String>,
}

fn check_photo_urls(photos: &[String]) -> AppResult<()> {
    let all_urls = photos
        .iter()
        .all(|p| p.starts_with("https://") || p.starts_with("http://"));
    if all_urls {
        Ok(())
    } else {
        Err(AppError::Validation("photos must be http(s) URLs".to_string()))
    }
}

impl CreateRequest for CreateSiteLogRequest {
    type Entity = SiteLog;

    fn check(&self) -> AppResult<()> {
        parse_object_id(&self.project_id, "project_id")?;
        check_photo_urls(&self.photos)
    }

    fn into_entity(self, actor: &str, now: i64) -> SiteLog {
        let today = chrono::DateTime::from_timestamp(now, 0)
            .map(|dt| dt.date_naive())
            .unwrap_or_else(|| chrono::Utc::now().date_naive());

        SiteLog {
            project_id: canonical_id(&self.project_id),
            date: self.date.unwrap_or(today),
            work_done: self.work_done.trim().to_string(),
            weather: self.weather,
            workers_present: self.workers_present,
            issues: self.issues,
            photos: self.photos,
            author_id: actor.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, Validate, utoipa::ToSchema)]
pub struct UpdateSiteLogRequest {
    #[validate(length(min = 1, message = "work_done must not be empty"), custom(function = "not_blank"))]
    pub work_done: Option<String>,
    pub weather: Option<String>,
    #[validate(range(min = 0, message = "workers_present must not be negative"))]
    pub workers_present: Option<i32>,
    pub issues: Option<String>,
    pub photos: Option<Vec<String>>,
}

impl UpdateRequest for UpdateSiteLogRequest {
    fn check(&self) -> AppResult<()> {
        self.photos.as_deref().map_or(Ok(()), check_photo_urls)
    }
}

#[derive(Debug, Default, Serialize, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SiteLogFilter {
    pub project_id: Option<String>,
    pub date: Option<NaiveDate>,
}
