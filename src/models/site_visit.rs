use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{CreateRequest, UpdateRequest};
use crate::database::Entity;
use crate::utils::ids::{canonical_id, canonical_ref, check_reference, parse_object_id};
use crate::utils::AppResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SiteVisitStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
    NoShow,
}

/// A lead touring a project site.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SiteVisit {
    pub lead_id: String,
    pub project_id: String,
    /// RFC 3339, UTC, millisecond precision
    #[serde(serialize_with = "crate::utils::time::serialize")]
    pub scheduled_at: DateTime<Utc>,
    pub status: SiteVisitStatus,
    pub assigned_to: Option<String>,
    pub feedback: Option<String>,
    pub created_by: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Entity for SiteVisit {
    const COLLECTION: &'static str = "site_visits";
    const RESOURCE: &'static str = "site_visit";
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateSiteVisitRequest {
    pub lead_id: String,
    pub project_id: String,
    pub scheduled_at: DateTime<Utc>,
    #[serde(default)]
    pub status: SiteVisitStatus,
    pub assigned_to: Option<String>,
    #[validate(length(max = 2000, message = "feedback is too long"))]
    pub feedback: Option<String>,
}

impl CreateRequest for CreateSiteVisitRequest {
    type Entity = SiteVisit;

    fn check(&self) -> AppResult<()> {
        parse_object_id(&self.lead_id, "lead_id")?;
        parse_object_id(&self.project_id, "project_id")?;
        check_reference(&self.assigned_to, "assigned_to")
    }

    fn into_entity(self, actor: &str, now: i64) -> SiteVisit {
        SiteVisit {
            lead_id: canonical_id(&self.lead_id),
            project_id: canonical_id(&self.project_id),
            scheduled_at: self.scheduled_at,
            status: self.status,
            assigned_to: canonical_ref(self.assigned_to),
            feedback: self.feedback,
            created_by: actor.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, Validate, utoipa::ToSchema)]
pub struct UpdateSiteVisitRequest {
    #[serde(serialize_with = "crate::utils::time::option::serialize")]
    pub scheduled_at: Option<DateTime<Utc>>,
    pub status: Option<SiteVisitStatus>,
    pub assigned_to: Option<String>,
    #[validate(length(max = 2000, message = "feedback is too long"))]
    pub feedback: Option<String>,
}

impl UpdateRequest for UpdateSiteVisitRequest {
    fn check(&self) -> AppResult<()> {
        check_reference(&self.assigned_to, "assigned_to")
    }
}

#[derive(Debug, Default, Serialize, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SiteVisitFilter {
    pub lead_id: Option<String>,
    pub project_id: Option<String>,
    pub status: Option<SiteVisitStatus>,
    pub assigned_to: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheduled_at_must_be_rfc3339() {
        let ok = serde_json::from_value::<CreateSiteVisitRequest>(serde_json::json!({
            "lead_id": "65f1c0ffee0000000000abcd",
            "project_id": "65f1c0ffee0000000000beef",
            "scheduled_at": "2025-04-12T10:30:00+05:30"
        }))
        .unwrap();
        assert_eq!(ok.scheduled_at.to_rfc3339(), "2025-04-12T05:00:00+00:00");
        assert_eq!(ok.status, SiteVisitStatus::Scheduled);

        let bad = serde_json::from_value::<CreateSiteVisitRequest>(serde_json::json!({
            "lead_id": "65f1c0ffee0000000000abcd",
            "project_id": "65f1c0ffee0000000000beef",
            "scheduled_at": "next saturday"
        }));
        assert!(bad.is_err());
    }
}
