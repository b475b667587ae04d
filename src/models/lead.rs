use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{not_blank, CreateRequest, UpdateRequest};
use crate::database::Entity;
use crate::utils::ids::{canonical_ref, check_reference};
use crate::utils::AppResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LeadSource {
    Website,
    Referral,
    WalkIn,
    SocialMedia,
    PhoneCall,
    Broker,
    Advertisement,
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    #[default]
    New,
    Contacted,
    Qualified,
    SiteVisitScheduled,
    Negotiation,
    Won,
    Lost,
}

/// Sales prospect
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Lead {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub source: LeadSource,
    pub status: LeadStatus,
    pub project_id: Option<String>,
    /// User responsible for the follow-up
    pub assigned_to: Option<String>,
    pub budget: Option<f64>,
    pub notes: Option<String>,
    pub follow_up_date: Option<NaiveDate>,
    pub created_by: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Entity for Lead {
    const COLLECTION: &'static str = "leads";
    const RESOURCE: &'static str = "lead";
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateLeadRequest {
    #[validate(length(min = 1, max = 120, message = "name is required"), custom(function = "not_blank"))]
    pub name: String,
    #[validate(length(min = 7, max = 20, message = "phone must be 7 to 20 characters"), custom(function = "not_blank"))]
    pub phone: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: Option<String>,
    pub source: LeadSource,
    #[serde(default)]
    pub status: LeadStatus,
    pub project_id: Option<String>,
    pub assigned_to: Option<String>,
    #[validate(range(min = 0.0, message = "budget must not be negative"))]
    pub budget: Option<f64>,
    pub notes: Option<String>,
    pub follow_up_date: Option<NaiveDate>,
}

impl CreateRequest for CreateLeadRequest {
    type Entity = Lead;

    fn check(&self) -> AppResult<()> {
        check_reference(&self.project_id, "project_id")?;
        check_reference(&self.assigned_to, "assigned_to")
    }

    fn into_entity(self, actor: &str, now: i64) -> Lead {
        Lead {
            name: self.name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            email: self.email.map(|e| e.trim().to_lowercase()),
            source: self.source,
            status: self.status,
            project_id: canonical_ref(self.project_id),
            assigned_to: canonical_ref(self.assigned_to),
            budget: self.budget,
            notes: self.notes,
            follow_up_date: self.follow_up_date,
            created_by: actor.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, Validate, utoipa::ToSchema)]
pub struct UpdateLeadRequest {
    #[validate(length(min = 1, max = 120, message = "name must not be empty"), custom(function = "not_blank"))]
    pub name: Option<String>,
    #[validate(length(min = 7, max = 20, message = "phone must be 7 to 20 characters"), custom(function = "not_blank"))]
    pub phone: Option<String>,
    #[validate(email(message = "email must be a valid address"))]
    pub email: Option<String>,
    pub source: Option<LeadSource>,
    pub status: Option<LeadStatus>,
    pub project_id: Option<String>,
    pub assigned_to: Option<String>,
    #[validate(range(min = 0.0, message = "budget must not be negative"))]
    pub budget: Option<f64>,
    pub notes: Option<String>,
    pub follow_up_date: Option<NaiveDate>,
}

impl UpdateRequest for UpdateLeadRequest {
    fn check(&self) -> AppResult<()> {
        check_reference(&self.project_id, "project_id")?;
        check_reference(&self.assigned_to, "assigned_to")
    }
}

#[derive(Debug, Default, Serialize, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeadFilter {
    pub status: Option<LeadStatus>,
    pub source: Option<LeadSource>,
    pub project_id: Option<String>,
    pub assigned_to: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_defaults_to_new_and_values_are_snake_case() {
        let request: CreateLeadRequest = serde_json::from_value(serde_json::json!({
            "name": "Anita Rao",
            "phone": "+91 98450 12345",
            "source": "walk_in"
        }))
        .unwrap();

        assert_eq!(request.status, LeadStatus::New);
        assert_eq!(request.source, LeadSource::WalkIn);
        assert_eq!(
            serde_json::to_value(LeadStatus::SiteVisitScheduled).unwrap(),
            "site_visit_scheduled"
        );
    }

    #[test]
    fn unknown_source_is_rejected() {
        let result = serde_json::from_value::<CreateLeadRequest>(serde_json::json!({
            "name": "Anita Rao",
            "phone": "9845012345",
            "source": "billboard"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn validation_catches_bad_email_and_negative_budget() {
        let request = CreateLeadRequest {
            name: "Vikram".into(),
            phone: "9845012345".into(),
            email: Some("not-an-email".into()),
            source: LeadSource::Website,
            status: LeadStatus::New,
            project_id: None,
            assigned_to: None,
            budget: Some(-5.0),
            notes: None,
            follow_up_date: None,
        };
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("budget"));
    }

    #[test]
    fn malformed_project_reference_fails_check() {
        let request: CreateLeadRequest = serde_json::from_value(serde_json::json!({
            "name": "Anita Rao",
            "phone": "9845012345",
            "source": "referral",
            "project_id": "tower-a"
        }))
        .unwrap();
        assert!(request.check().is_err());
    }
}
