use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{not_blank, CreateRequest, UpdateRequest};
use crate::database::Entity;
use crate::utils::ids::{canonical_ref, check_reference};
use crate::utils::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    Residential,
    Commercial,
    MixedUse,
    Villa,
    Plot,
    Infrastructure,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Planning,
    InProgress,
    OnHold,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Project {
    pub name: String,
    pub location: String,
    pub project_type: ProjectType,
    pub status: ProjectStatus,
    pub total_units: i32,
    pub sold_units: i32,
    pub budget: f64,
    pub spent: f64,
    pub start_date: Option<NaiveDate>,
    pub expected_completion: Option<NaiveDate>,
    pub manager_id: Option<String>,
    pub description: Option<String>,
    pub created_by: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Entity for Project {
    const COLLECTION: &'static str = "projects";
    const RESOURCE: &'static str = "project";
}

/// `sold_units` can never exceed `total_units`.
pub fn check_units(total_units: i32, sold_units: i32) -> AppResult<()> {
    if sold_units > total_units {
        return Err(AppError::Validation(format!(
            "sold_units ({}) cannot exceed total_units ({})",
            sold_units, total_units
        )));
    }
    Ok(())
}

fn check_schedule(start: Option<NaiveDate>, end: Option<NaiveDate>) -> AppResult<()> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => Err(AppError::Validation(
            "expected_completion cannot be before start_date".to_string(),
        )),
        _ => Ok(()),
    }
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 160, message = "name is required"), custom(function = "not_blank"))]
    pub name: String,
    #[validate(length(min = 1, message = "location is required"), custom(function = "not_blank"))]
    pub location: String,
    pub project_type: ProjectType,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    #[validate(range(min = 0, message = "total_units must not be negative"))]
    pub total_units: i32,
    #[serde(default)]
    #[validate(range(min = 0, message = "sold_units must not be negative"))]
    pub sold_units: i32,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "budget must not be negative"))]
    pub budget: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "spent must not be negative"))]
    pub spent: f64,
    pub start_date: Option<NaiveDate>,
    pub expected_completion: Option<NaiveDate>,
    pub manager_id: Option<String>,
    pub description: Option<String>,
}

impl CreateRequest for CreateProjectRequest {
    type Entity = Project;

    fn check(&self) -> AppResult<()> {
        check_reference(&self.manager_id, "manager_id")?;
        check_units(self.total_units, self.sold_units)?;
        check_schedule(self.start_date, self.expected_completion)
    }

    fn into_entity(self, actor: &str, now: i64) -> Project {
        Project {
            name: self.name.trim().to_string(),
            location: self.location.trim().to_string(),
            project_type: self.project_type,
            status: self.status,
            total_units: self.total_units,
            sold_units: self.sold_units,
            budget: self.budget,
            spent: self.spent,
            start_date: self.start_date,
            expected_completion: self.expected_completion,
            manager_id: canonical_ref(self.manager_id),
            description: self.description,
            created_by: actor.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, Validate, utoipa::ToSchema)]
pub struct UpdateProjectRequest {
    #[validate(length(min = 1, max = 160, message = "name must not be empty"), custom(function = "not_blank"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "location must not be empty"), custom(function = "not_blank"))]
    pub location: Option<String>,
    pub project_type: Option<ProjectType>,
    pub status: Option<ProjectStatus>,
    #[validate(range(min = 0, message = "total_units must not be negative"))]
    pub total_units: Option<i32>,
    #[validate(range(min = 0, message = "sold_units must not be negative"))]
    pub sold_units: Option<i32>,
    #[validate(range(min = 0.0, message = "budget must not be negative"))]
    pub budget: Option<f64>,
    #[validate(range(min = 0.0, message = "spent must not be negative"))]
    pub spent: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub expected_completion: Option<NaiveDate>,
    pub manager_id: Option<String>,
    pub description: Option<String>,
}

impl UpdateRequest for UpdateProjectRequest {
    fn check(&self) -> AppResult<()> {
        check_reference(&self.manager_id, "manager_id")
    }
}

impl UpdateProjectRequest {
    /// Checks the unit and schedule rules against the project as it would look after the update.
    pub fn check_against(&self, current: &Project) -> AppResult<()> {
        check_units(
            self.total_units.unwrap_or(current.total_units),
            self.sold_units.unwrap_or(current.sold_units),
        )?;
        check_schedule(
            self.start_date.or(current.start_date),
            self.expected_completion.or(current.expected_completion),
        )
    }
}

#[derive(Debug, Default, Serialize, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProjectFilter {
    pub status: Option<ProjectStatus>,
    pub project_type: Option<ProjectType>,
    pub manager_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(total: i32, sold: i32) -> Project {
        Project {
            name: "Palm Grove".into(),
            location: "Whitefield".into(),
            project_type: ProjectType::Residential,
            status: ProjectStatus::Planning,
            total_units: total,
            sold_units: sold,
            budget: 0.0,
            spent: 0.0,
            start_date: None,
            expected_completion: None,
            manager_id: None,
            description: None,
            created_by: "u".into(),
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn sold_units_cannot_exceed_total_on_create() {
        let request: CreateProjectRequest = serde_json::from_value(serde_json::json!({
            "name": "Palm Grove",
            "location": "Whitefield",
            "project_type": "villa",
            "total_units": 10,
            "sold_units": 11
        }))
        .unwrap();
        assert!(request.check().is_err());
    }

    #[test]
    fn update_is_checked_against_merged_values() {
        let current = project(40, 30);

        let shrink = UpdateProjectRequest { total_units: Some(20), ..Default::default() };
        assert!(shrink.check_against(&current).is_err());

        let sell = UpdateProjectRequest { sold_units: Some(40), ..Default::default() };
        assert!(sell.check_against(&current).is_ok());
    }

    #[test]
    fn completion_before_start_is_rejected() {
        let current = project(10, 0);
        let update = UpdateProjectRequest {
            start_date: NaiveDate::from_ymd_opt(2025, 6, 1),
            expected_completion: NaiveDate::from_ymd_opt(2025, 1, 1),
            ..Default::default()
        };
        assert!(update.check_against(&current).is_err());
    }
}
