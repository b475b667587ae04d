use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{not_blank, CreateRequest, UpdateRequest};
use crate::database::Entity;
use crate::utils::ids::{canonical_id, parse_object_id};
use crate::utils::AppResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Delayed,
}

/// Construction stage of a project (foundation, slab, handover, ...)
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Milestone {
    pub project_id: String,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub status: MilestoneStatus,
    /// Percent complete, 0 to 100
    pub progress: i32,
    pub completed_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Entity for Milestone {
    const COLLECTION: &'static str = "milestones";
    const RESOURCE: &'static str = "milestone";
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateMilestoneRequest {
    pub project_id: String,
    #[validate(length(min = 1, max = 160, message = "title is required"), custom(function = "not_blank"))]
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: MilestoneStatus,
    #[validate(range(min = 0, max = 100, message = "progress must be between 0 and 100"))]
    pub progress: Option<i32>,
}

impl CreateRequest for CreateMilestoneRequest {
    type Entity = Milestone;

    fn check(&self) -> AppResult<()> {
        parse_object_id(&self.project_id, "project_id").map(|_| ())
    }

    fn into_entity(self, _actor: &str, now: i64) -> Milestone {
        let completed = self.status == MilestoneStatus::Completed;
        let progress = match self.progress {
            Some(progress) => progress,
            None if completed => 100,
            None => 0,
        };

        Milestone {
            project_id: canonical_id(&self.project_id),
            title: self.title.trim().to_string(),
            description: self.description,
            due_date: self.due_date,
            status: self.status,
            progress,
            completed_at: completed.then_some(now),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, Validate, utoipa::ToSchema)]
pub struct UpdateMilestoneRequest {
    #[validate(length(min = 1, max = 160, message = "title must not be empty"), custom(function = "not_blank"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub status: Option<MilestoneStatus>,
    #[validate(range(min = 0, max = 100, message = "progress must be between 0 and 100"))]
    pub progress: Option<i32>,
    /// Stamped by the service when the milestone is completed.
    #[serde(skip_deserializing)]
    #[schema(read_only)]
    pub completed_at: Option<i64>,
}

impl UpdateRequest for UpdateMilestoneRequest {}

impl UpdateMilestoneRequest {
    /// Completing a milestone without an explicit progress sets it to 100 and stamps `completed_at`.
    pub fn apply_completion(&mut self, now: i64) {
        if self.status == Some(MilestoneStatus::Completed) {
            if self.progress.is_none() {
                self.progress = Some(100);
            }
            self.completed_at = Some(now);
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MilestoneFilter {
    pub project_id: Option<String>,
    pub status: Option<MilestoneStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completing_sets_progress_and_timestamp() {
        let mut update = UpdateMilestoneRequest {
            status: Some(MilestoneStatus::Completed),
            ..Default::default()
        };
        update.apply_completion(1_700_000_000);

        assert_eq!(update.progress, Some(100));
        assert_eq!(update.completed_at, Some(1_700_000_000));
    }

    #[test]
    fn explicit_progress_is_kept() {
        let mut update = UpdateMilestoneRequest {
            status: Some(MilestoneStatus::Completed),
            progress: Some(95),
            ..Default::default()
        };
        update.apply_completion(10);
        assert_eq!(update.progress, Some(95));
    }

    #[test]
    fn other_statuses_leave_progress_alone() {
        let mut update = UpdateMilestoneRequest {
            status: Some(MilestoneStatus::Delayed),
            ..Default::default()
        };
        update.apply_completion(10);
        assert_eq!(update.progress, None);
        assert_eq!(update.completed_at, None);
    }

    #[test]
    fn progress_over_100_is_invalid() {
        let request: CreateMilestoneRequest = serde_json::from_value(serde_json::json!({
            "project_id": "65f1c0ffee0000000000beef",
            "title": "Slab casting",
            "progress": 120
        }))
        .unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn created_completed_milestone_is_full() {
        let request: CreateMilestoneRequest = serde_json::from_value(serde_json::json!({
            "project_id": "65f1c0ffee0000000000beef",
            "title": "Handover",
            "status": "completed"
        }))
        .unwrap();
        let milestone = request.into_entity("u", 42);
        assert_eq!(milestone.progress, 100);
        assert_eq!(milestone.completed_at, Some(42));
    }
}
