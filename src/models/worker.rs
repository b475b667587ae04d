use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{not_blank, CreateRequest, UpdateRequest};
use crate::database::Entity;
use crate::utils::ids::{canonical_ref, check_reference};
use crate::utils::AppResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum WorkerSkill {
    Mason,
    Carpenter,
    Electrician,
    Plumber,
    Painter,
    Welder,
    Helper,
    Supervisor,
    Other,
}

/// Site labourer paid a daily wage
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Worker {
    pub name: String,
    pub phone: Option<String>,
    pub skill: WorkerSkill,
    pub daily_wage: f64,
    pub project_id: Option<String>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Entity for Worker {
    const COLLECTION: &'static str = "workers";
    const RESOURCE: &'static str = "worker";
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateWorkerRequest {
    #[validate(length(min = 1, max = 120, message = "name is required"), custom(function = "not_blank"))]
    pub name: String,
    #[validate(length(min = 7, max = 20, message = "phone must be 7 to 20 characters"), custom(function = "not_blank"))]
    pub phone: Option<String>,
    pub skill: WorkerSkill,
    #[validate(range(min = 0.0, message = "daily_wage must not be negative"))]
    pub daily_wage: f64,
    pub project_id: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl CreateRequest for CreateWorkerRequest {
    type Entity = Worker;

    fn check(&self) -> AppResult<()> {
        check_reference(&self.project_id, "project_id")
    }

    fn into_entity(self, _actor: &str, now: i64) -> Worker {
        Worker {
            name: self.name.trim().to_string(),
            phone: self.phone,
            skill: self.skill,
            daily_wage: self.daily_wage,
            project_id: canonical_ref(self.project_id),
            is_active: self.is_active,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, Validate, utoipa::ToSchema)]
pub struct UpdateWorkerRequest {
    #[validate(length(min = 1, max = 120, message = "name must not be empty"), custom(function = "not_blank"))]
    pub name: Option<String>,
    #[validate(length(min = 7, max = 20, message = "phone must be 7 to 20 characters"), custom(function = "not_blank"))]
    pub phone: Option<String>,
    pub skill: Option<WorkerSkill>,
    #[validate(range(min = 0.0, message = "daily_wage must not be negative"))]
    pub daily_wage: Option<f64>,
    pub project_id: Option<String>,
    pub is_active: Option<bool>,
}

impl UpdateRequest for UpdateWorkerRequest {
    fn check(&self) -> AppResult<()> {
        check_reference(&self.project_id, "project_id")
    }
}

#[derive(Debug, Default, Serialize, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WorkerFilter {
    pub project_id: Option<String>,
    pub skill: Option<WorkerSkill>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workers_are_active_by_default() {
        let request: CreateWorkerRequest = serde_json::from_value(serde_json::json!({
            "name": "Ramesh",
            "skill": "mason",
            "daily_wage": 850.0
        }))
        .unwrap();
        assert!(request.is_active);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn daily_wage_is_required() {
        let result = serde_json::from_value::<CreateWorkerRequest>(serde_json::json!({
            "name": "Ramesh",
            "skill": "mason"
        }));
        assert!(result.is_err());
    }
}
