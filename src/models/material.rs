use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{not_blank, CreateRequest, UpdateRequest};
use crate::database::Entity;
use crate::utils::ids::{canonical_id, parse_object_id};
use crate::utils::AppResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MaterialStatus {
    #[default]
    Requested,
    Ordered,
    Delivered,
    Returned,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Material {
    pub project_id: String,
    pub name: String,
    /// bags, tonnes, m3, ...
    pub unit: String,
    pub quantity: f64,
    pub unit_cost: f64,
    pub supplier: Option<String>,
    pub status: MaterialStatus,
    pub delivered_on: Option<NaiveDate>,
    pub requested_by: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Entity for Material {
    const COLLECTION: &'static str = "materials";
    const RESOURCE: &'static str = "material";
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateMaterialRequest {
    pub project_id: String,
    #[validate(length(min = 1, max = 120, message = "name is required"), custom(function = "not_blank"))]
    pub name: String,
    #[validate(length(min = 1, max = 20, message = "unit is required"), custom(function = "not_blank"))]
    pub unit: String,
    #[validate(range(min = 0.0, message = "quantity must not be negative"))]
    pub quantity: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "unit_cost must not be negative"))]
    pub unit_cost: f64,
    pub supplier: Option<String>,
    #[serde(default)]
    pub status: MaterialStatus,
    pub delivered_on: Option<NaiveDate>,
}

impl CreateRequest for CreateMaterialRequest {
    type Entity = Material;

    fn check(&self) -> AppResult<()> {
        parse_object_id(&self.project_id, "project_id").map(|_| ())
    }

    fn into_entity(self, actor: &str, now: i64) -> Material {
        Material {
            project_id: canonical_id(&self.project_id),
            name: self.name.trim().to_string(),
            unit: self.unit.trim().to_string(),
            quantity: self.quantity,
            unit_cost: self.unit_cost,
            supplier: self.supplier,
            status: self.status,
            delivered_on: self.delivered_on,
            requested_by: actor.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, Validate, utoipa::ToSchema)]
pub struct UpdateMaterialRequest {
    #[validate(length(min = 1, max = 120, message = "name must not be empty"), custom(function = "not_blank"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 20, message = "unit must not be empty"), custom(function = "not_blank"))]
    pub unit: Option<String>,
    #[validate(range(min = 0.0, message = "quantity must not be negative"))]
    pub quantity: Option<f64>,
    #[validate(range(min = 0.0, message = "unit_cost must not be negative"))]
    pub unit_cost: Option<f64>,
    pub supplier: Option<String>,
    pub status: Option<MaterialStatus>,
    pub delivered_on: Option<NaiveDate>,
}

impl UpdateRequest for UpdateMaterialRequest {}

#[derive(Debug, Default, Serialize, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MaterialFilter {
    pub project_id: Option<String>,
    pub status: Option<MaterialStatus>,
}
