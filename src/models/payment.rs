use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{CreateRequest, UpdateRequest};
use crate::database::Entity;
use crate::utils::ids::{canonical_id, canonical_ref, check_reference, parse_object_id};
use crate::utils::AppResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentCategory {
    BookingAmount,
    Installment,
    Material,
    Labour,
    Contractor,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    BankTransfer,
    Cheque,
    Upi,
    Card,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
    Refunded,
}

/// Money in (bookings, instalments) or out (materials, labour) for a project.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Payment {
    pub project_id: String,
    pub lead_id: Option<String>,
    pub amount: f64,
    pub category: PaymentCategory,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub reference: Option<String>,
    pub paid_on: Option<NaiveDate>,
    pub notes: Option<String>,
    pub recorded_by: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Entity for Payment {
    const COLLECTION: &'static str = "payments";
    const RESOURCE: &'static str = "payment";
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreatePaymentRequest {
    pub project_id: String,
    pub lead_id: Option<String>,
    #[validate(range(exclusive_min = 0.0, message = "amount must be greater than zero"))]
    pub amount: f64,
    pub category: PaymentCategory,
    pub method: PaymentMethod,
    #[serde(default)]
    pub status: PaymentStatus,
    #[validate(length(max = 120, message = "reference is too long"))]
    pub reference: Option<String>,
    pub paid_on: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl CreateRequest for CreatePaymentRequest {
    type Entity = Payment;

    fn check(&self) -> AppResult<()> {
        parse_object_id(&self.project_id, "project_id")?;
        check_reference(&self.lead_id, "lead_id")
    }

    fn into_entity(self, actor: &str, now: i64) -> Payment {
        Payment {
            project_id: canonical_id(&self.project_id),
            lead_id: canonical_ref(self.lead_id),
            amount: self.amount,
            category: self.category,
            method: self.method,
            status: self.status,
            reference: self.reference,
            paid_on: self.paid_on,
            notes: self.notes,
            recorded_by: actor.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, Validate, utoipa::ToSchema)]
pub struct UpdatePaymentRequest {
    #[validate(range(exclusive_min = 0.0, message = "amount must be greater than zero"))]
    pub amount: Option<f64>,
    pub category: Option<PaymentCategory>,
    pub method: Option<PaymentMethod>,
    pub status: Option<PaymentStatus>,
    #[validate(length(max = 120, message = "reference is too long"))]
    pub reference: Option<String>,
    pub paid_on: Option<NaiveDate>,
    pub notes: Option<String>,
    pub lead_id: Option<String>,
}

impl UpdateRequest for UpdatePaymentRequest {
    fn check(&self) -> AppResult<()> {
        check_reference(&self.lead_id, "lead_id")
    }
}

#[derive(Debug, Default, Serialize, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaymentFilter {
    pub project_id: Option<String>,
    pub lead_id: Option<String>,
    pub status: Option<PaymentStatus>,
    pub category: Option<PaymentCategory>,
}
