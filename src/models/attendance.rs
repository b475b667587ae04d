use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{UpdateRequest, Worker};
use crate::database::Entity;
use crate::utils::ids::{canonical_id, canonical_ref, check_reference, parse_object_id};
use crate::utils::AppResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    HalfDay,
    Leave,
}

impl AttendanceStatus {
    /// Share of the daily wage earned for the day.
    pub fn wage_factor(&self) -> f64 {
        match self {
            AttendanceStatus::Present => 1.0,
            AttendanceStatus::HalfDay => 0.5,
            AttendanceStatus::Absent | AttendanceStatus::Leave => 0.0,
        }
    }
}

/// One worker on one day. Unique per (worker_id, date).
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Attendance {
    pub worker_id: String,
    pub project_id: Option<String>,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub overtime_hours: f64,
    pub wage: f64,
    pub marked_by: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Entity for Attendance {
    const COLLECTION: &'static str = "attendance";
    const RESOURCE: &'static str = "attendance";
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateAttendanceRequest {
    pub worker_id: String,
    pub project_id: Option<String>,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 24.0, message = "overtime_hours must be between 0 and 24"))]
    pub overtime_hours: f64,
    /// Derived from the worker's daily wage when omitted.
    #[validate(range(min = 0.0, message = "wage must not be negative"))]
    pub wage: Option<f64>,
}

impl CreateAttendanceRequest {
    pub fn check(&self) -> AppResult<()> {
        parse_object_id(&self.worker_id, "worker_id")?;
        check_reference(&self.project_id, "project_id")
    }

    pub fn into_attendance(self, worker: &Worker, actor: &str, now: i64) -> Attendance {
        let wage = self
            .wage
            .unwrap_or_else(|| worker.daily_wage * self.status.wage_factor());

        Attendance {
            worker_id: canonical_id(&self.worker_id),
            project_id: canonical_ref(self.project_id).or_else(|| worker.project_id.clone()),
            date: self.date,
            status: self.status,
            overtime_hours: self.overtime_hours,
            wage,
            marked_by: actor.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, Validate, utoipa::ToSchema)]
pub struct UpdateAttendanceRequest {
    pub status: Option<AttendanceStatus>,
    #[validate(range(min = 0.0, max = 24.0, message = "overtime_hours must be between 0 and 24"))]
    pub overtime_hours: Option<f64>,
    #[validate(range(min = 0.0, message = "wage must not be negative"))]
    pub wage: Option<f64>,
    pub project_id: Option<String>,
}

impl UpdateRequest for UpdateAttendanceRequest {
    fn check(&self) -> AppResult<()> {
        check_reference(&self.project_id, "project_id")
    }
}

#[derive(Debug, Default, Serialize, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AttendanceFilter {
    pub worker_id: Option<String>,
    pub project_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub status: Option<AttendanceStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WorkerSkill;

    fn worker() -> Worker {
        Worker {
            name: "Suresh".into(),
            phone: None,
            skill: WorkerSkill::Carpenter,
            daily_wage: 900.0,
            project_id: Some("65f1c0ffee0000000000beef".into()),
            is_active: true,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn request(status: AttendanceStatus, wage: Option<f64>) -> CreateAttendanceRequest {
        CreateAttendanceRequest {
            worker_id: "65f1c0ffee0000000000abcd".into(),
            project_id: None,
            date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            status,
            overtime_hours: 0.0,
            wage,
        }
    }

    #[test]
    fn wage_follows_status_when_omitted() {
        let w = worker();
        assert_eq!(request(AttendanceStatus::Present, None).into_attendance(&w, "u", 1).wage, 900.0);
        assert_eq!(request(AttendanceStatus::HalfDay, None).into_attendance(&w, "u", 1).wage, 450.0);
        assert_eq!(request(AttendanceStatus::Leave, None).into_attendance(&w, "u", 1).wage, 0.0);
        assert_eq!(request(AttendanceStatus::Absent, Some(100.0)).into_attendance(&w, "u", 1).wage, 100.0);
    }

    #[test]
    fn project_defaults_to_workers_project() {
        let record = request(AttendanceStatus::Present, None).into_attendance(&worker(), "u", 1);
        assert_eq!(record.project_id.as_deref(), Some("65f1c0ffee0000000000beef"));
    }

    #[test]
    fn date_is_serialized_as_calendar_day() {
        let record = request(AttendanceStatus::Present, None).into_attendance(&worker(), "u", 1);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["date"], "2025-03-14");
        assert_eq!(json["status"], "present");
    }
}
