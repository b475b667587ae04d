use validator::Validate;

use super::{crud, now};
use crate::database::Record;
use crate::models::{Attendance, CreateAttendanceRequest, Worker};
use crate::state::AppState;
use crate::utils::ids::parse_object_id;
use crate::utils::{AppError, AppResult};

/// Marks a worker's attendance for one day.
///
/// The worker must exist. Wage and project default from the worker record, and a
/// second mark for the same worker and day is a conflict.
pub async fn mark(state: &AppState, actor: &str, request: CreateAttendanceRequest) -> AppResult<Record<Attendance>> {
    request.validate()?;
    request.check()?;

    let worker_id = parse_object_id(&request.worker_id, "worker_id")?;
    let worker = state
        .repo::<Worker>()
        .find_by_id(worker_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("worker {}", request.worker_id)))?;

    let date = request.date;
    let attendance = request.into_attendance(&worker.data, actor, now());
    crud::insert(state, attendance).await.map_err(|e| match e {
        AppError::Conflict(_) => AppError::Conflict(format!(
            "Attendance for worker {} on {} already exists",
            worker_id.to_hex(),
            date
        )),
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::SortBy;
    use crate::models::{AttendanceFilter, AttendanceStatus, CreateWorkerRequest, WorkerSkill};
    use crate::test_support::test_state;
    use chrono::NaiveDate;
    use mongodb::bson::oid::ObjectId;

    async fn worker(state: &AppState, project_id: Option<String>) -> Record<Worker> {
        crud::create(
            state,
            "admin",
            CreateWorkerRequest {
                name: "Manjunath".into(),
                phone: None,
                skill: WorkerSkill::Electrician,
                daily_wage: 1000.0,
                project_id,
                is_active: true,
            },
        )
        .await
        .unwrap()
    }

    fn request(worker_id: &str, status: AttendanceStatus) -> CreateAttendanceRequest {
        CreateAttendanceRequest {
            worker_id: worker_id.to_string(),
            project_id: None,
            date: NaiveDate::from_ymd_opt(2025, 1, 20).unwrap(),
            status,
            overtime_hours: 0.0,
            wage: None,
        }
    }

    #[actix_rt::test]
    async fn derives_wage_and_project_from_worker() {
        let state = test_state();
        let project = ObjectId::new().to_hex();
        let w = worker(&state, Some(project.clone())).await;

        let record = mark(&state, "engineer", request(&w.id.to_hex(), AttendanceStatus::HalfDay))
            .await
            .unwrap();
        assert_eq!(record.data.wage, 500.0);
        assert_eq!(record.data.project_id, Some(project));
        assert_eq!(record.data.marked_by, "engineer");
    }

    #[actix_rt::test]
    async fn one_mark_per_worker_per_day() {
        let state = test_state();
        let w = worker(&state, None).await;
        let mut events = state.events.subscribe();

        mark(&state, "u", request(&w.id.to_hex(), AttendanceStatus::Present)).await.unwrap();
        let err = mark(&state, "u", request(&w.id.to_hex(), AttendanceStatus::Absent))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
        let published = events.drain();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].event, "attendance.created");
    }

    #[actix_rt::test]
    async fn worker_id_spelling_does_not_bypass_the_daily_mark() {
        let state = test_state();
        let w = worker(&state, None).await;
        let id = w.id.to_hex();

        let first = mark(&state, "u", request(&id.to_uppercase(), AttendanceStatus::Present))
            .await
            .unwrap();
        assert_eq!(first.data.worker_id, id);

        for spelling in [id.clone(), format!("  {}", id)] {
            let err = mark(&state, "u", request(&spelling, AttendanceStatus::Present))
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Conflict(_)));
        }

        let filter = AttendanceFilter { worker_id: Some(id.to_uppercase()), ..Default::default() };
        let listed = crud::list::<Attendance, _>(&state, &filter, SortBy::desc("date")).await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[actix_rt::test]
    async fn unknown_worker_is_not_found() {
        let state = test_state();
        let err = mark(&state, "u", request(&ObjectId::new().to_hex(), AttendanceStatus::Present))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
