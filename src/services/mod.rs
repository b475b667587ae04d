pub mod attendance_service;
pub mod auth_service;
pub mod crud;
pub mod dedupe_service;
pub mod milestone_service;
pub mod notification_service;
pub mod project_service;
pub mod redirect_service;
pub mod report_service;

/// Current time as unix seconds, the timestamp format of every stored entity.
pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}
