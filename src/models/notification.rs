use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{not_blank, CreateRequest};
use crate::database::Entity;
use crate::utils::ids::{canonical_ref, check_reference};
use crate::utils::AppResult;

/// Most notifications returned by a single list call.
pub const NOTIFICATION_LIST_LIMIT: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Lead,
    SiteVisit,
    Payment,
    Project,
    Milestone,
    Attendance,
    Material,
    Report,
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Notification {
    /// Recipient. `None` means everyone.
    pub user_id: Option<String>,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub link: Option<String>,
    pub read: bool,
    pub created_by: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Entity for Notification {
    const COLLECTION: &'static str = "notifications";
    const RESOURCE: &'static str = "notification";
}

impl Notification {
    pub fn is_visible_to(&self, user_id: &str) -> bool {
        self.user_id.as_deref().map_or(true, |u| u == user_id)
    }
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateNotificationRequest {
    pub user_id: Option<String>,
    #[validate(length(min = 1, max = 160, message = "title is required"), custom(function = "not_blank"))]
    pub title: String,
    #[validate(length(min = 1, max = 2000, message = "message is required"), custom(function = "not_blank"))]
    pub message: String,
    pub kind: NotificationKind,
    #[validate(length(max = 500, message = "link is too long"))]
    pub link: Option<String>,
}

impl CreateRequest for CreateNotificationRequest {
    type Entity = Notification;

    fn check(&self) -> AppResult<()> {
        check_reference(&self.user_id, "user_id")
    }

    fn into_entity(self, actor: &str, now: i64) -> Notification {
        Notification {
            user_id: canonical_ref(self.user_id),
            title: self.title.trim().to_string(),
            message: self.message,
            kind: self.kind,
            link: self.link,
            read: false,
            created_by: actor.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NotificationQuery {
    #[serde(default)]
    pub unread_only: bool,
}
