use mongodb::bson::{doc, Bson, Document};
use validator::Validate;

use super::{crud, now};
use crate::database::{FindQuery, Record, SortBy};
use crate::events::{Event, EventAction};
use crate::models::{CreateNotificationRequest, CreateRequest, Notification, NOTIFICATION_LIST_LIMIT};
use crate::state::AppState;
use crate::utils::ids::parse_object_id;
use crate::utils::AppResult;

/// Stores a notification and pushes it only to its recipient (or to everyone).
pub async fn create(state: &AppState, actor: &str, request: CreateNotificationRequest) -> AppResult<Record<Notification>> {
    request.validate()?;
    request.check()?;

    let record = state.repo::<Notification>().insert(request.into_entity(actor, now())).await?;
    publish(state, EventAction::Created, &record);
    Ok(record)
}

/// The caller's own notifications plus broadcasts, newest first.
pub async fn list_for(state: &AppState, user_id: &str, unread_only: bool) -> AppResult<Vec<Record<Notification>>> {
    let repo = state.repo::<Notification>();
    let query = |recipient: Bson| {
        let mut filter: Document = doc! { "user_id": recipient };
        if unread_only {
            filter.insert("read", false);
        }
        FindQuery::new(filter)
            .sort(SortBy::desc("created_at"))
            .limit(NOTIFICATION_LIST_LIMIT)
    };

    let mut notifications = repo.find(query(Bson::String(user_id.to_string()))).await?;
    notifications.extend(repo.find(query(Bson::Null)).await?);

    notifications.sort_by(|a, b| b.data.created_at.cmp(&a.data.created_at));
    notifications.truncate(NOTIFICATION_LIST_LIMIT as usize);
    Ok(notifications)
}

pub async fn mark_read(state: &AppState, user_id: &str, id: &str) -> AppResult<Record<Notification>> {
    let oid = parse_object_id(id, "id")?;
    let current = crud::find_by_id::<Notification>(state, oid).await?;
    if !current.data.is_visible_to(user_id) {
        return Err(crud::not_found::<Notification>(oid));
    }

    let record = state
        .repo::<Notification>()
        .update_by_id(oid, doc! { "read": true, "updated_at": now() })
        .await?
        .ok_or_else(|| crud::not_found::<Notification>(oid))?;

    publish(state, EventAction::Updated, &record);
    Ok(record)
}

/// Marks every unread notification addressed to the caller. Broadcasts are left alone.
pub async fn mark_all_read(state: &AppState, user_id: &str) -> AppResult<u64> {
    let changed = state
        .repo::<Notification>()
        .update_many(
            doc! { "user_id": user_id, "read": false },
            doc! { "read": true, "updated_at": now() },
        )
        .await?;
    Ok(changed)
}

fn publish(state: &AppState, action: EventAction, record: &Record<Notification>) {
    let event = Event::for_record(action, record).to_user(record.data.user_id.clone());
    state.events.publish(event);
}
