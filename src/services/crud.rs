//! Create / get / list / update shared by every resource.
//!
//! Each successful write publishes exactly one `<resource>.created` or
//! `<resource>.updated` event.

use mongodb::bson::{oid::ObjectId, Bson, Document};
use serde::Serialize;
use validator::Validate;

use super::now;
use crate::database::{compact_document, Entity, FindQuery, Record, SortBy};
use crate::events::EventAction;
use crate::models::{CreateRequest, UpdateRequest};
use crate::state::AppState;
use crate::utils::ids::{is_reference_field, parse_object_id};
use crate::utils::{AppError, AppResult};

pub async fn create<R: CreateRequest>(state: &AppState, actor: &str, request: R) -> AppResult<Record<R::Entity>> {
    request.validate()?;
    request.check()?;

    insert(state, request.into_entity(actor, now())).await
}

/// Stores an already built entity and announces it.
pub async fn insert<T: Entity>(state: &AppState, entity: T) -> AppResult<Record<T>> {
    let record = state.repo::<T>().insert(entity).await?;
    state.events.publish_record(EventAction::Created, &record);
    Ok(record)
}

pub async fn get<T: Entity>(state: &AppState, id: &str) -> AppResult<Record<T>> {
    let oid = parse_object_id(id, "id")?;
    find_by_id(state, oid).await
}

pub async fn find_by_id<T: Entity>(state: &AppState, oid: ObjectId) -> AppResult<Record<T>> {
    state
        .repo::<T>()
        .find_by_id(oid)
        .await?
        .ok_or_else(|| not_found::<T>(oid))
}

/// Lists documents matching every set field of `filter`.
pub async fn list<T: Entity, F: Serialize>(state: &AppState, filter: &F, sort: SortBy) -> AppResult<Vec<Record<T>>> {
    let mut filter = compact_document(filter)?;
    canonicalize_refs(&mut filter)?;

    let records = state.repo::<T>().find(FindQuery::new(filter).sort(sort)).await?;
    Ok(records)
}

pub async fn update<T: Entity, U: UpdateRequest>(state: &AppState, id: &str, changes: U) -> AppResult<Record<T>> {
    changes.validate()?;
    changes.check()?;
    let oid = parse_object_id(id, "id")?;

    apply_changes(state, oid, &changes).await
}

/// Writes a validated change set. Fails with 400 when nothing would change.
pub async fn apply_changes<T: Entity, U: Serialize>(state: &AppState, oid: ObjectId, changes: &U) -> AppResult<Record<T>> {
    let mut set = compact_document(changes)?;
    canonicalize_refs(&mut set)?;
    if set.is_empty() {
        return Err(AppError::Validation("No fields to update".to_string()));
    }
    apply_set(state, oid, set).await
}

pub async fn apply_set<T: Entity>(state: &AppState, oid: ObjectId, mut set: Document) -> AppResult<Record<T>> {
    set.insert("updated_at", now());

    let record = state
        .repo::<T>()
        .update_by_id(oid, set)
        .await?
        .ok_or_else(|| not_found::<T>(oid))?;

    state.events.publish_record(EventAction::Updated, &record);
    Ok(record)
}

pub fn not_found<T: Entity>(oid: ObjectId) -> AppError {
    AppError::NotFound(format!("{} {}", T::RESOURCE, oid.to_hex()))
}

/// Reference values (`*_id`, `assigned_to`) must be object ids and are rewritten to
/// their lowercase hex form.
fn canonicalize_refs(doc: &mut Document) -> AppResult<()> {
    for (key, value) in doc.iter_mut() {
        if !is_reference_field(key) {
            continue;
        }
        if let Some(raw) = value.as_str() {
            let oid = parse_object_id(raw, key)?;
            *value = Bson::String(oid.to_hex());
        }
    }
    Ok(())
}
