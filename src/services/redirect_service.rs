use mongodb::bson::doc;
use validator::Validate;

use super::crud;
use crate::database::Record;
use crate::models::{normalize_source, Redirect, UpdateRedirectRequest, UpdateRequest};
use crate::state::AppState;
use crate::utils::ids::parse_object_id;
use crate::utils::{AppError, AppResult};

pub async fn update(state: &AppState, id: &str, changes: UpdateRedirectRequest) -> AppResult<Record<Redirect>> {
    changes.validate()?;
    changes.check()?;
    let oid = parse_object_id(id, "id")?;

    let changes = changes.normalized()?;
    crud::apply_changes(state, oid, &changes).await
}

/// Looks up an active redirect and counts the hit. No event is published for hits.
pub async fn resolve(state: &AppState, source: &str) -> AppResult<Record<Redirect>> {
    let source = normalize_source(source).map_err(|_| AppError::NotFound(format!("redirect '{}'", source)))?;

    state
        .repo::<Redirect>()
        .update_one(
            doc! { "source": &source, "is_active": true },
            doc! { "$inc": { "hits": 1_i64 } },
        )
        .await?
        .ok_or_else(|| AppError::NotFound(format!("redirect '{}'", source)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreateRedirectRequest;
    use crate::test_support::test_state;

    fn request(source: &str, active: bool) -> CreateRedirectRequest {
        CreateRedirectRequest {
            source: source.to_string(),
            destination: "https://example.com/projects/lakeview".to_string(),
            permanent: false,
            is_active: active,
        }
    }

    #[actix_rt::test]
    async fn resolve_counts_hits_without_events() {
        let state = test_state();
        crud::create(&state, "admin", request("/Lakeview", true)).await.unwrap();
        let mut events = state.events.subscribe();

        resolve(&state, "lakeview").await.unwrap();
        let second = resolve(&state, "LAKEVIEW").await.unwrap();

        assert_eq!(second.data.hits, 2);
        assert!(events.drain().is_empty());
    }

    #[actix_rt::test]
    async fn inactive_or_unknown_is_not_found() {
        let state = test_state();
        crud::create(&state, "admin", request("old-offer", false)).await.unwrap();

        assert!(matches!(resolve(&state, "old-offer").await, Err(AppError::NotFound(_))));
        assert!(matches!(resolve(&state, "missing").await, Err(AppError::NotFound(_))));
        assert!(matches!(resolve(&state, "bad slug!").await, Err(AppError::NotFound(_))));
    }

    #[actix_rt::test]
    async fn duplicate_sources_conflict_after_normalization() {
        let state = test_state();
        crud::create(&state, "admin", request("brochure", true)).await.unwrap();
        let err = crud::create(&state, "admin", request("/BROCHURE", true)).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
