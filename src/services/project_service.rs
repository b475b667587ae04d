use validator::Validate;

use super::crud;
use crate::database::Record;
use crate::models::{Project, UpdateProjectRequest, UpdateRequest};
use crate::state::AppState;
use crate::utils::ids::parse_object_id;
use crate::utils::AppResult;

/// Partial update checked against the merged document: `sold_units` may not end
/// up above `total_units` whichever of the two the request changes.
pub async fn update(state: &AppState, id: &str, changes: UpdateProjectRequest) -> AppResult<Record<Project>> {
    changes.validate()?;
    changes.check()?;
    let oid = parse_object_id(id, "id")?;

    let current = crud::find_by_id::<Project>(state, oid).await?;
    changes.check_against(&current.data)?;

    crud::apply_changes(state, oid, &changes).await
}
