use validator::Validate;

use super::{crud, now};
use crate::database::Record;
use crate::models::{Milestone, UpdateMilestoneRequest};
use crate::state::AppState;
use crate::utils::ids::parse_object_id;
use crate::utils::AppResult;

pub async fn update(state: &AppState, id: &str, mut changes: UpdateMilestoneRequest) -> AppResult<Record<Milestone>> {
    changes.validate()?;
    let oid = parse_object_id(id, "id")?;

    changes.apply_completion(now());
    crud::apply_changes(state, oid, &changes).await
}
