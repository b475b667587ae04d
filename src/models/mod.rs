pub mod attendance;
pub mod lead;
pub mod material;
pub mod milestone;
pub mod notification;
pub mod payment;
pub mod project;
pub mod redirect;
pub mod report;
pub mod site_log;
pub mod site_visit;
pub mod user;
pub mod worker;

pub use attendance::*;
pub use lead::*;
pub use material::*;
pub use milestone::*;
pub use notification::*;
pub use payment::*;
pub use project::*;
pub use redirect::*;
pub use report::*;
pub use site_log::*;
pub use site_visit::*;
pub use user::*;
pub use worker::*;

use serde::de::DeserializeOwned;
use serde::Serialize;
use validator::{Validate, ValidationError};

use crate::database::Entity;
use crate::utils::AppResult;

/// Body of a `POST` on a resource collection.
pub trait CreateRequest: DeserializeOwned + Validate + Send + 'static {
    type Entity: Entity;

    /// Checks that validator attributes cannot express (reference ids, cross-field rules).
    fn check(&self) -> AppResult<()> {
        Ok(())
    }

    fn into_entity(self, actor: &str, now: i64) -> Self::Entity;
}

/// Body of a `PATCH` on a single resource. Unset fields are left untouched.
pub trait UpdateRequest: DeserializeOwned + Serialize + Validate + Send + 'static {
    fn check(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Rejects text made only of whitespace, which `length(min = 1)` lets through.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("must not be blank".into());
        return Err(error);
    }
    Ok(())
}
