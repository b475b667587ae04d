use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{CreateRequest, UpdateRequest};
use crate::database::Entity;
use crate::utils::{AppError, AppResult};

/// Short link served at `/r/{source}`.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Redirect {
    pub source: String,
    pub destination: String,
    pub permanent: bool,
    pub is_active: bool,
    pub hits: i64,
    pub created_by: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Entity for Redirect {
    const COLLECTION: &'static str = "redirects";
    const RESOURCE: &'static str = "redirect";
}

/// Lowercases the slug and strips leading slashes. Only `[a-z0-9-_]` is allowed.
pub fn normalize_source(raw: &str) -> AppResult<String> {
    let source = raw.trim().trim_start_matches('/').to_lowercase();

    if source.is_empty() {
        return Err(AppError::Validation("source is required".to_string()));
    }
    if source.len() > 100 {
        return Err(AppError::Validation("source must be at most 100 characters".to_string()));
    }
    if !source
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
    {
        return Err(AppError::Validation(
            "source may only contain letters, digits, '-' and '_'".to_string(),
        ));
    }
    Ok(source)
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateRedirectRequest {
    pub source: String,
    #[validate(url(message = "destination must be a valid URL"))]
    pub destination: String,
    #[serde(default)]
    pub permanent: bool,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl CreateRequest for CreateRedirectRequest {
    type Entity = Redirect;

    fn check(&self) -> AppResult<()> {
        normalize_source(&self.source).map(|_| ())
    }

    fn into_entity(self, actor: &str, now: i64) -> Redirect {
        Redirect {
            // checked above
            source: normalize_source(&self.source).unwrap_or(self.source),
            destination: self.destination,
            permanent: self.permanent,
            is_active: self.is_active,
            hits: 0,
            created_by: actor.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, Validate, utoipa::ToSchema)]
pub struct UpdateRedirectRequest {
    pub source: Option<String>,
    #[validate(url(message = "destination must be a valid URL"))]
    pub destination: Option<String>,
    pub permanent: Option<bool>,
    pub is_active: Option<bool>,
}

impl UpdateRequest for UpdateRedirectRequest {
    fn check(&self) -> AppResult<()> {
        match &self.source {
            Some(source) => normalize_source(source).map(|_| ()),
            None => Ok(()),
        }
    }
}

impl UpdateRedirectRequest {
    pub fn normalized(mut self) -> AppResult<Self> {
        if let Some(source) = self.source.take() {
            self.source = Some(normalize_source(&source)?);
        }
        Ok(self)
    }
}

#[derive(Debug, Default, Serialize, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RedirectFilter {
    pub is_active: Option<bool>,
}
