use serde::{Deserialize, Serialize};
use validator::Validate;

use super::not_blank;
use crate::database::{Entity, Record};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Manager,
    #[default]
    Sales,
    SiteEngineer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Stored lowercased, unique
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub phone: Option<String>,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
    pub last_login: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Entity for User {
    const COLLECTION: &'static str = "users";
    const RESOURCE: &'static str = "user";
}

fn default_is_active() -> bool {
    true
}

// Request/Response structures
#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct RegisterRequest {
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "password must be 8 to 128 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 120, message = "name is required"), custom(function = "not_blank"))]
    pub name: String,
    #[validate(length(min = 7, max = 20, message = "phone must be 7 to 20 characters"), custom(function = "not_blank"))]
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UserInfo {
    pub id: String,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub role: UserRole,
}

impl From<&Record<User>> for UserInfo {
    fn from(record: &Record<User>) -> Self {
        UserInfo {
            id: record.id.to_hex(),
            email: record.data.email.clone(),
            name: record.data.name.clone(),
            phone: record.data.phone.clone(),
            role: record.data.role,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub refresh_token: String,
    pub user: UserInfo,
}
