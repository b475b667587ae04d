use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mongodb::bson::doc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::now;
use crate::config::JwtConfig;
use crate::database::Record;
use crate::models::{AuthResponse, LoginRequest, RefreshTokenRequest, RegisterRequest, User, UserInfo, UserRole};
use crate::state::AppState;
use crate::utils::ids::parse_object_id;
use crate::utils::{AppError, AppResult};

#[cfg(not(test))]
const HASH_COST: u32 = bcrypt::DEFAULT_COST;
#[cfg(test)]
const HASH_COST: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    Refresh,
}

// JWT Claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // user id (hex)
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub token_type: TokenType,
    pub iat: usize,
    pub exp: usize,
    pub jti: String,
    pub aud: String,
    pub iss: String,
}

pub(crate) fn issue_token(config: &JwtConfig, user: &Record<User>, token_type: TokenType) -> AppResult<String> {
    let issued = Utc::now();
    let expires = match token_type {
        TokenType::Access => issued + Duration::hours(config.access_ttl_hours),
        TokenType::Refresh => issued + Duration::days(config.refresh_ttl_days),
    };

    let claims = Claims {
        sub: user.id.to_hex(),
        email: user.data.email.clone(),
        name: user.data.name.clone(),
        role: user.data.role,
        token_type,
        iat: issued.timestamp() as usize,
        exp: expires.timestamp() as usize,
        jti: Uuid::new_v4().to_string(),
        aud: config.audience.clone(),
        iss: config.issuer.clone(),
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(config.secret.as_bytes()))
        .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
}

/// Verifies signature, expiry, audience and issuer.
pub fn verify_token(config: &JwtConfig, token: &str) -> AppResult<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[config.audience.as_str()]);
    validation.set_issuer(&[config.issuer.as_str()]);

    decode::<Claims>(token, &DecodingKey::from_secret(config.secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
}

/// Access tokens only. Refresh tokens are rejected on API routes.
pub fn verify_access_token(config: &JwtConfig, token: &str) -> AppResult<Claims> {
    let claims = verify_token(config, token)?;
    if claims.token_type != TokenType::Access {
        return Err(AppError::Unauthorized("Access token required".to_string()));
    }
    Ok(claims)
}

fn auth_response(config: &JwtConfig, user: &Record<User>) -> AppResult<AuthResponse> {
    Ok(AuthResponse {
        success: true,
        token: issue_token(config, user, TokenType::Access)?,
        refresh_token: issue_token(config, user, TokenType::Refresh)?,
        user: UserInfo::from(user),
    })
}

pub fn hash_password(password: &str) -> AppResult<String> {
    hash(password, HASH_COST).map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

pub async fn login(state: &AppState, request: &LoginRequest) -> AppResult<AuthResponse> {
    request.validate()?;
    let repo = state.repo::<User>();

    let user = repo
        .find_one(doc! { "email": request.email.trim().to_lowercase() })
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

    let valid = verify(&request.password, &user.data.password_hash)
        .map_err(|e| AppError::Internal(format!("Password verification error: {}", e)))?;
    if !valid {
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }
    if !user.data.is_active {
        return Err(AppError::Unauthorized("Account is inactive".to_string()));
    }

    let ts = now();
    let user = repo
        .update_by_id(user.id, doc! { "last_login": ts, "updated_at": ts })
        .await?
        .unwrap_or(user);

    auth_response(&state.config.jwt, &user)
}

/// Creates a `sales` account. Other roles are granted by an admin or the seed.
pub async fn register(state: &AppState, request: &RegisterRequest) -> AppResult<AuthResponse> {
    request.validate()?;

    let ts = now();
    let user = User {
        email: request.email.trim().to_lowercase(),
        password_hash: hash_password(&request.password)?,
        name: request.name.trim().to_string(),
        phone: request.phone.clone(),
        role: UserRole::Sales,
        is_active: true,
        last_login: Some(ts),
        created_at: ts,
        updated_at: ts,
    };

    let record = state.repo::<User>().insert(user).await.map_err(|e| match AppError::from(e) {
        AppError::Conflict(_) => AppError::Conflict("User already exists".to_string()),
        other => other,
    })?;

    log::info!("✅ User registered successfully: {}", record.data.email);
    auth_response(&state.config.jwt, &record)
}

pub async fn refresh_token(state: &AppState, request: &RefreshTokenRequest) -> AppResult<AuthResponse> {
    let claims = verify_token(&state.config.jwt, &request.refresh_token)?;
    if claims.token_type != TokenType::Refresh {
        return Err(AppError::Unauthorized("Refresh token required".to_string()));
    }

    let user = find_active_user(state, &claims.sub).await?;
    auth_response(&state.config.jwt, &user)
}

pub async fn get_current_user(state: &AppState, user_id: &str) -> AppResult<UserInfo> {
    let user = find_active_user(state, user_id).await?;
    Ok(UserInfo::from(&user))
}

async fn find_active_user(state: &AppState, user_id: &str) -> AppResult<Record<User>> {
    let oid = parse_object_id(user_id, "user id").map_err(|_| AppError::Unauthorized("Invalid token subject".to_string()))?;
    let user = state
        .repo::<User>()
        .find_by_id(oid)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

    if !user.data.is_active {
        return Err(AppError::Unauthorized("Account is inactive".to_string()));
    }
    Ok(user)
}
