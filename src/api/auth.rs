use actix_web::{web, HttpRequest, HttpResponse};

use super::failure;
use crate::middleware::auth::bearer_token;
use crate::models::{AuthResponse, LoginRequest, RefreshTokenRequest, RegisterRequest, UserInfo};
use crate::services::auth_service::{self, Claims};
use crate::state::AppState;
use crate::utils::AppError;

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(state: web::Data<AppState>, request: web::Json<LoginRequest>) -> HttpResponse {
    log::info!("🔐 POST /auth/login - email: {}", request.email);

    match auth_service::login(&state, &request).await {
        Ok(response) => {
            log::info!("✅ Login successful: {}", request.email);
            HttpResponse::Ok().json(response)
        }
        Err(e) => failure("POST /auth/login", e),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registration successful", body = AuthResponse),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "User already exists")
    )
)]
pub async fn register(state: web::Data<AppState>, request: web::Json<RegisterRequest>) -> HttpResponse {
    log::info!("📝 POST /auth/register - email: {}", request.email);

    match auth_service::register(&state, &request).await {
        Ok(response) => HttpResponse::Created().json(response),
        Err(e) => failure("POST /auth/register", e),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    tag = "Auth",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "New token pair", body = AuthResponse),
        (status = 401, description = "Invalid refresh token")
    )
)]
pub async fn refresh_token(state: web::Data<AppState>, request: web::Json<RefreshTokenRequest>) -> HttpResponse {
    log::info!("🔄 POST /auth/refresh");

    match auth_service::refresh_token(&state, &request).await {
        Ok(response) => {
            log::info!("✅ Token refreshed for {}", response.user.email);
            HttpResponse::Ok().json(response)
        }
        Err(e) => failure("POST /auth/refresh", e),
    }
}

/// Accepts any valid token (access or refresh).
#[utoipa::path(
    get,
    path = "/api/v1/auth/verify",
    tag = "Auth",
    responses(
        (status = 200, description = "Token is valid"),
        (status = 401, description = "Invalid or expired token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn verify_token(state: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    log::info!("✓ GET /auth/verify");

    let Some(token) = bearer_token(req.headers()) else {
        return failure(
            "GET /auth/verify",
            AppError::Unauthorized("Missing authorization token".to_string()),
        );
    };

    match auth_service::verify_token(&state.config.jwt, token) {
        Ok(claims) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "valid": true,
            "user_id": claims.sub,
            "email": claims.email,
            "role": claims.role,
            "token_type": claims.token_type,
            "exp": claims.exp
        })),
        Err(e) => failure("GET /auth/verify", e),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "User information retrieved", body = UserInfo),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_me(state: web::Data<AppState>, claims: web::ReqData<Claims>) -> HttpResponse {
    log::info!("👤 GET /auth/me - {}", claims.sub);

    match auth_service::get_current_user(&state, &claims.sub).await {
        Ok(user) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "user": user
        })),
        Err(e) => failure("GET /auth/me", e),
    }
}
