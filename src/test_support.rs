//! Fixtures shared by unit and handler tests.

use std::sync::Arc;

use crate::ai::{AiProvider, AiService, LanguageModel};
use crate::config::{AiConfig, AppConfig, JwtConfig};
use crate::database::{MemoryStore, Record, INDEXES};
use crate::events::EventBus;
use crate::models::{User, UserRole};
use crate::services::auth_service::{self, TokenType};
use crate::state::AppState;

pub fn test_config() -> AppConfig {
    AppConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: "memory://siteops-test".to_string(),
        jwt: JwtConfig {
            secret: "test-secret-with-enough-entropy".to_string(),
            issuer: "siteops-service".to_string(),
            audience: "siteops-api".to_string(),
            access_ttl_hours: 1,
            refresh_ttl_days: 1,
        },
        ai: AiConfig {
            default_provider: AiProvider::Gemini,
            timeout_secs: 5,
            groq: None,
            gemini: None,
            vertex: None,
        },
        cors_origins: vec!["http://localhost:3000".to_string()],
        seed_demo_data: false,
        admin_email: None,
        admin_password: None,
        max_upload_bytes: 1024 * 1024,
    }
}

pub fn test_state() -> AppState {
    test_state_with_ai(AiProvider::Gemini, vec![])
}

pub fn test_state_with_ai(default_provider: AiProvider, models: Vec<Arc<dyn LanguageModel>>) -> AppState {
    AppState::new(
        Arc::new(MemoryStore::with_indexes(INDEXES)),
        EventBus::new(),
        AiService::new(default_provider, models),
        test_config(),
    )
}

/// Inserts an active user and returns it with a valid access token.
pub async fn user_with_token(state: &AppState, email: &str, role: UserRole) -> (Record<User>, String) {
    let user = User {
        email: email.to_string(),
        password_hash: auth_service::hash_password("password123").unwrap(),
        name: email.split('@').next().unwrap_or("user").to_string(),
        phone: None,
        role,
        is_active: true,
        last_login: None,
        created_at: 0,
        updated_at: 0,
    };
    let record = state.repo::<User>().insert(user).await.unwrap();
    let token = auth_service::issue_token(&state.config.jwt, &record, TokenType::Access).unwrap();
    (record, token)
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}
