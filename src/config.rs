use std::env;
use std::str::FromStr;

use crate::ai::AiProvider;
use crate::utils::error::AppError;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub jwt: JwtConfig,
    pub ai: AiConfig,
    pub cors_origins: Vec<String>,
    pub seed_demo_data: bool,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub access_ttl_hours: i64,
    pub refresh_ttl_days: i64,
}

#[derive(Debug, Clone)]
pub struct AiConfig {
    pub default_provider: AiProvider,
    pub timeout_secs: u64,
    pub groq: Option<GroqConfig>,
    pub gemini: Option<GeminiConfig>,
    pub vertex: Option<VertexConfig>,
}

#[derive(Debug, Clone)]
pub struct GroqConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct VertexConfig {
    pub project_id: String,
    pub location: String,
    pub model: String,
    pub access_token: String,
    pub base_url: String,
}

impl AppConfig {
    /// Reads the configuration from the environment (after `.env` has been loaded).
    pub fn from_env() -> Result<Self, AppError> {
        let jwt = JwtConfig {
            secret: required("JWT_SECRET")?,
            issuer: var_or("JWT_ISSUER", "siteops-service"),
            audience: var_or("JWT_AUDIENCE", "siteops-api"),
            access_ttl_hours: parsed("JWT_ACCESS_TTL_HOURS", 24)?,
            refresh_ttl_days: parsed("JWT_REFRESH_TTL_DAYS", 30)?,
        };

        let cors_origins = var_or("CORS_ORIGINS", "http://localhost:3000")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            host: var_or("HOST", "0.0.0.0"),
            port: parsed("PORT", 3002)?,
            database_url: required("DATABASE_URL")?,
            jwt,
            ai: AiConfig::from_env()?,
            cors_origins,
            seed_demo_data: parsed("SEED_DEMO_DATA", false)?,
            admin_email: optional("ADMIN_EMAIL"),
            admin_password: optional("ADMIN_PASSWORD"),
            max_upload_bytes: parsed::<usize>("MAX_UPLOAD_MB", 10)? * 1024 * 1024,
        })
    }
}

impl AiConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let default_provider = var_or("AI_DEFAULT_PROVIDER", "gemini")
            .parse::<AiProvider>()
            .map_err(AppError::Config)?;

        let groq = optional("GROQ_API_KEY").map(|api_key| GroqConfig {
            api_key,
            model: var_or("GROQ_MODEL", "llama-3.3-70b-versatile"),
            base_url: var_or("GROQ_BASE_URL", "https://api.groq.com"),
        });

        let gemini = optional("GEMINI_API_KEY").map(|api_key| GeminiConfig {
            api_key,
            model: var_or("GEMINI_MODEL", "gemini-1.5-flash"),
            base_url: var_or("GEMINI_BASE_URL", "https://generativelanguage.googleapis.com"),
        });

        let vertex = match (optional("VERTEX_PROJECT_ID"), optional("VERTEX_ACCESS_TOKEN")) {
            (Some(project_id), Some(access_token)) => {
                let location = var_or("VERTEX_LOCATION", "us-central1");
                Some(VertexConfig {
                    base_url: var_or(
                        "VERTEX_BASE_URL",
                        &format!("https://{}-aiplatform.googleapis.com", location),
                    ),
                    project_id,
                    location,
                    model: var_or("VERTEX_MODEL", "gemini-1.5-pro"),
                    access_token,
                })
            }
            _ => None,
        };

        Ok(Self {
            default_provider,
            timeout_secs: parsed("AI_TIMEOUT_SECS", 60)?,
            groq,
            gemini,
            vertex,
        })
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn var_or(key: &str, default: &str) -> String {
    optional(key).unwrap_or_else(|| default.to_string())
}

fn required(key: &str) -> Result<String, AppError> {
    optional(key).ok_or_else(|| AppError::Config(format!("{} must be set", key)))
}

fn parsed<T: FromStr>(key: &str, default: T) -> Result<T, AppError> {
    match optional(key) {
        Some(raw) => raw
            .parse()
            .map_err(|_| AppError::Config(format!("{} has an invalid value: {}", key, raw))),
        None => Ok(default),
    }
}
