//! Thin wrappers around hosted generative-AI APIs.
//!
//! Each provider is one outbound HTTP call per request: no retries, no
//! batching, no streaming. Failures are returned as [`AiError`].

pub mod gemini;
pub mod groq;
pub mod prompts;
pub mod vertex;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::AiConfig;

pub use gemini::GeminiClient;
pub use groq::GroqClient;
pub use vertex::VertexClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    Groq,
    Gemini,
    Vertex,
}

impl fmt::Display for AiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AiProvider::Groq => "groq",
            AiProvider::Gemini => "gemini",
            AiProvider::Vertex => "vertex",
        };
        f.write_str(name)
    }
}

impl FromStr for AiProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "groq" => Ok(AiProvider::Groq),
            "gemini" => Ok(AiProvider::Gemini),
            "vertex" | "vertex_ai" | "vertexai" => Ok(AiProvider::Vertex),
            other => Err(format!("Unknown AI provider: {}. Supported: groq, gemini, vertex", other)),
        }
    }
}

#[derive(Debug, Error)]
pub enum AiError {
    #[error("provider {0} is not configured")]
    NotConfigured(AiProvider),

    #[error("provider {provider} does not support {operation}")]
    Unsupported {
        provider: AiProvider,
        operation: &'static str,
    },

    #[error("request to {provider} failed: {source}")]
    Http {
        provider: AiProvider,
        source: reqwest::Error,
    },

    #[error("{provider} returned HTTP {status}: {body}")]
    Provider {
        provider: AiProvider,
        status: u16,
        body: String,
    },

    #[error("{0} returned an empty response")]
    EmptyResponse(AiProvider),
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    fn provider(&self) -> AiProvider;

    fn model(&self) -> &str;

    async fn complete(&self, system: &str, prompt: &str) -> Result<String, AiError>;

    async fn summarize_pdf(&self, _pdf: &[u8], _instructions: &str) -> Result<String, AiError> {
        Err(AiError::Unsupported {
            provider: self.provider(),
            operation: "PDF summarization",
        })
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct AiAnswer {
    pub provider: AiProvider,
    pub model: String,
    pub text: String,
}

/// The enabled providers plus the default one. Built once at startup.
pub struct AiService {
    models: HashMap<AiProvider, Arc<dyn LanguageModel>>,
    default_provider: AiProvider,
}

impl AiService {
    pub fn new(default_provider: AiProvider, models: Vec<Arc<dyn LanguageModel>>) -> Self {
        let models = models.into_iter().map(|m| (m.provider(), m)).collect();
        Self { models, default_provider }
    }

    pub fn from_config(config: &AiConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let mut models: Vec<Arc<dyn LanguageModel>> = Vec::new();
        if let Some(groq) = &config.groq {
            models.push(Arc::new(GroqClient::new(http.clone(), groq.clone())));
        }
        if let Some(gemini) = &config.gemini {
            models.push(Arc::new(GeminiClient::new(http.clone(), gemini.clone())));
        }
        if let Some(vertex) = &config.vertex {
            models.push(Arc::new(VertexClient::new(http.clone(), vertex.clone())));
        }

        Ok(Self::new(config.default_provider, models))
    }

    pub fn providers(&self) -> Vec<AiProvider> {
        let mut providers: Vec<AiProvider> = self.models.keys().copied().collect();
        providers.sort_by_key(|p| p.to_string());
        providers
    }

    fn model(&self, requested: Option<AiProvider>) -> Result<&Arc<dyn LanguageModel>, AiError> {
        let provider = requested.unwrap_or(self.default_provider);
        self.models.get(&provider).ok_or(AiError::NotConfigured(provider))
    }

    pub async fn answer(
        &self,
        requested: Option<AiProvider>,
        query: &str,
        context: Option<&str>,
    ) -> Result<AiAnswer, AiError> {
        let model = self.model(requested)?;
        log::info!("🤖 AI query via {} ({})", model.provider(), model.model());

        let prompt = prompts::query_prompt(query, context);
        let text = model.complete(prompts::ASSISTANT_SYSTEM_PROMPT, &prompt).await?;

        Ok(AiAnswer {
            provider: model.provider(),
            model: model.model().to_string(),
            text,
        })
    }

    pub async fn summarize_pdf(&self, requested: Option<AiProvider>, pdf: &[u8]) -> Result<AiAnswer, AiError> {
        let model = self.model(requested)?;
        log::info!("📄 PDF summary via {} ({}) - {} bytes", model.provider(), model.model(), pdf.len());

        let text = model.summarize_pdf(pdf, prompts::PDF_SUMMARY_INSTRUCTIONS).await?;

        Ok(AiAnswer {
            provider: model.provider(),
            model: model.model().to_string(),
            text,
        })
    }
}

/// Checks the status and decodes the JSON body of a provider response.
pub(crate) async fn read_json<T: DeserializeOwned>(
    provider: AiProvider,
    response: reqwest::Response,
) -> Result<T, AiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        log::warn!("❌ {} returned {}: {}", provider, status, body);
        return Err(AiError::Provider {
            provider,
            status: status.as_u16(),
            body,
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|source| AiError::Http { provider, source })
}

/// Drops blank answers so callers never store or return an empty summary.
pub(crate) fn non_empty(provider: AiProvider, text: Option<String>) -> Result<String, AiError> {
    text.map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or(AiError::EmptyResponse(provider))
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Canned model used by handler tests.
    pub struct FakeModel {
        pub provider: AiProvider,
        pub reply: Result<String, u16>,
        pub calls: AtomicUsize,
    }

    impl FakeModel {
        pub fn replying(provider: AiProvider, reply: &str) -> Arc<Self> {
            Arc::new(Self { provider, reply: Ok(reply.to_string()), calls: AtomicUsize::new(0) })
        }

        pub fn failing(provider: AiProvider, status: u16) -> Arc<Self> {
            Arc::new(Self { provider, reply: Err(status), calls: AtomicUsize::new(0) })
        }

        fn respond(&self) -> Result<String, AiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone().map_err(|status| AiError::Provider {
                provider: self.provider,
                status,
                body: "upstream failure".to_string(),
            })
        }
    }

    #[async_trait]
    impl LanguageModel for FakeModel {
        fn provider(&self) -> AiProvider {
            self.provider
        }

        fn model(&self) -> &str {
            "fake-model"
        }

        async fn complete(&self, _system: &str, _prompt: &str) -> Result<String, AiError> {
            self.respond()
        }

        async fn summarize_pdf(&self, _pdf: &[u8], _instructions: &str) -> Result<String, AiError> {
            self.respond()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::FakeModel;
    use super::*;

    #[test]
    fn provider_names_round_trip() {
        assert_eq!("Gemini".parse::<AiProvider>().unwrap(), AiProvider::Gemini);
        assert_eq!("vertex_ai".parse::<AiProvider>().unwrap(), AiProvider::Vertex);
        assert_eq!(AiProvider::Groq.to_string(), "groq");
        assert!("openai".parse::<AiProvider>().is_err());
    }

    #[tokio::test]
    async fn uses_default_provider_when_none_requested() {
        let gemini = FakeModel::replying(AiProvider::Gemini, "42 units remain");
        let service = AiService::new(AiProvider::Gemini, vec![gemini.clone()]);

        let answer = service.answer(None, "How many units remain?", None).await.unwrap();
        assert_eq!(answer.provider, AiProvider::Gemini);
        assert_eq!(answer.text, "42 units remain");
    }

    #[tokio::test]
    async fn unconfigured_provider_is_reported() {
        let service = AiService::new(AiProvider::Gemini, vec![]);
        let err = service.answer(Some(AiProvider::Groq), "hi", None).await.unwrap_err();
        assert!(matches!(err, AiError::NotConfigured(AiProvider::Groq)));
    }

    #[tokio::test]
    async fn provider_errors_propagate() {
        let groq = FakeModel::failing(AiProvider::Groq, 503);
        let service = AiService::new(AiProvider::Groq, vec![groq]);

        let err = service.summarize_pdf(None, b"%PDF-1.7").await.unwrap_err();
        assert!(matches!(err, AiError::Provider { status: 503, .. }));
    }

    #[test]
    fn blank_text_is_an_empty_response() {
        assert!(matches!(
            non_empty(AiProvider::Gemini, Some("   ".to_string())),
            Err(AiError::EmptyResponse(AiProvider::Gemini))
        ));
        assert_eq!(non_empty(AiProvider::Gemini, Some(" ok ".to_string())).unwrap(), "ok");
    }
}
