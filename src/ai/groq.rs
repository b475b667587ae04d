use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{non_empty, read_json, AiError, AiProvider, LanguageModel};
use crate::config::GroqConfig;

/// Groq exposes an OpenAI-compatible chat completions endpoint.
pub struct GroqClient {
    http: reqwest::Client,
    config: GroqConfig,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl GroqClient {
    pub fn new(http: reqwest::Client, config: GroqConfig) -> Self {
        Self { http, config }
    }

    fn url(&self) -> String {
        format!("{}/openai/v1/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl LanguageModel for GroqClient {
    fn provider(&self) -> AiProvider {
        AiProvider::Groq
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, system: &str, prompt: &str) -> Result<String, AiError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: prompt },
            ],
            temperature: 0.3,
        };

        let response = self
            .http
            .post(self.url())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|source| AiError::Http { provider: AiProvider::Groq, source })?;

        let body: ChatResponse = read_json(AiProvider::Groq, response).await?;
        let text = body.choices.into_iter().next().and_then(|c| c.message.content);
        non_empty(AiProvider::Groq, text)
    }
}
