use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::{non_empty, read_json, AiError, AiProvider, LanguageModel};
use crate::config::GeminiConfig;

/// Google AI Studio `generateContent` client. Accepts PDFs as inline data.
pub struct GeminiClient {
    http: reqwest::Client,
    config: GeminiConfig,
}

// Request and response shapes shared with the Vertex client, which speaks the same
// `generateContent` dialect behind a different URL and auth scheme.

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfig {
    pub temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Candidate {
    pub content: Option<Content>,
}

impl Part {
    fn text(text: &str) -> Self {
        Self { text: Some(text.to_string()), inline_data: None }
    }

    fn pdf(bytes: &[u8]) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: "application/pdf".to_string(),
                data: base64::engine::general_purpose::STANDARD.encode(bytes),
            }),
        }
    }
}

impl GenerateRequest {
    pub fn prompt(system: &str, prompt: &str) -> Self {
        Self::with_parts(Some(system), vec![Part::text(prompt)])
    }

    pub fn pdf(pdf: &[u8], instructions: &str) -> Self {
        Self::with_parts(
            Some(super::prompts::SUMMARY_SYSTEM_PROMPT),
            vec![Part::pdf(pdf), Part::text(instructions)],
        )
    }

    fn with_parts(system: Option<&str>, parts: Vec<Part>) -> Self {
        Self {
            system_instruction: system.map(|s| Content { role: None, parts: vec![Part::text(s)] }),
            contents: vec![Content { role: Some("user".to_string()), parts }],
            generation_config: GenerationConfig { temperature: 0.3 },
        }
    }
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate.
    pub fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        Some(text)
    }
}

impl GeminiClient {
    pub fn new(http: reqwest::Client, config: GeminiConfig) -> Self {
        Self { http, config }
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<String, AiError> {
        let response = self
            .http
            .post(self.url())
            .query(&[("key", self.config.api_key.as_str())])
            .json(request)
            .send()
            .await
            .map_err(|source| AiError::Http { provider: AiProvider::Gemini, source })?;

        let body: GenerateResponse = read_json(AiProvider::Gemini, response).await?;
        non_empty(AiProvider::Gemini, body.into_text())
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    fn provider(&self) -> AiProvider {
        AiProvider::Gemini
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, system: &str, prompt: &str) -> Result<String, AiError> {
        self.generate(&GenerateRequest::prompt(system, prompt)).await
    }

    async fn summarize_pdf(&self, pdf: &[u8], instructions: &str) -> Result<String, AiError> {
        self.generate(&GenerateRequest::pdf(pdf, instructions)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> GeminiClient {
        GeminiClient::new(
            reqwest::Client::new(),
            GeminiConfig {
                api_key: "AIza-test".to_string(),
                model: "gemini-1.5-flash".to_string(),
                base_url: server.uri(),
            },
        )
    }

    fn candidate(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
        })
    }

    #[tokio::test]
    async fn sends_key_as_query_parameter() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .and(query_param("key", "AIza-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate("Tower B is 60% complete.")))
            .expect(1)
            .mount(&server)
            .await;

        let text = client(&server).complete("system", "Progress on tower B?").await.unwrap();
        assert_eq!(text, "Tower B is 60% complete.");
    }

    #[tokio::test]
    async fn pdf_is_sent_inline_as_base64() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "contents": [{
                    "role": "user",
                    "parts": [{ "inlineData": { "mimeType": "application/pdf", "data": "JVBERi0xLjQ=" } }]
                }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate("Two-page site contract.")))
            .expect(1)
            .mount(&server)
            .await;

        let text = client(&server).summarize_pdf(b"%PDF-1.4", "Summarize").await.unwrap();
        assert_eq!(text, "Two-page site contract.");
    }

    #[tokio::test]
    async fn missing_candidates_is_an_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "candidates": [] })))
            .mount(&server)
            .await;

        let err = client(&server).complete("system", "hi").await.unwrap_err();
        assert!(matches!(err, AiError::EmptyResponse(AiProvider::Gemini)));
    }

    #[tokio::test]
    async fn server_errors_are_wrapped() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
            .mount(&server)
            .await;

        let err = client(&server).complete("system", "hi").await.unwrap_err();
        assert!(matches!(err, AiError::Provider { provider: AiProvider::Gemini, status: 500, .. }));
    }
}
