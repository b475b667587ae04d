use async_trait::async_trait;

use super::gemini::{GenerateRequest, GenerateResponse};
use super::{non_empty, read_json, AiError, AiProvider, LanguageModel};
use crate::config::VertexConfig;

/// Gemini models served through Vertex AI. Authenticates with an OAuth access token.
pub struct VertexClient {
    http: reqwest::Client,
    config: VertexConfig,
}

impl VertexClient {
    pub fn new(http: reqwest::Client, config: VertexConfig) -> Self {
        Self { http, config }
    }

    fn url(&self) -> String {
        format!(
            "{}/v1/projects/{}/locations/{}/publishers/google/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.project_id,
            self.config.location,
            self.config.model
        )
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<String, AiError> {
        let response = self
            .http
            .post(self.url())
            .bearer_auth(&self.config.access_token)
            .json(request)
            .send()
            .await
            .map_err(|source| AiError::Http { provider: AiProvider::Vertex, source })?;

        let body: GenerateResponse = read_json(AiProvider::Vertex, response).await?;
        non_empty(AiProvider::Vertex, body.into_text())
    }
}

#[async_trait]
impl LanguageModel for VertexClient {
    fn provider(&self) -> AiProvider {
        AiProvider::Vertex
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
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> VertexClient {
        VertexClient::new(
            reqwest::Client::new(),
            VertexConfig {
                project_id: "siteops-prod".to_string(),
                location: "asia-south1".to_string(),
                model: "gemini-1.5-pro".to_string(),
                access_token: "ya29.token".to_string(),
                base_url: server.uri(),
            },
        )
    }

    #[tokio::test]
    async fn calls_publisher_model_with_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(
                "/v1/projects/siteops-prod/locations/asia-south1/publishers/google/models/gemini-1.5-pro:generateContent",
            ))
            .and(header("authorization", "Bearer ya29.token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{ "content": { "parts": [{ "text": "Invoice totals 4.2L" }, { "text": " INR." }] } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = client(&server).summarize_pdf(b"%PDF-1.5", "Summarize").await.unwrap();
        assert_eq!(text, "Invoice totals 4.2L INR.");
    }

    #[tokio::test]
    async fn expired_token_surfaces_as_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("token expired"))
            .mount(&server)
            .await;

        let err = client(&server).complete("system", "hi").await.unwrap_err();
        assert!(matches!(err, AiError::Provider { provider: AiProvider::Vertex, status: 401, .. }));
    }
}
