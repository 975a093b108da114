//! OpenAI chat-completion provider

use super::client::OpenAIClient;
use super::types::{CompletionRequest, CompletionResponse, Message};
use crate::{CompletionProvider, GenerationRequest};
use async_trait::async_trait;
use dealflow_core::LlmError;

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";

/// Chat-completion provider backed by [`OpenAIClient`].
#[derive(Debug, Clone)]
pub struct OpenAICompletionProvider {
    client: OpenAIClient,
    model: String,
}

impl OpenAICompletionProvider {
    pub fn new(client: OpenAIClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionProvider for OpenAICompletionProvider {
    async fn complete(
        &self,
        api_key: &str,
        request: &GenerationRequest,
    ) -> Result<String, LlmError> {
        let body = CompletionRequest {
            model: self.model.clone(),
            messages: vec![
                Message::system(request.system.clone()),
                Message::user(request.prompt.clone()),
            ],
            max_tokens: Some(request.max_tokens),
            temperature: Some(request.temperature),
        };

        let response: CompletionResponse = self
            .client
            .request(api_key, "chat/completions", &body)
            .await?;

        if let Some(usage) = &response.usage {
            tracing::debug!(
                model = %self.model,
                total_tokens = usage.total_tokens,
                "OpenAI completion finished"
            );
        }

        response
            .first_content()
            .map(str::to_string)
            .ok_or_else(|| LlmError::EmptyCompletion {
                provider: self.name().to_string(),
            })
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::{email_generation_request, EmailPromptInput};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> OpenAICompletionProvider {
        let client = OpenAIClient::new(format!("{}/v1", server.uri()), Duration::from_secs(5))
            .unwrap();
        OpenAICompletionProvider::new(client, "gpt-3.5-turbo")
    }

    fn request() -> GenerationRequest {
        email_generation_request(&EmailPromptInput {
            deal_title: "Fleet renewal".to_string(),
            stage: "Proposal".to_string(),
            deal_value: Some(50000.0),
            contact_name: None,
        })
    }

    #[tokio::test]
    async fn test_complete_sends_chat_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-api-key"))
            .and(body_partial_json(json!({
                "model": "gpt-3.5-turbo",
                "max_tokens": 500,
                "temperature": 0.7
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{
                    "message": {"role": "assistant", "content": "Subject: Your proposal"},
                    "finish_reason": "stop"
                }],
                "usage": {"prompt_tokens": 80, "completion_tokens": 40, "total_tokens": 120}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = provider(&server)
            .complete("test-api-key", &request())
            .await
            .unwrap();
        assert_eq!(text, "Subject: Your proposal");
    }

    #[tokio::test]
    async fn test_error_status_carries_provider_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
            })))
            .mount(&server)
            .await;

        let err = provider(&server)
            .complete("bad-key", &request())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            LlmError::RequestFailed {
                provider: "openai".to_string(),
                status: 401,
                message: "Incorrect API key provided".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_error_status_without_body_uses_generic_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = provider(&server)
            .complete("key", &request())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LlmError::RequestFailed { status: 503, ref message, .. }
                if message == "OpenAI API error (status 503)"
        ));
    }

    #[tokio::test]
    async fn test_rate_limit_maps_to_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": {"message": "Rate limit reached"}
            })))
            .mount(&server)
            .await;

        let err = provider(&server)
            .complete("key", &request())
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::RateLimited { .. }));
    }

    #[tokio::test]
    async fn test_missing_content_is_empty_completion() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let err = provider(&server)
            .complete("key", &request())
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::EmptyCompletion { .. }));
    }

    #[tokio::test]
    async fn test_slow_provider_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_millis(500))
                    .set_body_json(json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let client =
            OpenAIClient::new(format!("{}/v1", server.uri()), Duration::from_millis(50)).unwrap();
        let err = OpenAICompletionProvider::new(client, "gpt-3.5-turbo")
            .complete("key", &request())
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Timeout { timeout_ms: 50, .. }));
    }
}
