//! Stage email generation against a completion provider.

use super::request::{GenerateEmailRequest, GeneratedEmail};
use crate::error::{ApiError, ApiResult};
use crate::secrets::{SecretStore, OPENAI_API_KEY};
use axum::http::Method;
use dealflow_core::ConfigError;
use dealflow_llm::{email_generation_request, CompletionProvider, EmailPromptInput};
use secrecy::ExposeSecret;
use std::sync::Arc;

pub const MISSING_KEY_MESSAGE: &str =
    "OpenAI API key not configured. Please add OPENAI_API_KEY to secrets.";

/// Stateless email generator. Holds no per-request state; the provider key
/// is resolved from the secret store on every call.
#[derive(Clone)]
pub struct EmailGenerator {
    provider: Arc<dyn CompletionProvider>,
    secrets: Arc<dyn SecretStore>,
}

impl EmailGenerator {
    pub fn new(provider: Arc<dyn CompletionProvider>, secrets: Arc<dyn SecretStore>) -> Self {
        Self { provider, secrets }
    }

    /// Handle one raw HTTP exchange.
    ///
    /// Method, body and secret are all checked before the provider is
    /// contacted.
    pub async fn handle(&self, method: &Method, body: &[u8]) -> ApiResult<GeneratedEmail> {
        if method != Method::POST {
            return Err(ApiError::method_not_allowed());
        }
        let input = GenerateEmailRequest::from_body(body)?.into_prompt_input()?;
        self.generate(&input).await
    }

    /// Generate a template for a validated input.
    pub async fn generate(&self, input: &EmailPromptInput) -> ApiResult<GeneratedEmail> {
        let api_key = self.secrets.require(OPENAI_API_KEY).map_err(|e| match e {
            ConfigError::SecretMissing { .. } => {
                tracing::error!(secret = OPENAI_API_KEY, "Provider key not configured");
                ApiError::configuration_error(MISSING_KEY_MESSAGE)
            }
            other => ApiError::from(other),
        })?;

        let request = email_generation_request(input);
        tracing::debug!(
            provider = self.provider.name(),
            stage = %input.stage,
            "Generating deal email"
        );

        let template = self
            .provider
            .complete(api_key.expose_secret(), &request)
            .await
            .map_err(|e| {
                tracing::warn!(provider = self.provider.name(), error = %e, "Email generation failed");
                ApiError::from(e)
            })?;

        Ok(GeneratedEmail {
            success: true,
            email_template: template,
            stage: input.stage.clone(),
        })
    }
}

impl std::fmt::Debug for EmailGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailGenerator")
            .field("provider", &self.provider.name())
            .finish()
    }
}
