//! Client side of email-draft generation, as used by the deal orchestrator.
//!
//! The orchestrator only sees [`EmailDraftClient`]. Generation can run
//! in-process ([`LocalEmailDraftClient`]) or against a deployed generator
//! function ([`HttpEmailDraftClient`]); both report failure through
//! [`EmailDraftFailure`], which never reaches the persistence result.

use super::generator::EmailGenerator;
use super::request::EmailDraftRequest;
use crate::error::ApiError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Why a draft could not be produced.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailDraftFailure {
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("Email service unreachable: {reason}")]
    Transport { reason: String },

    #[error("Malformed email service response: {reason}")]
    Malformed { reason: String },

    #[error("Email generation timed out after {timeout_ms}ms")]
    TimedOut { timeout_ms: u64 },

    #[error("Email service returned an empty template")]
    EmptyTemplate,
}

#[async_trait]
pub trait EmailDraftClient: Send + Sync {
    /// Produce a draft for `request`. A blank template is a failure.
    async fn generate_draft(&self, request: &EmailDraftRequest)
        -> Result<String, EmailDraftFailure>;
}

// ============================================================================
// IN-PROCESS CLIENT
// ============================================================================

/// Calls the generator directly, without an HTTP hop.
#[derive(Debug, Clone)]
pub struct LocalEmailDraftClient {
    generator: EmailGenerator,
}

impl LocalEmailDraftClient {
    pub fn new(generator: EmailGenerator) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl EmailDraftClient for LocalEmailDraftClient {
    async fn generate_draft(
        &self,
        request: &EmailDraftRequest,
    ) -> Result<String, EmailDraftFailure> {
        let input = request.to_prompt_input().map_err(rejected)?;
        let generated = self.generator.generate(&input).await.map_err(rejected)?;
        non_blank(generated.email_template)
    }
}

fn rejected(e: ApiError) -> EmailDraftFailure {
    EmailDraftFailure::Rejected {
        status: e.status_code().as_u16(),
        message: e.message,
    }
}

// ============================================================================
// HTTP CLIENT
// ============================================================================

/// Response envelope of the deployed generator function.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DraftEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    email_template: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Posts to a deployed generator function.
#[derive(Clone)]
pub struct HttpEmailDraftClient {
    client: Client,
    url: String,
    timeout: Duration,
}

impl HttpEmailDraftClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, EmailDraftFailure> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EmailDraftFailure::Transport {
                reason: format!("Failed to build HTTP client: {}", e),
            })?;
        Ok(Self {
            client,
            url: url.into(),
            timeout,
        })
    }
}

#[async_trait]
impl EmailDraftClient for HttpEmailDraftClient {
    async fn generate_draft(
        &self,
        request: &EmailDraftRequest,
    ) -> Result<String, EmailDraftFailure> {
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EmailDraftFailure::TimedOut {
                        timeout_ms: self.timeout.as_millis() as u64,
                    }
                } else {
                    EmailDraftFailure::Transport {
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| EmailDraftFailure::Transport {
            reason: e.to_string(),
        })?;
        let envelope: DraftEnvelope =
            serde_json::from_str(&text).map_err(|e| EmailDraftFailure::Malformed {
                reason: e.to_string(),
            })?;

        if !status.is_success() || !envelope.success {
            return Err(EmailDraftFailure::Rejected {
                status: status.as_u16(),
                message: envelope
                    .message
                    .unwrap_or_else(|| format!("Email service error (status {})", status.as_u16())),
            });
        }
        non_blank(envelope.email_template.unwrap_or_default())
    }
}

impl std::fmt::Debug for HttpEmailDraftClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpEmailDraftClient")
            .field("url", &self.url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn non_blank(template: String) -> Result<String, EmailDraftFailure> {
    if template.trim().is_empty() {
        Err(EmailDraftFailure::EmptyTemplate)
    } else {
        Ok(template)
    }
}
