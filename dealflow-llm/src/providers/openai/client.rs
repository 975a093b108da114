//! OpenAI HTTP client

use super::types::ApiError;
use crate::providers::{invalid_response, request_failed, transport_error};
use dealflow_core::LlmError;
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

const PROVIDER: &str = "openai";

/// OpenAI REST client. The API key is supplied per request.
#[derive(Clone)]
pub struct OpenAIClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl OpenAIClient {
    /// Create a client for `base_url` (e.g. `https://api.openai.com/v1`)
    /// whose requests give up after `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| transport_error(PROVIDER, format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST `body` to `endpoint` and decode the JSON response.
    ///
    /// Non-2xx statuses become [`LlmError::RequestFailed`] (or
    /// [`LlmError::RateLimited`] for 429) carrying the provider's own error
    /// message when the body has one.
    pub async fn request<Req: Serialize + Sync, Res: DeserializeOwned>(
        &self,
        api_key: &str,
        endpoint: &str,
        body: &Req,
    ) -> Result<Res, LlmError> {
        let url = format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'));
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout {
                        provider: PROVIDER.to_string(),
                        timeout_ms: self.timeout.as_millis() as u64,
                    }
                } else {
                    transport_error(PROVIDER, format!("HTTP request failed: {}", e))
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| invalid_response(PROVIDER, format!("Failed to parse response: {}", e)));
        }

        let error_text = response.text().await.unwrap_or_default();
        let error_msg = serde_json::from_str::<ApiError>(&error_text)
            .map(|api_error| api_error.error.message)
            .ok()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("OpenAI API error (status {})", status.as_u16()));

        tracing::warn!(status = status.as_u16(), "OpenAI request failed");
        Err(match status {
            StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimited {
                provider: PROVIDER.to_string(),
                message: error_msg,
            },
            _ => request_failed(PROVIDER, status.as_u16(), error_msg),
        })
    }
}

impl std::fmt::Debug for OpenAIClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}
