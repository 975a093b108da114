//! Dealflow LLM - Text Generation Providers
//!
//! A single provider trait for chat-style text generation, the stage-specific
//! email prompts, and an OpenAI chat-completions implementation.
//!
//! The provider key is passed on every call rather than held by the
//! provider, so a missing or rotated secret is only discovered when a
//! generation is actually requested.

use async_trait::async_trait;
use dealflow_core::LlmError;

pub mod prompt;
pub mod providers;

pub use prompt::{
    build_stage_prompt, email_generation_request, EmailPromptInput, DEFAULT_MAX_TOKENS,
    DEFAULT_TEMPERATURE, SYSTEM_INSTRUCTION,
};
pub use providers::openai::{OpenAIClient, OpenAICompletionProvider};

/// One generation call: system instruction, user prompt and sampling limits.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Chat-style text generation.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Generate text for `request` using `api_key`.
    ///
    /// Returns the first completion's content. A response without usable
    /// content is [`LlmError::EmptyCompletion`].
    async fn complete(&self, api_key: &str, request: &GenerationRequest)
        -> Result<String, LlmError>;

    /// Provider name used in errors and logs.
    fn name(&self) -> &str;
}
