//! Text-generation provider implementations

pub mod openai;

use dealflow_core::LlmError;

pub(crate) fn request_failed(provider: &str, status: u16, message: impl Into<String>) -> LlmError {
    LlmError::RequestFailed {
        provider: provider.to_string(),
        status,
        message: message.into(),
    }
}

pub(crate) fn invalid_response(provider: &str, reason: impl Into<String>) -> LlmError {
    LlmError::InvalidResponse {
        provider: provider.to_string(),
        reason: reason.into(),
    }
}

pub(crate) fn transport_error(provider: &str, reason: impl Into<String>) -> LlmError {
    LlmError::Transport {
        provider: provider.to_string(),
        reason: reason.into(),
    }
}
