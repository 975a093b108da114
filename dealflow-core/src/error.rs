//! Error types for dealflow operations

use crate::{EntityType, RecordId};
use thiserror::Error;

/// Record store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Record not found: {entity_type:?} with id {id}")]
    NotFound { entity_type: EntityType, id: RecordId },

    #[error("Fetch failed for {entity_type:?}: {reason}")]
    FetchFailed { entity_type: EntityType, reason: String },

    #[error("Insert failed for {entity_type:?}: {reason}")]
    InsertFailed { entity_type: EntityType, reason: String },

    #[error("Update failed for {entity_type:?} with id {id}: {reason}")]
    UpdateFailed {
        entity_type: EntityType,
        id: RecordId,
        reason: String,
    },

    #[error("Delete failed for {entity_type:?}: {reason}")]
    DeleteFailed { entity_type: EntityType, reason: String },

    #[error("{failed} of {total} records failed for {entity_type:?}: {messages:?}")]
    PartialBatch {
        entity_type: EntityType,
        total: usize,
        failed: usize,
        messages: Vec<String>,
    },

    #[error("Record store transport error: {reason}")]
    Transport { reason: String },

    #[error("Malformed record store response: {reason}")]
    MalformedResponse { reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Text-generation provider errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LlmError {
    #[error("No LLM provider configured")]
    ProviderNotConfigured,

    #[error("Request to {provider} failed with status {status}: {message}")]
    RequestFailed {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("Rate limited by {provider}: {message}")]
    RateLimited { provider: String, message: String },

    #[error("Transport error talking to {provider}: {reason}")]
    Transport { provider: String, reason: String },

    #[error("Request to {provider} timed out after {timeout_ms}ms")]
    Timeout { provider: String, timeout_ms: u64 },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("{provider} returned no completion content")]
    EmptyCompletion { provider: String },
}

/// Validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Malformed request body: {reason}")]
    MalformedBody { reason: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Secret not configured: {name}")]
    SecretMissing { name: String },

    #[error("Provider not supported: {provider}")]
    ProviderNotSupported { provider: String },
}

/// Master error type for all dealflow errors.
#[derive(Debug, Clone, Error)]
pub enum DealflowError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for dealflow operations.
pub type DealflowResult<T> = Result<T, DealflowError>;

// =============================================================================
// TESTS
// =============================================================================
