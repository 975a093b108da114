//! Dealflow API - REST layer and stage email generation
//!
//! This crate exposes the CRM record services over REST (Axum), the deal
//! update orchestrator that drafts a stage email into a deal's notes, and
//! the stateless email generation function backed by a completion provider.

pub mod config;
pub mod email;
pub mod error;
pub mod notifier;
pub mod routes;
pub mod secrets;
pub mod services;
pub mod state;
pub mod telemetry;

// Re-export commonly used types
pub use config::{ApiConfig, EmailConfig, StoreBackend};
pub use email::{
    EmailDraftClient, EmailDraftFailure, EmailDraftRequest, EmailGenerator, GeneratedEmail,
    HttpEmailDraftClient, LocalEmailDraftClient,
};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use notifier::TracingNotifier;
pub use routes::create_api_router;
pub use secrets::{EnvSecretStore, SecretStore, StaticSecretStore};
pub use services::{DealService, DeleteOutcome, RecordService, Services};
pub use state::{build_provider, build_store, AppState};
