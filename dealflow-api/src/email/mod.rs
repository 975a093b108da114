//! Deal email drafts: the generator endpoint core and the clients the deal
//! orchestrator uses to reach it.

pub mod draft_client;
pub mod generator;
pub mod request;

pub use draft_client::{
    EmailDraftClient, EmailDraftFailure, HttpEmailDraftClient, LocalEmailDraftClient,
};
pub use generator::{EmailGenerator, MISSING_KEY_MESSAGE};
pub use request::{EmailDraftRequest, GenerateEmailRequest, GeneratedEmail, MISSING_FIELDS_MESSAGE};
