//! OpenAI provider implementation
//!
//! Chat completions over the REST API, used for email draft generation.

pub mod client;
pub mod completion;
pub mod types;

pub use client::{OpenAIClient, DEFAULT_OPENAI_BASE_URL};
pub use completion::{OpenAICompletionProvider, DEFAULT_OPENAI_MODEL};
