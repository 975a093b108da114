//! Shared application state: the wired services handed to the routers.

use std::sync::Arc;

use dealflow_core::Notifier;
use dealflow_llm::{CompletionProvider, OpenAIClient, OpenAICompletionProvider};
use dealflow_storage::{HttpRecordStore, HttpStoreConfig, InMemoryRecordStore, RecordStore};

use crate::config::{EmailConfig, StoreBackend};
use crate::email::{EmailDraftClient, EmailGenerator, HttpEmailDraftClient, LocalEmailDraftClient};
use crate::error::{ApiError, ApiResult};
use crate::secrets::SecretStore;
use crate::services::Services;

/// Application-wide state shared across all routers.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    pub generator: EmailGenerator,
    pub store: Arc<dyn RecordStore>,
    pub secrets: Arc<dyn SecretStore>,
}

impl AppState {
    /// Wire services over an existing store and provider.
    ///
    /// Deal updates draft through the deployed generator function when
    /// `email.function_url` is set and in-process otherwise.
    pub fn new(
        store: Arc<dyn RecordStore>,
        secrets: Arc<dyn SecretStore>,
        provider: Arc<dyn CompletionProvider>,
        notifier: Arc<dyn Notifier>,
        email: &EmailConfig,
    ) -> ApiResult<Self> {
        let generator = EmailGenerator::new(provider, secrets.clone());
        let drafts: Arc<dyn EmailDraftClient> = match &email.function_url {
            Some(url) => {
                tracing::info!(%url, "Drafting deal emails through remote function");
                Arc::new(
                    HttpEmailDraftClient::new(url.clone(), email.draft_timeout).map_err(|e| {
                        ApiError::configuration_error(format!(
                            "Failed to initialize email draft client: {}",
                            e
                        ))
                    })?,
                )
            }
            None => Arc::new(LocalEmailDraftClient::new(generator.clone())),
        };
        let services = Services::new(store.clone(), notifier, drafts, email.draft_timeout);

        Ok(Self {
            services,
            generator,
            store,
            secrets,
        })
    }
}

/// Open the record store selected by configuration.
pub fn build_store(backend: &StoreBackend) -> ApiResult<Arc<dyn RecordStore>> {
    match backend {
        StoreBackend::Memory { seed_path: None } => {
            tracing::info!("Using empty in-memory record store");
            Ok(Arc::new(InMemoryRecordStore::new()))
        }
        StoreBackend::Memory {
            seed_path: Some(path),
        } => {
            tracing::info!(path = %path.display(), "Seeding in-memory record store");
            Ok(Arc::new(InMemoryRecordStore::from_seed_file(path)?))
        }
        StoreBackend::Http {
            base_url,
            api_key,
            timeout,
        } => {
            tracing::info!(%base_url, "Using hosted record store");
            let store = HttpRecordStore::new(HttpStoreConfig {
                base_url: base_url.clone(),
                api_key: api_key.clone(),
                timeout: *timeout,
            })?;
            Ok(Arc::new(store))
        }
    }
}

/// OpenAI-backed completion provider.
pub fn build_provider(email: &EmailConfig) -> ApiResult<Arc<dyn CompletionProvider>> {
    let client = OpenAIClient::new(email.openai_base_url.clone(), email.openai_timeout)?;
    Ok(Arc::new(OpenAICompletionProvider::new(
        client,
        email.openai_model.clone(),
    )))
}
