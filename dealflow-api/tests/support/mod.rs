//! Shared harness for the API integration suites.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use dealflow_api::email::{EmailDraftClient, EmailDraftFailure, EmailDraftRequest};
use dealflow_api::secrets::OPENAI_API_KEY;
use dealflow_api::{create_api_router, ApiConfig, AppState, EmailConfig, StaticSecretStore};
use dealflow_test_utils::{InMemoryRecordStore, MockCompletionProvider, RecordingNotifier};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

pub const TEST_KEY: &str = "sk-test-key";

/// Router plus handles on everything the tests inspect.
pub struct TestApp {
    pub router: Router,
    pub store: InMemoryRecordStore,
    pub provider: MockCompletionProvider,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestApp {
    pub fn new(store: InMemoryRecordStore, provider: MockCompletionProvider) -> Self {
        Self::with_secrets(
            store,
            provider,
            StaticSecretStore::new().with(OPENAI_API_KEY, TEST_KEY),
        )
    }

    pub fn with_secrets(
        store: InMemoryRecordStore,
        provider: MockCompletionProvider,
        secrets: StaticSecretStore,
    ) -> Self {
        let notifier = Arc::new(RecordingNotifier::new());
        let state = AppState::new(
            Arc::new(store.clone()),
            Arc::new(secrets),
            Arc::new(provider.clone()),
            notifier.clone(),
            &EmailConfig::default(),
        )
        .unwrap();
        let router = create_api_router(state, &ApiConfig::default());
        Self {
            router,
            store,
            provider,
            notifier,
        }
    }

    /// Send one request and decode the JSON body (`Null` when empty).
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let (status, bytes) = self.send_raw(method, uri, body.map(|b| b.to_string())).await;
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        body: Option<String>,
    ) -> (StatusCode, Vec<u8>) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.map(Body::from).unwrap_or_else(Body::empty))
            .unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }
}

// ============================================================================
// DRAFT CLIENT STUBS
// ============================================================================

/// Returns a fixed template and remembers every request.
#[derive(Debug, Default)]
pub struct StubEmailDraftClient {
    pub template: String,
    pub requests: Mutex<Vec<EmailDraftRequest>>,
}

impl StubEmailDraftClient {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<EmailDraftRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailDraftClient for StubEmailDraftClient {
    async fn generate_draft(
        &self,
        request: &EmailDraftRequest,
    ) -> Result<String, EmailDraftFailure> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self.template.clone())
    }
}

/// Always fails with the configured failure.
#[derive(Debug)]
pub struct FailingEmailDraftClient(pub EmailDraftFailure);

#[async_trait]
impl EmailDraftClient for FailingEmailDraftClient {
    async fn generate_draft(
        &self,
        _request: &EmailDraftRequest,
    ) -> Result<String, EmailDraftFailure> {
        Err(self.0.clone())
    }
}

/// Answers only after `delay`.
#[derive(Debug)]
pub struct SlowEmailDraftClient {
    pub delay: Duration,
}

#[async_trait]
impl EmailDraftClient for SlowEmailDraftClient {
    async fn generate_draft(
        &self,
        _request: &EmailDraftRequest,
    ) -> Result<String, EmailDraftFailure> {
        tokio::time::sleep(self.delay).await;
        Ok("Too late".to_string())
    }
}
