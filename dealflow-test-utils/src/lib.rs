//! Dealflow Test Utilities
//!
//! Centralized test infrastructure for the dealflow workspace:
//! - Mock completion provider with scripted replies and call capture
//! - A record store whose every call fails at the transport level
//! - Test fixtures for seeded stores and input payloads
//! - Proptest generators for enums and loose input records

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};

// Re-export core types for convenience
pub use dealflow_core::{
    DealStage, EntityType, LlmError, NotificationLevel, Record, RecordId, RecordingNotifier,
    StorageError,
};
pub use dealflow_llm::{CompletionProvider, GenerationRequest};
pub use dealflow_storage::{InMemoryRecordStore, RecordStore};

use dealflow_storage::{BatchResponse, FetchParams, FetchResponse, RecordResponse};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ============================================================================
// MOCK PROVIDERS
// ============================================================================

/// One captured provider call.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedCall {
    pub api_key: String,
    pub request: GenerationRequest,
}

/// Mock completion provider for testing (async).
///
/// Replies with a fixed text or a fixed error and records every call.
/// Clones share the call log.
#[derive(Debug, Clone)]
pub struct MockCompletionProvider {
    reply: Result<String, LlmError>,
    calls: Arc<Mutex<Vec<CapturedCall>>>,
}

impl MockCompletionProvider {
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            reply: Ok(text.into()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(error: LlmError) -> Self {
        Self {
            reply: Err(error),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Provider answering 401 the way OpenAI does for a bad key.
    pub fn unauthorized() -> Self {
        Self::failing(LlmError::RequestFailed {
            provider: "mock".to_string(),
            status: 401,
            message: "Incorrect API key provided".to_string(),
        })
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    pub fn calls(&self) -> Vec<CapturedCall> {
        lock(&self.calls).clone()
    }

    pub fn last_prompt(&self) -> Option<String> {
        lock(&self.calls).last().map(|c| c.request.prompt.clone())
    }
}

impl Default for MockCompletionProvider {
    fn default() -> Self {
        Self::replying("Subject: Following up\n\nHi there,\n\nThanks for your time.")
    }
}

#[async_trait]
impl CompletionProvider for MockCompletionProvider {
    async fn complete(
        &self,
        api_key: &str,
        request: &GenerationRequest,
    ) -> Result<String, LlmError> {
        lock(&self.calls).push(CapturedCall {
            api_key: api_key.to_string(),
            request: request.clone(),
        });
        self.reply.clone()
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// ============================================================================
// FAILING STORE
// ============================================================================

/// Record store whose every call fails before reaching a backend.
#[derive(Debug, Clone, Default)]
pub struct FailingRecordStore;

impl FailingRecordStore {
    fn unreachable<T>() -> Result<T, StorageError> {
        Err(StorageError::Transport {
            reason: "connection refused".to_string(),
        })
    }
}

#[async_trait]
impl RecordStore for FailingRecordStore {
    async fn fetch_records(
        &self,
        _entity: EntityType,
        _params: &FetchParams,
    ) -> Result<FetchResponse, StorageError> {
        Self::unreachable()
    }

    async fn get_record_by_id(
        &self,
        _entity: EntityType,
        _id: RecordId,
        _fields: &[String],
    ) -> Result<RecordResponse, StorageError> {
        Self::unreachable()
    }

    async fn create_records(
        &self,
        _entity: EntityType,
        _records: Vec<Record>,
    ) -> Result<BatchResponse, StorageError> {
        Self::unreachable()
    }

    async fn update_records(
        &self,
        _entity: EntityType,
        _records: Vec<Record>,
    ) -> Result<BatchResponse, StorageError> {
        Self::unreachable()
    }

    async fn delete_records(
        &self,
        _entity: EntityType,
        _ids: &[RecordId],
    ) -> Result<BatchResponse, StorageError> {
        Self::unreachable()
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    use dealflow_core::{DealStage, QuoteStatus, Record, SalesOrderStatus};
    use proptest::prelude::*;
    use serde_json::Value;

    pub fn arb_deal_stage() -> impl Strategy<Value = DealStage> {
        proptest::sample::select(DealStage::ALL.to_vec())
    }

    pub fn arb_quote_status() -> impl Strategy<Value = QuoteStatus> {
        proptest::sample::select(QuoteStatus::ALL.to_vec())
    }

    pub fn arb_sales_order_status() -> impl Strategy<Value = SalesOrderStatus> {
        proptest::sample::select(SalesOrderStatus::ALL.to_vec())
    }

    /// Stage names as users type them, including unknown ones.
    pub fn arb_stage_name() -> impl Strategy<Value = String> {
        prop_oneof![
            arb_deal_stage().prop_map(|s| s.as_db_str().to_string()),
            arb_deal_stage().prop_map(|s| s.as_db_str().to_uppercase()),
            "[A-Z][a-z]{3,12}",
        ]
    }

    /// Scalar JSON values a form might submit.
    pub fn arb_scalar() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            (-1_000_000i64..1_000_000).prop_map(Value::from),
            "[a-zA-Z0-9 .@-]{0,24}".prop_map(Value::String),
        ]
    }

    /// Loose input records drawn from `keys`.
    pub fn arb_input(keys: &'static [&'static str]) -> impl Strategy<Value = Record> {
        proptest::collection::vec(
            (proptest::sample::select(keys.to_vec()), arb_scalar()),
            0..keys.len().max(1),
        )
        .prop_map(|pairs| {
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect()
        })
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    use super::*;
    use serde_json::{json, Value};

    /// Turn a `json!` object into a record. Non-objects yield an empty record.
    pub fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => Record::new(),
        }
    }

    pub fn contact_input(first: &str, last: &str, email: &str) -> Record {
        record(json!({
            "firstName": first,
            "lastName": last,
            "email": email,
            "company": "Acme Logistics",
            "tags": ["customer"],
        }))
    }

    pub fn deal_input(title: &str, stage: &str, value: f64) -> Record {
        record(json!({
            "title": title,
            "stage": stage,
            "value": value,
            "probability": 40,
            "notes": "Initial notes",
        }))
    }

    /// Store seeded with two contacts, three deals and two activities.
    ///
    /// Contact 1 owns deals 10 and 11; contact 2 owns deal 12.
    pub fn seeded_store() -> InMemoryRecordStore {
        let contacts = vec![
            record(json!({"Id": 1, "first_name_c": "Ada", "last_name_c": "Lovelace",
                "email_c": "ada@example.com", "company_c": "Analytical Engines"})),
            record(json!({"Id": 2, "first_name_c": "Grace", "last_name_c": "Hopper",
                "email_c": "grace@example.com", "company_c": "Compilers Inc"})),
        ];
        let deals = vec![
            record(json!({"Id": 10, "contact_id_c": 1, "title_c": "Engine retrofit",
                "value_c": 40000, "stage_c": "Lead", "notes_c": "Met at expo"})),
            record(json!({"Id": 11, "contact_id_c": 1, "title_c": "Service plan",
                "value_c": 12000, "stage_c": "Proposal", "notes_c": ""})),
            record(json!({"Id": 12, "contact_id_c": 2, "title_c": "Compiler licence",
                "value_c": 8000, "stage_c": "Closed Won", "notes_c": ""})),
        ];
        let activities = vec![
            record(json!({"Id": 100, "contact_id_c": 1, "type_c": "call",
                "subject_c": "Intro call", "timestamp_c": "2024-03-01T10:00:00Z"})),
            record(json!({"Id": 101, "contact_id_c": 1, "type_c": "email",
                "subject_c": "Sent pricing", "timestamp_c": "2024-03-05T09:30:00Z"})),
        ];

        InMemoryRecordStore::new()
            .with_seed(EntityType::Contact, contacts)
            .and_then(|s| s.with_seed(EntityType::Deal, deals))
            .and_then(|s| s.with_seed(EntityType::Activity, activities))
            .expect("seeding an empty in-memory store cannot fail")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dealflow_llm::{email_generation_request, EmailPromptInput};

    #[tokio::test]
    async fn test_mock_provider_records_calls() {
        let provider = MockCompletionProvider::replying("Hello");
        let request = email_generation_request(&EmailPromptInput {
            deal_title: "Fleet renewal".to_string(),
            stage: "Proposal".to_string(),
            deal_value: None,
            contact_name: None,
        });

        let text = provider.complete("sk-test", &request).await.unwrap();
        assert_eq!(text, "Hello");
        assert_eq!(provider.call_count(), 1);
        assert_eq!(provider.calls()[0].api_key, "sk-test");
        assert!(provider.last_prompt().unwrap().contains("Fleet renewal"));
    }

    #[tokio::test]
    async fn test_failing_store_fails_every_call() {
        let store = FailingRecordStore;
        let err = store
            .fetch_records(EntityType::Deal, &FetchParams::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Transport { .. }));
        assert!(store.delete_records(EntityType::Deal, &[1]).await.is_err());
    }

    #[test]
    fn test_seeded_store_counts() {
        let store = fixtures::seeded_store();
        assert_eq!(store.count(EntityType::Contact).unwrap(), 2);
        assert_eq!(store.count(EntityType::Deal).unwrap(), 3);
        assert_eq!(store.count(EntityType::Activity).unwrap(), 2);
    }
}
