//! Generic record-service adapter.
//!
//! Every entity gets the same five operations over the record store. Store
//! failures never escape: they are logged, reported through the
//! [`Notifier`], and turned into an empty list, `None`, or an unsuccessful
//! [`DeleteOutcome`].

use chrono::Utc;
use dealflow_core::{record_id, EntityType, Notifier, Record, RecordId, RecordSchema};
use dealflow_storage::{BatchResponse, FetchParams, RecordStore, StorageResult};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::sync::Arc;

/// Result of a delete call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOutcome {
    pub success: bool,
}

/// CRUD adapter for one entity type.
pub struct RecordService<T> {
    store: Arc<dyn RecordStore>,
    notifier: Arc<dyn Notifier>,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for RecordService<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            notifier: Arc::clone(&self.notifier),
            _entity: PhantomData,
        }
    }
}

impl<T: RecordSchema> RecordService<T> {
    pub fn new(store: Arc<dyn RecordStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            notifier,
            _entity: PhantomData,
        }
    }

    pub fn entity(&self) -> EntityType {
        T::SCHEMA.entity
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    /// Full projection of the entity's fields.
    pub fn all_fields(&self) -> FetchParams {
        FetchParams::new().with_fields(T::SCHEMA.projection())
    }

    /// Every record of this entity.
    pub async fn get_all(&self) -> Vec<T> {
        self.query(self.all_fields()).await
    }

    /// Records matching `params`. Failure yields an empty list.
    pub async fn query(&self, params: FetchParams) -> Vec<T> {
        let entity = self.entity();
        match self.store.fetch_records(entity, &params).await {
            Ok(response) if response.success => decode_all(entity, response.data),
            Ok(response) => {
                let reason = response.message.unwrap_or_else(|| "unknown error".to_string());
                self.report_load_failure(&reason);
                Vec::new()
            }
            Err(e) => {
                self.report_load_failure(&e.to_string());
                Vec::new()
            }
        }
    }

    /// One record, or `None` when it is missing or the store failed.
    pub async fn get_by_id(&self, id: RecordId) -> Option<T> {
        let entity = self.entity();
        match self.find(id).await {
            Ok(Some(found)) => Some(found),
            Ok(None) => {
                self.notifier.error(&format!("{} not found", entity.label()));
                None
            }
            Err(e) => {
                tracing::error!(entity = %entity, id, error = %e, "Failed to fetch record");
                self.notifier
                    .error(&format!("Failed to load {}", entity.label().to_lowercase()));
                None
            }
        }
    }

    /// Look up record `id` without raising notifications.
    ///
    /// A missing, rejected or undecodable record is `Ok(None)`.
    pub async fn find(&self, id: RecordId) -> StorageResult<Option<T>> {
        let entity = self.entity();
        let response = self
            .store
            .get_record_by_id(entity, id, &T::SCHEMA.projection())
            .await?;
        match response.data {
            Some(record) if response.success => Ok(decode(entity, record)),
            _ => {
                tracing::debug!(entity = %entity, id, message = ?response.message, "Record not found");
                Ok(None)
            }
        }
    }

    /// Normalize `input` and submit it as a single new record.
    pub async fn create(&self, input: &Record) -> Option<T> {
        let entity = self.entity();
        let record = T::SCHEMA.normalize(input, Utc::now());
        let result = self.store.create_records(entity, vec![record]).await;
        let created = self.first_success(result, "create")?;
        tracing::debug!(entity = %entity, id = ?record_id(&created), "Record created");
        self.notifier
            .success(&format!("{} created successfully", entity.label()));
        decode(entity, created)
    }

    /// Apply the fields present in `input` to record `id`.
    pub async fn update(&self, id: RecordId, input: &Record) -> Option<T> {
        let patch = T::SCHEMA.sparse_patch(id, input, Utc::now());
        self.persist_patch(patch).await
    }

    /// Submit an already-built sparse patch (which carries `Id`).
    pub async fn persist_patch(&self, patch: Record) -> Option<T> {
        let entity = self.entity();
        let id = record_id(&patch);
        let result = self.store.update_records(entity, vec![patch]).await;
        let updated = self.first_success(result, "update")?;
        tracing::debug!(entity = %entity, id = ?id, "Record updated");
        self.notifier
            .success(&format!("{} updated successfully", entity.label()));
        decode(entity, updated)
    }

    /// Delete record `id`. Never errors.
    pub async fn delete(&self, id: RecordId) -> DeleteOutcome {
        let entity = self.entity();
        let success = match self.store.delete_records(entity, &[id]).await {
            Ok(response) if response.all_succeeded() => true,
            Ok(response) => {
                self.report_batch_failure(&response, "delete");
                false
            }
            Err(e) => {
                tracing::error!(entity = %entity, id, error = %e, "Failed to delete record");
                self.notifier
                    .error(&format!("Failed to delete {}", entity.label().to_lowercase()));
                false
            }
        };
        if success {
            tracing::debug!(entity = %entity, id, "Record deleted");
            self.notifier
                .success(&format!("{} deleted successfully", entity.label()));
        }
        DeleteOutcome { success }
    }

    /// The first successful record of a one-record batch, reporting any
    /// failure.
    fn first_success(&self, result: StorageResult<BatchResponse>, action: &str) -> Option<Record> {
        let entity = self.entity();
        let response = match result {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(entity = %entity, action, error = %e, "Record store call failed");
                self.notifier.error(&format!(
                    "Failed to {} {}",
                    action,
                    entity.label().to_lowercase()
                ));
                return None;
            }
        };

        if !response.all_succeeded() {
            self.report_batch_failure(&response, action);
        }
        let first = response.succeeded().next().cloned();
        first
    }

    /// One notification per failed record; a failed envelope counts once.
    fn report_batch_failure(&self, response: &BatchResponse, action: &str) {
        let entity = self.entity();
        let mut messages = response.failures();
        if messages.is_empty() {
            messages.push(
                response
                    .message
                    .clone()
                    .unwrap_or_else(|| format!("Failed to {} {}", action, entity.label().to_lowercase())),
            );
        }
        tracing::error!(
            entity = %entity,
            action,
            failed = messages.len(),
            total = response.results.len(),
            "Record store rejected records"
        );
        for message in &messages {
            self.notifier.error(message);
        }
    }

    fn report_load_failure(&self, reason: &str) {
        let entity = self.entity();
        tracing::error!(entity = %entity, reason, "Failed to fetch records");
        self.notifier
            .error(&format!("Failed to load {}", entity.plural()));
    }
}

fn decode<T: RecordSchema>(entity: EntityType, record: Record) -> Option<T> {
    match T::from_record(record) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::error!(entity = %entity, error = %e, "Undecodable record");
            None
        }
    }
}

fn decode_all<T: RecordSchema>(entity: EntityType, records: Vec<Record>) -> Vec<T> {
    records
        .into_iter()
        .filter_map(|record| decode(entity, record))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dealflow_core::{Contact, NotificationLevel, RecordingNotifier};
    use dealflow_storage::InMemoryRecordStore;
    use serde_json::json;

    fn input(value: serde_json::Value) -> Record {
        match value {
            serde_json::Value::Object(map) => map,
            _ => Record::new(),
        }
    }

    fn service() -> (RecordService<Contact>, Arc<InMemoryRecordStore>, Arc<RecordingNotifier>) {
        let store = Arc::new(InMemoryRecordStore::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let service = RecordService::new(store.clone(), notifier.clone());
        (service, store, notifier)
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_notifies() {
        let (service, _store, notifier) = service();
        let contact = service
            .create(&input(json!({"firstName": "Ada", "last_name_c": "Lovelace", "tags": ["vip", "eu"]})))
            .await
            .unwrap();

        assert!(contact.id > 0);
        assert_eq!(contact.full_name(), "Ada Lovelace");
        assert_eq!(contact.tags, "vip,eu");
        assert!(contact.created_at.is_some());
        assert_eq!(
            notifier.messages_at(NotificationLevel::Success),
            vec!["Contact created successfully".to_string()]
        );
    }

    #[tokio::test]
    async fn test_update_only_touches_present_fields() {
        let (service, _store, _notifier) = service();
        let created = service
            .create(&input(json!({"firstName": "Ada", "email": "ada@example.com"})))
            .await
            .unwrap();

        let updated = service
            .update(created.id, &input(json!({"phone": "555-0100"})))
            .await
            .unwrap();
        assert_eq!(updated.phone, "555-0100");
        assert_eq!(updated.email, "ada@example.com");
        assert_eq!(updated.first_name, "Ada");
    }

    #[tokio::test]
    async fn test_missing_record_is_none_with_error_notification() {
        let (service, _store, notifier) = service();
        assert!(service.get_by_id(404).await.is_none());
        assert!(service.update(404, &input(json!({"phone": "1"}))).await.is_none());
        assert_eq!(notifier.messages_at(NotificationLevel::Error).len(), 2);
    }

    #[tokio::test]
    async fn test_delete_nonexistent_is_unsuccessful() {
        let (service, _store, notifier) = service();
        assert_eq!(service.delete(99).await, DeleteOutcome { success: false });
        assert_eq!(notifier.messages_at(NotificationLevel::Error).len(), 1);
        assert!(notifier.messages_at(NotificationLevel::Success).is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_record() {
        let (service, store, _notifier) = service();
        let created = service.create(&input(json!({"firstName": "Ada"}))).await.unwrap();
        assert!(service.delete(created.id).await.success);
        assert_eq!(store.count(EntityType::Contact).unwrap(), 0);
        assert!(service.get_all().await.is_empty());
    }
}
