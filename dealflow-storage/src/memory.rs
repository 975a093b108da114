//! In-memory record store.
//!
//! Holds one table per entity type behind a lock, assigns sequential ids per
//! table, and honours the same query semantics as the hosted backend.

use crate::query::{project, FetchParams};
use crate::response::{BatchResponse, FetchResponse, RecordOutcome, RecordResponse};
use crate::{RecordStore, StorageResult};
use ::async_trait::async_trait;
use dealflow_core::{
    record_id, ConfigError, EntityType, Record, RecordId, StorageError, ID_FIELD,
};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Arc, RwLock};

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<RecordId, Record>,
    next_id: RecordId,
}

impl Table {
    fn insert(&mut self, mut record: Record) -> Record {
        let id = match record_id(&record) {
            Some(id) if !self.rows.contains_key(&id) && id > 0 => id,
            _ => self.next_id.max(1),
        };
        self.next_id = self.next_id.max(id + 1);
        record.insert(ID_FIELD.to_string(), Value::from(id));
        self.rows.insert(id, record.clone());
        record
    }
}

/// Record store kept in process memory. Cloning shares the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordStore {
    tables: Arc<RwLock<HashMap<EntityType, Table>>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert seed records for one entity. Records keep their `Id` when it is
    /// positive and unused.
    pub fn with_seed(self, entity: EntityType, records: Vec<Record>) -> StorageResult<Self> {
        {
            let mut tables = self.tables.write().map_err(|_| StorageError::LockPoisoned)?;
            let table = tables.entry(entity).or_default();
            for record in records {
                table.insert(record);
            }
        }
        Ok(self)
    }

    /// Load a JSON seed file keyed by table name:
    /// `{"contact_c": [{...}], "deal_c": [{...}]}`. Unknown tables are an error.
    pub fn from_seed_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let invalid = |reason: String| ConfigError::InvalidValue {
            field: "seed_path".to_string(),
            value: path.display().to_string(),
            reason,
        };

        let raw = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
        let seed: HashMap<String, Vec<Record>> =
            serde_json::from_str(&raw).map_err(|e| invalid(e.to_string()))?;

        let mut store = Self::new();
        for (table, records) in seed {
            let entity = EntityType::ALL
                .iter()
                .copied()
                .find(|e| e.table_name() == table)
                .ok_or_else(|| invalid(format!("unknown table {}", table)))?;
            let count = records.len();
            store = store
                .with_seed(entity, records)
                .map_err(|e| invalid(e.to_string()))?;
            tracing::debug!(table = %table, count, "Seeded in-memory table");
        }
        Ok(store)
    }

    /// Drop every record in every table.
    pub fn clear(&self) -> StorageResult<()> {
        self.tables
            .write()
            .map_err(|_| StorageError::LockPoisoned)?
            .clear();
        Ok(())
    }

    pub fn count(&self, entity: EntityType) -> StorageResult<usize> {
        let tables = self.tables.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(tables.get(&entity).map_or(0, |t| t.rows.len()))
    }

    /// Raw stored record, unprojected.
    pub fn snapshot(&self, entity: EntityType, id: RecordId) -> StorageResult<Option<Record>> {
        let tables = self.tables.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(tables.get(&entity).and_then(|t| t.rows.get(&id)).cloned())
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn fetch_records(
        &self,
        entity: EntityType,
        params: &FetchParams,
    ) -> StorageResult<FetchResponse> {
        let tables = self.tables.read().map_err(|_| StorageError::LockPoisoned)?;
        let mut rows: Vec<&Record> = tables
            .get(&entity)
            .map(|t| t.rows.values().filter(|r| params.matches(r)).collect())
            .unwrap_or_default();
        rows.sort_by(|a, b| params.compare(a, b));

        let total = rows.len();
        let (offset, limit) = params
            .paging_info
            .map_or((0, usize::MAX), |p| (p.offset, p.limit));
        let data = rows
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|r| params.project(r))
            .collect();

        Ok(FetchResponse {
            total: Some(total),
            ..FetchResponse::ok(data)
        })
    }

    async fn get_record_by_id(
        &self,
        entity: EntityType,
        id: RecordId,
        fields: &[String],
    ) -> StorageResult<RecordResponse> {
        let tables = self.tables.read().map_err(|_| StorageError::LockPoisoned)?;
        let found = tables
            .get(&entity)
            .and_then(|t| t.rows.get(&id))
            .map(|r| project(r, fields));
        Ok(RecordResponse::ok(found))
    }

    async fn create_records(
        &self,
        entity: EntityType,
        records: Vec<Record>,
    ) -> StorageResult<BatchResponse> {
        let mut tables = self.tables.write().map_err(|_| StorageError::LockPoisoned)?;
        let table = tables.entry(entity).or_default();
        let results = records
            .into_iter()
            .map(|mut record| {
                record.remove(ID_FIELD);
                RecordOutcome::ok(table.insert(record))
            })
            .collect();
        Ok(BatchResponse::ok(results))
    }

    async fn update_records(
        &self,
        entity: EntityType,
        records: Vec<Record>,
    ) -> StorageResult<BatchResponse> {
        let mut tables = self.tables.write().map_err(|_| StorageError::LockPoisoned)?;
        let table = tables.entry(entity).or_default();
        let results = records
            .into_iter()
            .map(|patch| {
                let Some(id) = record_id(&patch) else {
                    return RecordOutcome::failed("Record is missing Id");
                };
                match table.rows.get_mut(&id) {
                    Some(stored) => {
                        for (key, value) in patch {
                            stored.insert(key, value);
                        }
                        RecordOutcome::ok(stored.clone())
                    }
                    None => RecordOutcome::failed(format!("Record with Id {} not found", id)),
                }
            })
            .collect();
        Ok(BatchResponse::ok(results))
    }

    async fn delete_records(
        &self,
        entity: EntityType,
        ids: &[RecordId],
    ) -> StorageResult<BatchResponse> {
        let mut tables = self.tables.write().map_err(|_| StorageError::LockPoisoned)?;
        let table = tables.entry(entity).or_default();
        let results = ids
            .iter()
            .map(|id| match table.rows.remove(id) {
                Some(_) => {
                    let mut data = Record::new();
                    data.insert(ID_FIELD.to_string(), Value::from(*id));
                    RecordOutcome::ok(data)
                }
                None => RecordOutcome::failed(format!("Record with Id {} not found", id)),
            })
            .collect();
        Ok(BatchResponse::ok(results))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SortDirection;
    use serde_json::json;
    use std::io::Write;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => Record::new(),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let store = InMemoryRecordStore::new();
        let batch = store
            .create_records(
                EntityType::Contact,
                vec![
                    record(json!({"first_name_c": "Ada", "Id": 99})),
                    record(json!({"first_name_c": "Grace"})),
                ],
            )
            .await
            .unwrap();
        let ids: Vec<_> = batch.succeeded().filter_map(record_id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(store.count(EntityType::Contact).unwrap(), 2);
    }

    #[tokio::test]
    async fn test_seed_keeps_ids_and_continues_after_max() {
        let store = InMemoryRecordStore::new()
            .with_seed(
                EntityType::Deal,
                vec![record(json!({"Id": 10, "title_c": "Seeded"}))],
            )
            .unwrap();
        let batch = store
            .create_records(EntityType::Deal, vec![record(json!({"title_c": "New"}))])
            .await
            .unwrap();
        assert_eq!(batch.succeeded().next().and_then(record_id), Some(11));
    }

    #[tokio::test]
    async fn test_update_merges_and_reports_missing() {
        let store = InMemoryRecordStore::new()
            .with_seed(
                EntityType::Deal,
                vec![record(json!({"Id": 1, "title_c": "Old", "notes_c": "keep"}))],
            )
            .unwrap();
        let batch = store
            .update_records(
                EntityType::Deal,
                vec![
                    record(json!({"Id": 1, "title_c": "New"})),
                    record(json!({"Id": 2, "title_c": "Ghost"})),
                ],
            )
            .await
            .unwrap();
        assert_eq!(batch.failures(), vec!["Record with Id 2 not found".to_string()]);
        let stored = store.snapshot(EntityType::Deal, 1).unwrap().unwrap();
        assert_eq!(stored["title_c"], json!("New"));
        assert_eq!(stored["notes_c"], json!("keep"));
    }

    #[tokio::test]
    async fn test_delete_missing_id_fails_per_record() {
        let store = InMemoryRecordStore::new();
        let batch = store.delete_records(EntityType::Quote, &[42]).await.unwrap();
        assert!(batch.success);
        assert!(!batch.all_succeeded());
    }

    #[tokio::test]
    async fn test_fetch_filters_orders_and_projects() {
        let store = InMemoryRecordStore::new()
            .with_seed(
                EntityType::Activity,
                vec![
                    record(json!({"Id": 1, "contact_id_c": 7, "timestamp_c": "2024-01-01T00:00:00.000Z", "subject_c": "a"})),
                    record(json!({"Id": 2, "contact_id_c": 8, "timestamp_c": "2024-01-02T00:00:00.000Z", "subject_c": "b"})),
                    record(json!({"Id": 3, "contact_id_c": 7, "timestamp_c": "2024-01-03T00:00:00.000Z", "subject_c": "c"})),
                ],
            )
            .unwrap();
        let params = FetchParams::new()
            .with_fields(["timestamp_c"])
            .where_equal("contact_id_c", json!(7))
            .order_by("timestamp_c", SortDirection::Desc);
        let resp = store.fetch_records(EntityType::Activity, &params).await.unwrap();

        let ids: Vec<_> = resp.data.iter().filter_map(record_id).collect();
        assert_eq!(ids, vec![3, 1]);
        assert!(!resp.data[0].contains_key("subject_c"));
        assert_eq!(resp.total, Some(2));
    }

    #[tokio::test]
    async fn test_fetch_paging() {
        let records = (1..=5).map(|i| record(json!({"Id": i}))).collect();
        let store = InMemoryRecordStore::new()
            .with_seed(EntityType::Company, records)
            .unwrap();
        let resp = store
            .fetch_records(EntityType::Company, &FetchParams::new().paging(2, 3))
            .await
            .unwrap();
        let ids: Vec<_> = resp.data.iter().filter_map(record_id).collect();
        assert_eq!(ids, vec![4, 5]);
        assert_eq!(resp.total, Some(5));
    }

    #[tokio::test]
    async fn test_get_missing_record_is_none() {
        let store = InMemoryRecordStore::new();
        let resp = store
            .get_record_by_id(EntityType::Contact, 1, &[])
            .await
            .unwrap();
        assert!(resp.success);
        assert!(resp.data.is_none());
    }

    #[test]
    fn test_from_seed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"contact_c": [{{"Id": 1, "first_name_c": "Ada"}}], "deal_c": []}}"#
        )
        .unwrap();
        let store = InMemoryRecordStore::from_seed_file(file.path()).unwrap();
        assert_eq!(store.count(EntityType::Contact).unwrap(), 1);
        assert_eq!(store.count(EntityType::Deal).unwrap(), 0);

        store.clear().unwrap();
        assert_eq!(store.count(EntityType::Contact).unwrap(), 0);
    }

    #[test]
    fn test_from_seed_file_rejects_unknown_table() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"widget_c": []}}"#).unwrap();
        let err = InMemoryRecordStore::from_seed_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("unknown table widget_c"));
    }
}
