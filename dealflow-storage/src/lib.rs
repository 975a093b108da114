//! Dealflow Storage - Record Store Boundary
//!
//! The hosted backend is an opaque per-table CRUD service. [`RecordStore`]
//! mirrors its five operations; services never see anything else.
//! [`InMemoryRecordStore`] replaces the hosted backend in tests and local
//! runs, [`HttpRecordStore`] talks to it over HTTP.

use ::async_trait::async_trait;
use dealflow_core::{EntityType, Record, RecordId, StorageError};

pub mod http;
pub mod memory;
pub mod query;
pub mod response;

pub use http::{HttpRecordStore, HttpStoreConfig};
pub use memory::InMemoryRecordStore;
pub use query::{FetchParams, GroupOperator, Operator, SortDirection, WhereCondition, WhereGroup};
pub use response::{BatchResponse, FetchResponse, RecordOutcome, RecordResponse};

/// Result type for record store calls.
pub type StorageResult<T> = Result<T, StorageError>;

/// Generic per-table CRUD against the record store.
///
/// `Err` means the request never completed (transport, lock poisoning,
/// malformed payload). A processed-but-rejected request is `Ok` with
/// `success: false`.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch records matching `params`, projected and ordered as requested.
    async fn fetch_records(
        &self,
        entity: EntityType,
        params: &FetchParams,
    ) -> StorageResult<FetchResponse>;

    /// Fetch one record. A missing id yields `data: None`.
    async fn get_record_by_id(
        &self,
        entity: EntityType,
        id: RecordId,
        fields: &[String],
    ) -> StorageResult<RecordResponse>;

    /// Insert records; the store assigns `Id`s.
    async fn create_records(
        &self,
        entity: EntityType,
        records: Vec<Record>,
    ) -> StorageResult<BatchResponse>;

    /// Merge each record (which must carry `Id`) into the stored one.
    async fn update_records(
        &self,
        entity: EntityType,
        records: Vec<Record>,
    ) -> StorageResult<BatchResponse>;

    async fn delete_records(
        &self,
        entity: EntityType,
        ids: &[RecordId],
    ) -> StorageResult<BatchResponse>;
}
