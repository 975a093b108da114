//! HTTP client for the hosted record store.

use crate::query::{FieldRef, FetchParams};
use crate::response::{BatchResponse, FetchResponse, RecordResponse};
use crate::{RecordStore, StorageResult};
use ::async_trait::async_trait;
use dealflow_core::{EntityType, Record, RecordId, StorageError};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;

/// Connection settings for [`HttpRecordStore`].
#[derive(Clone)]
pub struct HttpStoreConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for HttpStoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpStoreConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Record store reached over HTTP.
///
/// Routes: `POST {base}/tables/{table}/records/query`,
/// `POST {base}/tables/{table}/records/{id}/query`, and
/// `POST | PATCH | DELETE {base}/tables/{table}/records`.
#[derive(Clone)]
pub struct HttpRecordStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpRecordStore {
    pub fn new(config: HttpStoreConfig) -> StorageResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StorageError::Transport {
                reason: format!("Failed to build HTTP client: {}", e),
            })?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
        })
    }

    fn table_url(&self, entity: EntityType, suffix: &str) -> String {
        format!("{}/tables/{}/records{}", self.base_url, entity.table_name(), suffix)
    }

    /// Send a JSON body and decode the envelope. Non-2xx responses that still
    /// carry a decodable envelope are returned as-is so callers see the
    /// store's `success: false` and message.
    async fn send<B: Serialize + Sync + ?Sized, R: DeserializeOwned>(
        &self,
        method: Method,
        url: String,
        body: &B,
    ) -> StorageResult<R> {
        let response = self
            .client
            .request(method.clone(), &url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| StorageError::Transport {
                reason: format!("{} {} failed: {}", method, url, e),
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| StorageError::Transport {
            reason: format!("Failed to read response body: {}", e),
        })?;

        match serde_json::from_str::<R>(&text) {
            Ok(envelope) => {
                if !status.is_success() {
                    tracing::warn!(%status, %url, "Record store returned an error status");
                }
                Ok(envelope)
            }
            Err(_) if !status.is_success() => Err(StorageError::Transport {
                reason: format!("Record store returned status {}: {}", status.as_u16(), text),
            }),
            Err(e) => Err(StorageError::MalformedResponse {
                reason: e.to_string(),
            }),
        }
    }
}

impl std::fmt::Debug for HttpRecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRecordStore")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn fetch_records(
        &self,
        entity: EntityType,
        params: &FetchParams,
    ) -> StorageResult<FetchResponse> {
        self.send(Method::POST, self.table_url(entity, "/query"), params)
            .await
    }

    async fn get_record_by_id(
        &self,
        entity: EntityType,
        id: RecordId,
        fields: &[String],
    ) -> StorageResult<RecordResponse> {
        let fields: Vec<FieldRef> = fields.iter().map(FieldRef::new).collect();
        let url = self.table_url(entity, &format!("/{}/query", id));
        self.send(Method::POST, url, &json!({ "fields": fields }))
            .await
    }

    async fn create_records(
        &self,
        entity: EntityType,
        records: Vec<Record>,
    ) -> StorageResult<BatchResponse> {
        self.send(
            Method::POST,
            self.table_url(entity, ""),
            &json!({ "records": records }),
        )
        .await
    }

    async fn update_records(
        &self,
        entity: EntityType,
        records: Vec<Record>,
    ) -> StorageResult<BatchResponse> {
        self.send(
            Method::PATCH,
            self.table_url(entity, ""),
            &json!({ "records": records }),
        )
        .await
    }

    async fn delete_records(
        &self,
        entity: EntityType,
        ids: &[RecordId],
    ) -> StorageResult<BatchResponse> {
        self.send(
            Method::DELETE,
            self.table_url(entity, ""),
            &json!({ "RecordIds": ids }),
        )
        .await
    }
}
