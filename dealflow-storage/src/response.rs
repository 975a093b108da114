//! Response envelopes returned by the record store.
//!
//! A transport-level failure is an `Err(StorageError)`. A request the store
//! processed but rejected comes back as `success: false` with a message,
//! and batch mutations report per-record outcomes in `results`.

use dealflow_core::Record;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FetchResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Vec<Record>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
}

impl FetchResponse {
    pub fn ok(data: Vec<Record>) -> Self {
        let total = Some(data.len());
        Self {
            success: true,
            message: None,
            data,
            total,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecordResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// `None` when the id does not exist.
    #[serde(default)]
    pub data: Option<Record>,
}

impl RecordResponse {
    pub fn ok(data: Option<Record>) -> Self {
        Self {
            success: true,
            message: None,
            data,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
        }
    }
}

/// Outcome of one record in a batch mutation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecordOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Record>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RecordOutcome {
    pub fn ok(data: Record) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BatchResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub results: Vec<RecordOutcome>,
}

impl BatchResponse {
    pub fn ok(results: Vec<RecordOutcome>) -> Self {
        Self {
            success: true,
            message: None,
            results,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            results: Vec::new(),
        }
    }

    /// Records the store accepted, in submission order.
    pub fn succeeded(&self) -> impl Iterator<Item = &Record> {
        self.results
            .iter()
            .filter(|r| r.success)
            .filter_map(|r| r.data.as_ref())
    }

    /// Messages of rejected records, in submission order.
    pub fn failures(&self) -> Vec<String> {
        self.results
            .iter()
            .filter(|r| !r.success)
            .map(|r| {
                r.message
                    .clone()
                    .unwrap_or_else(|| "Unknown error".to_string())
            })
            .collect()
    }

    /// True when the request succeeded and every record did too.
    pub fn all_succeeded(&self) -> bool {
        self.success && !self.results.is_empty() && self.results.iter().all(|r| r.success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_batch_response_splits_outcomes() {
        let body = json!({
            "success": true,
            "results": [
                {"success": true, "data": {"Id": 1, "name_c": "Acme"}},
                {"success": false, "message": "name_c is required"},
                {"success": false}
            ]
        });
        let batch: BatchResponse = serde_json::from_value(body).unwrap();
        assert_eq!(batch.succeeded().count(), 1);
        assert_eq!(
            batch.failures(),
            vec!["name_c is required".to_string(), "Unknown error".to_string()]
        );
        assert!(!batch.all_succeeded());
    }

    #[test]
    fn test_empty_batch_is_not_all_succeeded() {
        assert!(!BatchResponse::ok(Vec::new()).all_succeeded());
    }

    #[test]
    fn test_fetch_response_tolerates_missing_data() {
        let resp: FetchResponse =
            serde_json::from_value(json!({"success": false, "message": "Table not found"}))
                .unwrap();
        assert!(!resp.success);
        assert!(resp.data.is_empty());
    }
}
