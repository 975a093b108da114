//! Deal update orchestration.
//!
//! A deal update that carries a stage first tries to draft a stage email and
//! folds the draft into the deal's notes, then persists everything in one
//! write. Drafting is best effort: its failure is reported as a warning and
//! the update is persisted regardless.

use super::record::{DeleteOutcome, RecordService};
use crate::email::{EmailDraftClient, EmailDraftFailure, EmailDraftRequest};
use axum::extract::FromRef;
use chrono::Utc;
use dealflow_core::entities::DEAL_SCHEMA;
use dealflow_core::{Deal, DealStage, Record, RecordId};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

const STAGE_FIELD: &str = "stage_c";
const TITLE_FIELD: &str = "title_c";
const VALUE_FIELD: &str = "value_c";
const NOTES_FIELD: &str = "notes_c";
const CONTACT_NAME_INPUT: &str = "contactName";

pub const GENERATING_MESSAGE: &str = "Generating email template...";
pub const GENERATED_MESSAGE: &str = "Email template generated and added to deal notes";

/// Deal record service plus the stage-email step.
#[derive(Clone)]
pub struct DealService {
    records: RecordService<Deal>,
    drafts: Arc<dyn EmailDraftClient>,
    draft_timeout: Duration,
}

impl DealService {
    pub fn new(
        records: RecordService<Deal>,
        drafts: Arc<dyn EmailDraftClient>,
        draft_timeout: Duration,
    ) -> Self {
        Self {
            records,
            drafts,
            draft_timeout,
        }
    }

    pub fn records(&self) -> &RecordService<Deal> {
        &self.records
    }

    pub async fn get_all(&self) -> Vec<Deal> {
        self.records.get_all().await
    }

    pub async fn get_by_id(&self, id: RecordId) -> Option<Deal> {
        self.records.get_by_id(id).await
    }

    pub async fn get_by_contact_id(&self, contact_id: RecordId) -> Vec<Deal> {
        self.records.get_by_contact_id(contact_id).await
    }

    pub async fn create(&self, input: &Record) -> Option<Deal> {
        self.records.create(input).await
    }

    pub async fn delete(&self, id: RecordId) -> DeleteOutcome {
        self.records.delete(id).await
    }

    /// Apply `input` to deal `id`, drafting a stage email when the input
    /// carries a stage.
    pub async fn update(&self, id: RecordId, input: &Record) -> Option<Deal> {
        let mut patch = DEAL_SCHEMA.sparse_patch(id, input, Utc::now());

        if DEAL_SCHEMA.is_present(STAGE_FIELD, input) {
            let notifier = self.records.notifier();
            notifier.info(GENERATING_MESSAGE);
            match self.draft_email(id, &patch, input).await {
                Ok(template) => {
                    patch.insert(NOTES_FIELD.to_string(), Value::String(template));
                    notifier.success(GENERATED_MESSAGE);
                }
                Err(failure) => {
                    tracing::warn!(deal_id = id, error = %failure, "Email generation failed");
                    notifier.warning(&format!(
                        "Deal updated but email generation failed: {}",
                        failure
                    ));
                }
            }
        }

        self.records.persist_patch(patch).await
    }

    /// Stage-only update, as done by dragging a card between columns.
    pub async fn move_deal(&self, id: RecordId, stage: DealStage) -> Option<Deal> {
        let mut input = Record::new();
        input.insert(
            STAGE_FIELD.to_string(),
            Value::String(stage.as_db_str().to_string()),
        );
        let moved = self.update(id, &input).await;
        let notifier = self.records.notifier();
        match &moved {
            Some(_) => notifier.success(&format!("Deal moved to {}", stage)),
            None => notifier.error("Failed to move deal"),
        }
        moved
    }

    /// Produce the email draft for a pending stage update.
    ///
    /// Values being written in this update win over the deal's stored ones.
    pub async fn draft_email(
        &self,
        id: RecordId,
        patch: &Record,
        input: &Record,
    ) -> Result<String, EmailDraftFailure> {
        let needs_prior = [TITLE_FIELD, STAGE_FIELD, VALUE_FIELD]
            .iter()
            .any(|field| !patch.contains_key(*field));
        let prior = if needs_prior {
            match self.records.find(id).await {
                Ok(found) => found,
                Err(e) => {
                    tracing::warn!(deal_id = id, error = %e, "Could not load prior deal values");
                    None
                }
            }
        } else {
            None
        };

        let request = draft_request(patch, input, prior.as_ref());
        match tokio::time::timeout(self.draft_timeout, self.drafts.generate_draft(&request)).await
        {
            Ok(result) => result,
            Err(_) => Err(EmailDraftFailure::TimedOut {
                timeout_ms: self.draft_timeout.as_millis() as u64,
            }),
        }
    }
}

impl FromRef<DealService> for RecordService<Deal> {
    fn from_ref(deals: &DealService) -> Self {
        deals.records.clone()
    }
}

fn draft_request(patch: &Record, input: &Record, prior: Option<&Deal>) -> EmailDraftRequest {
    let text = |field: &str| patch.get(field).and_then(Value::as_str).map(str::to_string);

    EmailDraftRequest {
        deal_title: text(TITLE_FIELD)
            .or_else(|| prior.map(|d| d.title.clone()))
            .unwrap_or_default(),
        stage: text(STAGE_FIELD)
            .or_else(|| prior.map(|d| d.stage.clone()))
            .unwrap_or_default(),
        deal_value: patch
            .get(VALUE_FIELD)
            .and_then(Value::as_f64)
            .or_else(|| prior.map(|d| d.value)),
        contact_name: input
            .get(CONTACT_NAME_INPUT)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string),
    }
}
