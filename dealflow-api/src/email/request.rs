//! Wire types for the deal email endpoint.

use crate::error::{ApiError, ApiResult, ErrorCode};
use dealflow_core::entities::lenient;
use dealflow_llm::EmailPromptInput;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const MISSING_FIELDS_MESSAGE: &str =
    "Missing required fields: dealTitle and stage are required";

/// Incoming generation request.
///
/// `dealName` and `newStage` are accepted in place of `dealTitle` and
/// `stage`; the canonical name wins when both are given.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateEmailRequest {
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub deal_title: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub deal_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub stage: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub new_stage: Option<String>,
    #[serde(default, deserialize_with = "amount")]
    pub deal_value: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub contact_name: Option<String>,
}

fn amount<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

impl GenerateEmailRequest {
    /// Parse a raw body. Non-JSON and non-object bodies are rejected.
    pub fn from_body(body: &[u8]) -> ApiResult<Self> {
        let value: Value = serde_json::from_slice(body)?;
        if !value.is_object() {
            return Err(ApiError::invalid_input("Request body must be a JSON object"));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Resolve aliases and check the required fields.
    pub fn into_prompt_input(self) -> ApiResult<EmailPromptInput> {
        let title = self.deal_title.or(self.deal_name);
        let stage = self.stage.or(self.new_stage);
        match (title, stage) {
            (Some(deal_title), Some(stage)) => Ok(EmailPromptInput {
                deal_title,
                stage,
                deal_value: self.deal_value,
                contact_name: self.contact_name,
            }),
            _ => Err(ApiError::new(ErrorCode::MissingField, MISSING_FIELDS_MESSAGE)),
        }
    }
}

/// Request sent by the deal orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailDraftRequest {
    pub deal_title: String,
    pub stage: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deal_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
}

impl EmailDraftRequest {
    /// Check the same required fields as the HTTP endpoint.
    pub fn to_prompt_input(&self) -> ApiResult<EmailPromptInput> {
        GenerateEmailRequest {
            deal_title: non_blank(&self.deal_title),
            stage: non_blank(&self.stage),
            deal_value: self.deal_value,
            contact_name: self.contact_name.as_deref().and_then(non_blank),
            ..Default::default()
        }
        .into_prompt_input()
    }
}

fn non_blank(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Successful generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedEmail {
    pub success: bool,
    pub email_template: String,
    pub stage: String,
}
