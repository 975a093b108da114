//! Generic CRUD handlers shared by the entity routers.
//!
//! Bodies are taken as raw bytes and decoded here so that malformed JSON
//! yields the same error envelope as every other failure.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use dealflow_core::{Record, RecordId, RecordSchema};
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::services::{DeleteOutcome, RecordService};

/// Parse an `:id` path segment.
pub fn parse_id(raw: &str) -> ApiResult<RecordId> {
    raw.trim()
        .parse::<RecordId>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::invalid_format("id", "a positive integer"))
}

/// Decode a JSON object body into a loose record.
pub fn parse_record(body: &[u8]) -> ApiResult<Record> {
    match serde_json::from_slice::<Value>(body)? {
        Value::Object(map) => Ok(map),
        _ => Err(ApiError::invalid_input("Request body must be a JSON object")),
    }
}

/// GET / - every record
pub async fn list_records<T: RecordSchema>(
    State(service): State<RecordService<T>>,
) -> Json<Vec<T>> {
    Json(service.get_all().await)
}

/// GET /:id
pub async fn get_record<T: RecordSchema>(
    State(service): State<RecordService<T>>,
    Path(id): Path<String>,
) -> ApiResult<Json<T>> {
    let id = parse_id(&id)?;
    service
        .get_by_id(id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::entity_not_found(service.entity().label(), id))
}

/// POST / - 201 with the created record
pub async fn create_record<T: RecordSchema>(
    State(service): State<RecordService<T>>,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    let input = parse_record(&body)?;
    let created = service
        .create(&input)
        .await
        .ok_or_else(|| ApiError::operation_failed("create", service.entity().label()))?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PATCH /:id - sparse update
pub async fn update_record<T: RecordSchema>(
    State(service): State<RecordService<T>>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<T>> {
    let id = parse_id(&id)?;
    let input = parse_record(&body)?;
    service
        .update(id, &input)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::operation_failed("update", service.entity().label()))
}

/// DELETE /:id - always 200, success flag in the body
pub async fn delete_record<T: RecordSchema>(
    State(service): State<RecordService<T>>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteOutcome>> {
    let id = parse_id(&id)?;
    Ok(Json(service.delete(id).await))
}

/// The five CRUD routes for one entity.
pub fn crud_router<T: RecordSchema>(service: RecordService<T>) -> Router {
    Router::new()
        .route("/", get(list_records::<T>).post(create_record::<T>))
        .route(
            "/:id",
            get(get_record::<T>)
                .patch(update_record::<T>)
                .delete(delete_record::<T>),
        )
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert_eq!(parse_id("0").unwrap_err().code, ErrorCode::InvalidFormat);
        assert_eq!(parse_id("abc").unwrap_err().code, ErrorCode::InvalidFormat);
    }

    #[test]
    fn test_parse_record_requires_object() {
        assert!(parse_record(br#"{"name": "Acme"}"#).is_ok());
        assert_eq!(
            parse_record(b"[1, 2]").unwrap_err().code,
            ErrorCode::InvalidInput
        );
        assert_eq!(parse_record(b"{").unwrap_err().code, ErrorCode::InvalidInput);
    }
}
