//! Deal REST endpoints.
//!
//! Updates go through [`DealService::update`], so a PATCH carrying a stage
//! drafts a stage email into the notes before the write.

use axum::{
    body::Bytes,
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use dealflow_core::{Deal, DealStage};
use serde::Deserialize;
use serde_json::json;

use super::records::{
    create_record, delete_record, get_record, list_records, parse_id, parse_record,
};
use crate::error::{ApiError, ApiResult};
use crate::services::DealService;

const DEAL_LABEL: &str = "Deal";

/// Body of POST /deals/:id/move
#[derive(Debug, Deserialize)]
pub struct MoveDealRequest {
    pub stage: String,
}

impl MoveDealRequest {
    fn stage(&self) -> ApiResult<DealStage> {
        self.stage.parse::<DealStage>().map_err(|e| {
            let allowed: Vec<&str> = DealStage::ALL.iter().map(DealStage::as_db_str).collect();
            ApiError::validation_failed(e.to_string())
                .with_details(json!({ "allowedStages": allowed }))
        })
    }
}

/// PATCH /deals/:id
pub async fn update_deal(
    State(deals): State<DealService>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<Deal>> {
    let id = parse_id(&id)?;
    let input = parse_record(&body)?;
    deals
        .update(id, &input)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::operation_failed("update", DEAL_LABEL))
}

/// POST /deals/:id/move - stage-only update from the pipeline board
pub async fn move_deal(
    State(deals): State<DealService>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<Deal>> {
    let id = parse_id(&id)?;
    let request: MoveDealRequest = serde_json::from_slice(&body)?;
    let stage = request.stage()?;
    deals
        .move_deal(id, stage)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::operation_failed("move", DEAL_LABEL))
}

/// Plain CRUD runs on the deal record service; PATCH and move go through
/// the orchestrator.
pub fn create_router(deals: DealService) -> Router {
    Router::new()
        .route("/", get(list_records::<Deal>).post(create_record::<Deal>))
        .route(
            "/:id",
            get(get_record::<Deal>)
                .patch(update_deal)
                .delete(delete_record::<Deal>),
        )
        .route("/:id/move", post(move_deal))
        .with_state(deals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_unknown_move_stage_lists_allowed_stages() {
        let request = MoveDealRequest {
            stage: "Abandoned".to_string(),
        };
        let err = request.stage().unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.message, "Invalid deal stage: Abandoned");
        let details = err.details.unwrap();
        assert_eq!(details["allowedStages"][0], "Lead");
        assert_eq!(details["allowedStages"][5], "Closed Lost");

        let request = MoveDealRequest {
            stage: "closed won".to_string(),
        };
        assert_eq!(request.stage().unwrap(), DealStage::ClosedWon);
    }
}
