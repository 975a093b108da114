//! Read-only summaries: pipeline board and dashboard.

use axum::{extract::State, routing::get, Json, Router};
use dealflow_core::{DashboardStats, PipelineSummary};

use crate::services::Services;

/// GET /pipeline
pub async fn pipeline(State(services): State<Services>) -> Json<PipelineSummary> {
    Json(services.pipeline().await)
}

/// GET /dashboard
pub async fn dashboard(State(services): State<Services>) -> Json<DashboardStats> {
    Json(services.dashboard().await)
}

pub fn create_router(services: Services) -> Router {
    Router::new()
        .route("/pipeline", get(pipeline))
        .route("/dashboard", get(dashboard))
        .with_state(services)
}
