//! Health Check Endpoints
//!
//! - /health/ping - Simple liveness check
//! - /health/ready - Record store and secret check
//! - /health/live - Process alive check

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use dealflow_core::EntityType;
use dealflow_storage::{FetchParams, RecordStore};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::secrets::{SecretStore, OPENAI_API_KEY};

// ============================================================================
// TYPES
// ============================================================================

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HealthDetails>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
    Degraded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthDetails {
    pub record_store: ComponentHealth,
    pub email_generator: ComponentHealth,
    pub version: String,
    pub uptime_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ComponentHealth {
    fn healthy(latency_ms: Option<u64>) -> Self {
        Self {
            status: HealthStatus::Healthy,
            latency_ms,
            error: None,
        }
    }

    fn failing(status: HealthStatus, error: impl Into<String>) -> Self {
        Self {
            status,
            latency_ms: None,
            error: Some(error.into()),
        }
    }
}

// ============================================================================
// STATE
// ============================================================================

#[derive(Clone)]
pub struct HealthState {
    pub store: Arc<dyn RecordStore>,
    pub secrets: Arc<dyn SecretStore>,
    pub start_time: std::time::Instant,
}

impl HealthState {
    pub fn new(store: Arc<dyn RecordStore>, secrets: Arc<dyn SecretStore>) -> Self {
        Self {
            store,
            secrets,
            start_time: std::time::Instant::now(),
        }
    }
}

// ============================================================================
// HANDLERS
// ============================================================================

/// GET /health/ping - Simple pong response
pub async fn ping() -> impl IntoResponse {
    (StatusCode::OK, "pong")
}

/// GET /health/live - Process liveness check
pub async fn liveness() -> impl IntoResponse {
    let response = HealthResponse {
        status: HealthStatus::Healthy,
        message: Some("Process is alive".to_string()),
        details: None,
    };
    (StatusCode::OK, Json(response))
}

/// GET /health/ready - Readiness check
///
/// An unreachable record store makes the service unready. A missing provider
/// key only degrades it: CRUD still works, drafting does not.
pub async fn readiness(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    let store_health = match check_store(state.store.as_ref()).await {
        Ok(latency) => ComponentHealth::healthy(Some(latency)),
        Err(e) => ComponentHealth::failing(HealthStatus::Unhealthy, e),
    };
    let generator_health = check_generator(state.secrets.as_ref());

    let overall_status = match (store_health.status, generator_health.status) {
        (HealthStatus::Healthy, HealthStatus::Healthy) => HealthStatus::Healthy,
        (HealthStatus::Healthy, _) => HealthStatus::Degraded,
        _ => HealthStatus::Unhealthy,
    };

    let response = HealthResponse {
        status: overall_status,
        message: None,
        details: Some(HealthDetails {
            record_store: store_health,
            email_generator: generator_health,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: state.start_time.elapsed().as_secs(),
        }),
    };

    let status_code = if overall_status == HealthStatus::Unhealthy {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (status_code, Json(response))
}

async fn check_store(store: &dyn RecordStore) -> Result<u64, String> {
    let start = std::time::Instant::now();
    let params = FetchParams::new().with_fields(["Id"]).paging(1, 0);

    match store.fetch_records(EntityType::Contact, &params).await {
        Ok(response) if response.success => Ok(start.elapsed().as_millis() as u64),
        Ok(response) => Err(format!(
            "Record store rejected probe: {}",
            response.message.unwrap_or_else(|| "unknown error".to_string())
        )),
        Err(e) => Err(format!("Record store check failed: {}", e)),
    }
}

fn check_generator(secrets: &dyn SecretStore) -> ComponentHealth {
    match secrets.get(OPENAI_API_KEY) {
        Some(key) if !key.expose_secret().trim().is_empty() => ComponentHealth::healthy(None),
        _ => ComponentHealth::failing(
            HealthStatus::Degraded,
            format!("{} not configured", OPENAI_API_KEY),
        ),
    }
}

// ============================================================================
// ROUTER
// ============================================================================

/// Create health check router
pub fn create_router(store: Arc<dyn RecordStore>, secrets: Arc<dyn SecretStore>) -> Router {
    let state = Arc::new(HealthState::new(store, secrets));

    Router::new()
        .route("/ping", get(ping))
        .route("/live", get(liveness))
        .route("/ready", get(readiness))
        .with_state(state)
}
