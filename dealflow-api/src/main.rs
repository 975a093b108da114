//! Dealflow API Server Entry Point
//!
//! Bootstraps configuration, opens the record store, wires the email
//! generator and starts the Axum HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use dealflow_api::telemetry::{init_tracer, TelemetryConfig};
use dealflow_api::{
    build_provider, build_store, create_api_router, ApiConfig, ApiError, ApiResult, AppState,
    EmailConfig, EnvSecretStore, StoreBackend, TracingNotifier,
};

#[tokio::main]
async fn main() -> ApiResult<()> {
    let telemetry_config = TelemetryConfig::default();
    init_tracer(&telemetry_config)?;

    let backend = StoreBackend::from_env()?;
    let store = build_store(&backend)?;

    let email_config = EmailConfig::from_env();
    let provider = build_provider(&email_config)?;

    let state = AppState::new(
        store,
        Arc::new(EnvSecretStore),
        provider,
        Arc::new(TracingNotifier),
        &email_config,
    )?;

    let api_config = ApiConfig::from_env();
    let app: Router = create_api_router(state, &api_config);

    let addr = resolve_bind_addr()?;
    tracing::info!(%addr, "Starting Dealflow API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}

fn resolve_bind_addr() -> ApiResult<SocketAddr> {
    let host = std::env::var("DEALFLOW_API_BIND").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port_str = std::env::var("PORT")
        .ok()
        .or_else(|| std::env::var("DEALFLOW_API_PORT").ok())
        .unwrap_or_else(|| "3000".to_string());
    let port = port_str
        .parse::<u16>()
        .map_err(|_| ApiError::invalid_input(format!("Invalid port value: {}", port_str)))?;

    let addr = format!("{}:{}", host, port);
    addr.parse::<SocketAddr>()
        .map_err(|e| ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e)))
}
