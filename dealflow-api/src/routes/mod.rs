//! REST API Routes Module
//!
//! Includes:
//! - Entity CRUD routes under `/api/v1`
//! - Pipeline and dashboard summaries
//! - The deal email generation function
//! - Health check endpoints (Kubernetes-compatible)
//! - CORS support for browser-based clients

pub mod company;
pub mod contact;
pub mod deal;
pub mod email;
pub mod health;
pub mod pipeline;
pub mod records;
pub mod sales;

use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::state::AppState;

/// Build the CORS layer from configuration.
fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if config.cors_origins.is_empty() {
        tracing::info!("CORS: Development mode - allowing all origins");
        cors.allow_origin(Any).allow_headers(Any)
    } else {
        tracing::info!(
            "CORS: Production mode - allowing origins: {:?}",
            config.cors_origins
        );
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();

        if config.cors_allow_credentials {
            cors.allow_origin(origins).allow_credentials(true)
        } else {
            cors.allow_origin(origins)
        }
    }
}

/// Create the full application router.
pub fn create_api_router(state: AppState, api_config: &ApiConfig) -> Router {
    let services = state.services;

    let api_routes = Router::new()
        .nest("/contacts", contact::create_router(services.clone()))
        .nest("/companies", company::create_router(services.companies.clone()))
        .nest("/deals", deal::create_router(services.deals.clone()))
        .nest(
            "/activities",
            records::crud_router(services.activities.clone()),
        )
        .nest("/quotes", sales::quote_router(services.quotes.clone()))
        .nest(
            "/sales-orders",
            sales::sales_order_router(services.sales_orders.clone()),
        )
        .merge(pipeline::create_router(services));

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/functions", email::create_router(state.generator))
        .nest("/health", health::create_router(state.store, state.secrets))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(api_config))
}
