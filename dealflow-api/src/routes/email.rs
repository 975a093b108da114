//! Deal email generation endpoint.
//!
//! Mounted with `any()` so that non-POST methods reach the generator and
//! get its JSON 405 instead of an empty router response.

use axum::{
    body::Bytes,
    extract::State,
    http::Method,
    routing::any,
    Json, Router,
};

use crate::email::{EmailGenerator, GeneratedEmail};
use crate::error::ApiResult;

/// ANY /functions/generate-deal-email
pub async fn generate_deal_email(
    State(generator): State<EmailGenerator>,
    method: Method,
    body: Bytes,
) -> ApiResult<Json<GeneratedEmail>> {
    generator.handle(&method, &body).await.map(Json)
}

pub fn create_router(generator: EmailGenerator) -> Router {
    Router::new()
        .route("/generate-deal-email", any(generate_deal_email))
        .with_state(generator)
}
