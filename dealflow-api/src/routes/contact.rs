//! Contact REST endpoints.
//!
//! - GET/POST /contacts
//! - GET/PATCH/DELETE /contacts/:id
//! - GET /contacts/search?q=
//! - GET /contacts/:id/deals
//! - GET /contacts/:id/activities

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use dealflow_core::{Activity, Contact, Deal};
use serde::Deserialize;

use super::records::{crud_router, parse_id};
use crate::error::ApiResult;
use crate::services::{RecordService, Services};

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

/// GET /contacts/search?q= - blank query lists everything
pub async fn search_contacts(
    State(contacts): State<RecordService<Contact>>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<Contact>> {
    Json(contacts.search(&params.q).await)
}

/// GET /contacts/:id/deals
pub async fn contact_deals(
    State(services): State<Services>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Deal>>> {
    let id = parse_id(&id)?;
    Ok(Json(services.deals.get_by_contact_id(id).await))
}

/// GET /contacts/:id/activities - newest first
pub async fn contact_activities(
    State(services): State<Services>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Activity>>> {
    let id = parse_id(&id)?;
    Ok(Json(services.activities.get_by_contact_id(id).await))
}

pub fn create_router(services: Services) -> Router {
    let search = Router::new()
        .route("/search", get(search_contacts))
        .with_state(services.contacts.clone());
    let related = Router::new()
        .route("/:id/deals", get(contact_deals))
        .route("/:id/activities", get(contact_activities))
        .with_state(services.clone());

    crud_router(services.contacts).merge(search).merge(related)
}
