//! Company REST endpoints. The list accepts `?search=` over name, industry
//! and website.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use dealflow_core::Company;
use serde::Deserialize;

use super::records::{create_record, delete_record, get_record, update_record};
use crate::services::RecordService;

#[derive(Debug, Default, Deserialize)]
pub struct CompanyListParams {
    #[serde(default)]
    pub search: String,
}

/// GET /companies?search=
pub async fn list_companies(
    State(companies): State<RecordService<Company>>,
    Query(params): Query<CompanyListParams>,
) -> Json<Vec<Company>> {
    Json(companies.search(&params.search).await)
}

pub fn create_router(companies: RecordService<Company>) -> Router {
    Router::new()
        .route(
            "/",
            get(list_companies).post(create_record::<Company>),
        )
        .route(
            "/:id",
            get(get_record::<Company>)
                .patch(update_record::<Company>)
                .delete(delete_record::<Company>),
        )
        .with_state(companies)
}
