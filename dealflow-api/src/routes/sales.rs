//! Quote and sales-order REST endpoints with their list filters.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use dealflow_core::{
    Quote, QuoteFilter, QuoteStatus, SalesOrder, SalesOrderFilter, SalesOrderSort,
    SalesOrderStatus,
};
use serde::Deserialize;

use super::records::{create_record, delete_record, get_record, update_record};
use crate::error::{ApiError, ApiResult};
use crate::services::{QuoteListing, RecordService};

/// Query string shared by both list pages. `status=all` or an empty status
/// disables the status filter.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
}

impl ListParams {
    fn status_filter(&self) -> Option<&str> {
        self.status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("all"))
    }

    fn search_text(&self) -> String {
        self.search.clone().unwrap_or_default()
    }

    pub fn quote_filter(&self) -> ApiResult<QuoteFilter> {
        let status = self
            .status_filter()
            .map(|s| {
                s.parse::<QuoteStatus>()
                    .map_err(|e| ApiError::invalid_input(e.to_string()))
            })
            .transpose()?;
        Ok(QuoteFilter {
            status,
            search: self.search_text(),
        })
    }

    pub fn sales_order_filter(&self) -> ApiResult<SalesOrderFilter> {
        let status = self
            .status_filter()
            .map(|s| {
                s.parse::<SalesOrderStatus>()
                    .map_err(|e| ApiError::invalid_input(e.to_string()))
            })
            .transpose()?;
        let sort = match self.sort.as_deref().map(str::trim) {
            None | Some("") | Some("newest") => SalesOrderSort::Newest,
            Some("oldest") => SalesOrderSort::Oldest,
            Some("amount") => SalesOrderSort::Amount,
            Some(_) => {
                return Err(ApiError::invalid_format(
                    "sort",
                    "one of newest, oldest, amount",
                ))
            }
        };
        Ok(SalesOrderFilter {
            status,
            search: self.search_text(),
            sort,
        })
    }
}

/// GET /quotes?status=&search=
pub async fn list_quotes(
    State(quotes): State<RecordService<Quote>>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<QuoteListing>> {
    let filter = params.quote_filter()?;
    Ok(Json(quotes.list_filtered(&filter).await))
}

/// GET /sales-orders?status=&search=&sort=
pub async fn list_sales_orders(
    State(orders): State<RecordService<SalesOrder>>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<SalesOrder>>> {
    let filter = params.sales_order_filter()?;
    Ok(Json(orders.list_filtered(&filter).await))
}

pub fn quote_router(quotes: RecordService<Quote>) -> Router {
    Router::new()
        .route("/", get(list_quotes).post(create_record::<Quote>))
        .route(
            "/:id",
            get(get_record::<Quote>)
                .patch(update_record::<Quote>)
                .delete(delete_record::<Quote>),
        )
        .with_state(quotes)
}

pub fn sales_order_router(orders: RecordService<SalesOrder>) -> Router {
    Router::new()
        .route("/", get(list_sales_orders).post(create_record::<SalesOrder>))
        .route(
            "/:id",
            get(get_record::<SalesOrder>)
                .patch(update_record::<SalesOrder>)
                .delete(delete_record::<SalesOrder>),
        )
        .with_state(orders)
}
