//! Quote and sales-order list views.

use super::RecordService;
use dealflow_core::filter::quote_status_counts;
use dealflow_core::{Quote, QuoteFilter, QuoteStatus, SalesOrder, SalesOrderFilter};
use serde::Serialize;

/// Filtered quotes plus per-status counts over the unfiltered list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteListing {
    pub quotes: Vec<Quote>,
    pub total: usize,
    pub status_counts: Vec<StatusCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusCount {
    pub status: QuoteStatus,
    pub count: usize,
}

impl RecordService<Quote> {
    pub async fn list_filtered(&self, filter: &QuoteFilter) -> QuoteListing {
        let all = self.get_all().await;
        let status_counts = quote_status_counts(&all)
            .into_iter()
            .map(|(status, count)| StatusCount { status, count })
            .collect();
        QuoteListing {
            quotes: filter.apply(&all),
            total: all.len(),
            status_counts,
        }
    }
}

impl RecordService<SalesOrder> {
    /// Filtered and sorted sales orders.
    pub async fn list_filtered(&self, filter: &SalesOrderFilter) -> Vec<SalesOrder> {
        filter.apply(&self.get_all().await)
    }
}
