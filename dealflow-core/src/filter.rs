//! List filters for quotes and sales orders.
//!
//! These run over records already fetched from the store, mirroring the
//! status tabs and search boxes of the list pages.

use crate::{Lookup, Quote, QuoteStatus, SalesOrder, SalesOrderStatus};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn lookup_name(lookup: &Option<Lookup>) -> &str {
    lookup.as_ref().and_then(Lookup::name).unwrap_or("")
}

// ============================================================================
// QUOTES
// ============================================================================

/// Status tab plus free-text search over a quote list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteFilter {
    /// `None` shows every status.
    #[serde(default)]
    pub status: Option<QuoteStatus>,
    #[serde(default)]
    pub search: String,
}

impl QuoteFilter {
    /// Case-insensitive search across company, contact and deal names,
    /// status and delivery method.
    pub fn matches(&self, quote: &Quote) -> bool {
        if self.status.is_some_and(|s| s != quote.status) {
            return false;
        }
        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [
            lookup_name(&quote.company_id),
            lookup_name(&quote.contact_id),
            lookup_name(&quote.deal_id),
            quote.status.as_db_str(),
            quote.delivery_method.as_str(),
        ]
        .iter()
        .any(|field| contains_ci(field, &needle))
    }

    pub fn apply(&self, quotes: &[Quote]) -> Vec<Quote> {
        quotes.iter().filter(|q| self.matches(q)).cloned().collect()
    }
}

/// Count per status, in status order, for the tab badges.
pub fn quote_status_counts(quotes: &[Quote]) -> Vec<(QuoteStatus, usize)> {
    QuoteStatus::ALL
        .iter()
        .map(|status| (*status, quotes.iter().filter(|q| q.status == *status).count()))
        .collect()
}

// ============================================================================
// SALES ORDERS
// ============================================================================

/// Sort order for the sales-order list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SalesOrderSort {
    #[default]
    Newest,
    Oldest,
    /// Highest total first.
    Amount,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesOrderFilter {
    #[serde(default)]
    pub status: Option<SalesOrderStatus>,
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub sort: SalesOrderSort,
}

impl SalesOrderFilter {
    /// Case-insensitive search across order number, customer, status and
    /// notes.
    pub fn matches(&self, order: &SalesOrder) -> bool {
        if self.status.is_some_and(|s| s != order.status) {
            return false;
        }
        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [
            order.order_number.as_str(),
            order.customer_name.as_str(),
            order.status.as_db_str(),
            order.notes.as_str(),
        ]
        .iter()
        .any(|field| contains_ci(field, &needle))
    }

    pub fn apply(&self, orders: &[SalesOrder]) -> Vec<SalesOrder> {
        let mut out: Vec<SalesOrder> = orders.iter().filter(|o| self.matches(o)).cloned().collect();
        match self.sort {
            // ISO dates compare lexically; undated orders go last.
            SalesOrderSort::Newest => out.sort_by(|a, b| by_date(a, b, true)),
            SalesOrderSort::Oldest => out.sort_by(|a, b| by_date(a, b, false)),
            SalesOrderSort::Amount => out.sort_by(|a, b| {
                b.total_amount
                    .partial_cmp(&a.total_amount)
                    .unwrap_or(Ordering::Equal)
            }),
        }
        out
    }
}

fn by_date(a: &SalesOrder, b: &SalesOrder, descending: bool) -> Ordering {
    match (&a.order_date, &b.order_date) {
        (Some(x), Some(y)) if descending => y.cmp(x),
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(id: i64, status: QuoteStatus, company: &str, method: &str) -> Quote {
        Quote {
            id,
            status,
            company_id: Some(Lookup::Reference {
                id: 100 + id,
                name: Some(company.to_string()),
            }),
            delivery_method: method.to_string(),
            ..Default::default()
        }
    }

    fn order(id: i64, date: Option<&str>, amount: f64, customer: &str) -> SalesOrder {
        SalesOrder {
            id,
            order_number: format!("SO-{:04}", id),
            customer_name: customer.to_string(),
            order_date: date.map(str::to_string),
            total_amount: amount,
            ..Default::default()
        }
    }

    #[test]
    fn test_quote_filter_by_status_and_search() {
        let quotes = vec![
            quote(1, QuoteStatus::Draft, "Acme Corp", "Email"),
            quote(2, QuoteStatus::Sent, "Globex", "Courier"),
            quote(3, QuoteStatus::Sent, "Acme Labs", "Email"),
        ];

        let filter = QuoteFilter {
            status: Some(QuoteStatus::Sent),
            search: "acme".to_string(),
        };
        let ids: Vec<i64> = filter.apply(&quotes).iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![3]);

        let by_method = QuoteFilter {
            status: None,
            search: "COURIER".to_string(),
        };
        assert_eq!(by_method.apply(&quotes).len(), 1);

        assert_eq!(QuoteFilter::default().apply(&quotes).len(), 3);
    }

    #[test]
    fn test_quote_status_counts() {
        let quotes = vec![
            quote(1, QuoteStatus::Draft, "A", ""),
            quote(2, QuoteStatus::Sent, "B", ""),
            quote(3, QuoteStatus::Sent, "C", ""),
        ];
        let counts = quote_status_counts(&quotes);
        assert_eq!(counts[0], (QuoteStatus::Draft, 1));
        assert_eq!(counts[1], (QuoteStatus::Sent, 2));
        assert_eq!(counts[3], (QuoteStatus::Rejected, 0));
    }

    #[test]
    fn test_sales_order_sorting() {
        let orders = vec![
            order(1, Some("2024-01-10"), 500.0, "Initech"),
            order(2, None, 9000.0, "Hooli"),
            order(3, Some("2024-03-02"), 1200.0, "Initech"),
        ];

        let newest = SalesOrderFilter::default().apply(&orders);
        assert_eq!(newest.iter().map(|o| o.id).collect::<Vec<_>>(), vec![3, 1, 2]);

        let oldest = SalesOrderFilter {
            sort: SalesOrderSort::Oldest,
            ..Default::default()
        }
        .apply(&orders);
        assert_eq!(oldest.iter().map(|o| o.id).collect::<Vec<_>>(), vec![1, 3, 2]);

        let amount = SalesOrderFilter {
            sort: SalesOrderSort::Amount,
            ..Default::default()
        }
        .apply(&orders);
        assert_eq!(amount.iter().map(|o| o.id).collect::<Vec<_>>(), vec![2, 3, 1]);
    }

    #[test]
    fn test_undated_orders_sort_last_in_both_directions() {
        let orders = vec![
            order(1, None, 1.0, "Hooli"),
            order(2, Some("2023-05-01"), 1.0, "Initech"),
            order(3, None, 1.0, "Hooli"),
            order(4, Some("2024-05-01"), 1.0, "Initech"),
        ];

        let newest = SalesOrderFilter::default().apply(&orders);
        assert_eq!(newest.iter().map(|o| o.id).collect::<Vec<_>>(), vec![4, 2, 1, 3]);

        let oldest = SalesOrderFilter {
            sort: SalesOrderSort::Oldest,
            ..Default::default()
        }
        .apply(&orders);
        assert_eq!(oldest.iter().map(|o| o.id).collect::<Vec<_>>(), vec![2, 4, 1, 3]);
    }

    #[test]
    fn test_sales_order_search_by_number_and_customer() {
        let orders = vec![
            order(1, None, 1.0, "Initech"),
            order(2, None, 1.0, "Hooli"),
        ];
        let filter = SalesOrderFilter {
            search: "so-0002".to_string(),
            ..Default::default()
        };
        assert_eq!(filter.apply(&orders)[0].id, 2);

        let filter = SalesOrderFilter {
            status: Some(SalesOrderStatus::Delivered),
            ..Default::default()
        };
        assert!(filter.apply(&orders).is_empty());
    }
}
