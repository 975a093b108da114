//! Record services over the record store.
//!
//! [`RecordService`] is the uniform CRUD adapter; the per-entity modules add
//! search, filtering and lookup by contact on top of it, and [`DealService`]
//! wraps deal updates with stage-email drafting.

pub mod activity;
pub mod company;
pub mod contact;
pub mod dashboard;
pub mod deal;
pub mod record;
pub mod sales;

pub use deal::DealService;
pub use record::{DeleteOutcome, RecordService};
pub use sales::{QuoteListing, StatusCount};

use crate::email::EmailDraftClient;
use dealflow_core::{Activity, Company, Contact, Notifier, Quote, SalesOrder};
use dealflow_storage::RecordStore;
use std::sync::Arc;
use std::time::Duration;

/// Every service, sharing one store and one notifier.
#[derive(Clone)]
pub struct Services {
    pub contacts: RecordService<Contact>,
    pub companies: RecordService<Company>,
    pub deals: DealService,
    pub activities: RecordService<Activity>,
    pub quotes: RecordService<Quote>,
    pub sales_orders: RecordService<SalesOrder>,
}

impl Services {
    pub fn new(
        store: Arc<dyn RecordStore>,
        notifier: Arc<dyn Notifier>,
        drafts: Arc<dyn EmailDraftClient>,
        draft_timeout: Duration,
    ) -> Self {
        Self {
            contacts: RecordService::new(store.clone(), notifier.clone()),
            companies: RecordService::new(store.clone(), notifier.clone()),
            deals: DealService::new(
                RecordService::new(store.clone(), notifier.clone()),
                drafts,
                draft_timeout,
            ),
            activities: RecordService::new(store.clone(), notifier.clone()),
            quotes: RecordService::new(store.clone(), notifier.clone()),
            sales_orders: RecordService::new(store, notifier),
        }
    }
}
