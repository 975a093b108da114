//! Pipeline board and dashboard figures.

use super::Services;
use dealflow_core::{DashboardStats, PipelineSummary};

impl Services {
    /// Kanban columns with per-stage counts and totals.
    pub async fn pipeline(&self) -> PipelineSummary {
        PipelineSummary::from_deals(&self.deals.get_all().await)
    }

    /// Headline numbers and the latest activities.
    pub async fn dashboard(&self) -> DashboardStats {
        let (contacts, deals, activities) = tokio::join!(
            self.contacts.get_all(),
            self.deals.get_all(),
            self.activities.get_all()
        );
        DashboardStats::compute(contacts.len(), &deals, &activities)
    }
}
