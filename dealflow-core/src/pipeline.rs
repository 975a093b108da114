//! Pipeline and dashboard statistics computed from fetched records.

use crate::{Activity, DealStage, Deal};
use serde::Serialize;

/// Number of activities shown on the dashboard.
pub const RECENT_ACTIVITY_LIMIT: usize = 5;

/// One kanban column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineColumn {
    pub stage: DealStage,
    pub count: usize,
    pub total_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineSummary {
    /// One column per known stage, in stage order.
    pub columns: Vec<PipelineColumn>,
    pub total_deals: usize,
    pub total_value: f64,
    /// Rounded to the nearest whole unit; zero when there are no deals.
    pub average_deal_size: f64,
}

impl PipelineSummary {
    /// Group deals by stage. Deals whose stage is not a known [`DealStage`]
    /// count toward the totals but belong to no column.
    pub fn from_deals(deals: &[Deal]) -> Self {
        let columns = DealStage::ALL
            .iter()
            .map(|stage| {
                let in_stage: Vec<&Deal> = deals
                    .iter()
                    .filter(|d| d.stage_kind() == Some(*stage))
                    .collect();
                PipelineColumn {
                    stage: *stage,
                    count: in_stage.len(),
                    total_value: in_stage.iter().map(|d| d.value).sum(),
                }
            })
            .collect();

        let total_value: f64 = deals.iter().map(|d| d.value).sum();
        Self {
            columns,
            total_deals: deals.len(),
            total_value,
            average_deal_size: average(total_value, deals.len()),
        }
    }

    pub fn column(&self, stage: DealStage) -> Option<&PipelineColumn> {
        self.columns.iter().find(|c| c.stage == stage)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_contacts: usize,
    pub active_deals: usize,
    /// Sum of values of active deals.
    pub pipeline_value: f64,
    pub average_deal_value: f64,
    pub recent_activities: Vec<Activity>,
}

impl DashboardStats {
    pub fn compute(contact_count: usize, deals: &[Deal], activities: &[Activity]) -> Self {
        let active: Vec<&Deal> = deals.iter().filter(|d| d.is_active()).collect();
        let pipeline_value: f64 = active.iter().map(|d| d.value).sum();
        Self {
            total_contacts: contact_count,
            active_deals: active.len(),
            pipeline_value,
            average_deal_value: average(pipeline_value, active.len()),
            recent_activities: recent_activities(activities, RECENT_ACTIVITY_LIMIT),
        }
    }
}

/// Most recent activities first; undated activities sort last.
pub fn recent_activities(activities: &[Activity], limit: usize) -> Vec<Activity> {
    let mut sorted = activities.to_vec();
    sort_newest_first(&mut sorted);
    sorted.truncate(limit);
    sorted
}

pub fn sort_newest_first(activities: &mut [Activity]) {
    activities.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

fn average(total: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        (total / count as f64).round()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn deal(stage: &str, value: f64) -> Deal {
        Deal {
            stage: stage.to_string(),
            value,
            ..Default::default()
        }
    }

    fn activity(id: i64, day: u32) -> Activity {
        Activity {
            id,
            timestamp: Some(Utc.with_ymd_and_hms(2024, 1, day, 9, 0, 0).unwrap()),
            ..Default::default()
        }
    }

    #[test]
    fn test_pipeline_groups_by_stage() {
        let deals = vec![
            deal("Lead", 1000.0),
            deal("Lead", 2000.0),
            deal("Proposal", 5000.0),
            deal("Closed Won", 10000.0),
            deal("Onboarding", 1.0),
        ];
        let summary = PipelineSummary::from_deals(&deals);

        assert_eq!(summary.columns.len(), DealStage::ALL.len());
        let lead = summary.column(DealStage::Lead).unwrap();
        assert_eq!(lead.count, 2);
        assert_eq!(lead.total_value, 3000.0);
        assert_eq!(summary.column(DealStage::Negotiation).unwrap().count, 0);
        assert_eq!(summary.total_deals, 5);
        assert_eq!(summary.total_value, 18001.0);
        assert_eq!(summary.average_deal_size, 3600.0);
    }

    #[test]
    fn test_pipeline_empty_has_zero_average() {
        let summary = PipelineSummary::from_deals(&[]);
        assert_eq!(summary.total_deals, 0);
        assert_eq!(summary.average_deal_size, 0.0);
    }

    #[test]
    fn test_dashboard_excludes_closed_deals() {
        let deals = vec![
            deal("Lead", 1000.0),
            deal("Negotiation", 3000.0),
            deal("Closed Won", 50000.0),
            deal("Closed Lost", 7000.0),
        ];
        let stats = DashboardStats::compute(12, &deals, &[]);
        assert_eq!(stats.total_contacts, 12);
        assert_eq!(stats.active_deals, 2);
        assert_eq!(stats.pipeline_value, 4000.0);
        assert_eq!(stats.average_deal_value, 2000.0);
    }

    #[test]
    fn test_recent_activities_newest_first_and_limited() {
        let activities: Vec<Activity> = (1..=7).map(|d| activity(d as i64, d)).collect();
        let recent = recent_activities(&activities, RECENT_ACTIVITY_LIMIT);
        let ids: Vec<i64> = recent.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![7, 6, 5, 4, 3]);
    }
}
