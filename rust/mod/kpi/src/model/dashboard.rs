use serde::{Deserialize, Serialize};

use crate::model::{CategorySummary, PriorityCounts};

/// Numbers behind the dashboard header cards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    pub kpi_count: usize,
    pub categories: Vec<CategorySummary>,
    pub open_actions: PriorityCounts,
    pub open_action_count: usize,
}

/// Query parameters for `GET /api/dashboard/summary`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryQuery {
    #[serde(default)]
    pub department: Option<String>,
}
