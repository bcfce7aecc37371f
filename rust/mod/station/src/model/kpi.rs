use serde::{Deserialize, Serialize};

/// A target tracked for a single station.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationKpi {
    pub id: String,

    pub station_id: String,

    pub name: String,

    pub value: f64,

    pub target: f64,

    /// `value / target * 100`, zero without a positive target.
    pub percentage: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// `YYYY-MM-DD`.
    pub period: String,

    pub created_at: String,

    pub updated_at: String,
}

/// Body of `POST /api/stations/{id}/kpis`.
#[derive(Debug, Clone, Deserialize)]
pub struct StationKpiInput {
    pub name: String,
    pub value: f64,
    pub target: f64,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub period: Option<String>,
}
