use serde::{Deserialize, Serialize};

/// Output of one station for one day or shift.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationDataEntry {
    pub id: String,

    pub station_id: String,

    /// `YYYY-MM-DD`.
    pub date: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift: Option<String>,

    pub produced: u64,

    /// Never more than `produced`.
    pub defects: u64,

    /// Never more than `planned_minutes`.
    pub downtime_minutes: u64,

    pub planned_minutes: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    pub created_by: String,

    pub created_at: String,
}

/// Body of `POST /api/stations/{id}/entries`.
#[derive(Debug, Clone, Deserialize)]
pub struct EntryInput {
    /// Defaults to today.
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub shift: Option<String>,
    pub produced: u64,
    #[serde(default)]
    pub defects: u64,
    #[serde(default)]
    pub downtime_minutes: u64,
    #[serde(default)]
    pub planned_minutes: u64,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Inclusive date range for entry listings and summaries.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DateRange {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
}

/// Totals over a station's entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationSummary {
    pub station_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    pub entries: usize,
    pub produced: u64,
    pub defects: u64,
    pub downtime_minutes: u64,
    pub planned_minutes: u64,
    /// `defects / produced * 100`, zero without production.
    pub defect_rate: f64,
    /// `(planned - downtime) / planned * 100`, zero without planned time.
    pub availability: f64,
}
