use serde::{Deserialize, Serialize};

use crate::model::KpiCategory;

/// Outcome of one calendar day. Days never marked count as `Success`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    #[default]
    Success,
    Failure,
}

impl DayStatus {
    pub fn flipped(self) -> Self {
        match self {
            DayStatus::Success => DayStatus::Failure,
            DayStatus::Failure => DayStatus::Success,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarDay {
    /// `YYYY-MM-DD`.
    pub date: String,
    pub status: DayStatus,
}

/// Every day of one month for a department's category calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarMonth {
    pub department: String,
    pub category: KpiCategory,
    /// `YYYY-MM`.
    pub month: String,
    pub days: Vec<CalendarDay>,
    pub failure_days: usize,
}

/// Body of `PUT /api/calendars/{department}/{category}/{date}`; a null or
/// missing status clears the mark.
#[derive(Debug, Clone, Deserialize)]
pub struct SetDay {
    #[serde(default)]
    pub status: Option<DayStatus>,
}
