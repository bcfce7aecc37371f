use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Where a claim is in its handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    #[default]
    Open,
    Investigating,
    ActionTaken,
    Closed,
    Rejected,
}

impl ClaimStatus {
    pub const ALL: [ClaimStatus; 5] = [
        ClaimStatus::Open,
        ClaimStatus::Investigating,
        ClaimStatus::ActionTaken,
        ClaimStatus::Closed,
        ClaimStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Open => "open",
            ClaimStatus::Investigating => "investigating",
            ClaimStatus::ActionTaken => "action_taken",
            ClaimStatus::Closed => "closed",
            ClaimStatus::Rejected => "rejected",
        }
    }

    /// Statuses reachable from this one through the status endpoint.
    pub fn next(&self) -> &'static [ClaimStatus] {
        match self {
            ClaimStatus::Open => &[ClaimStatus::Investigating, ClaimStatus::Rejected],
            ClaimStatus::Investigating => &[ClaimStatus::ActionTaken, ClaimStatus::Rejected],
            ClaimStatus::ActionTaken => &[ClaimStatus::Closed, ClaimStatus::Investigating],
            ClaimStatus::Closed | ClaimStatus::Rejected => &[ClaimStatus::Open],
        }
    }

    pub fn can_move_to(&self, to: ClaimStatus) -> bool {
        self.next().contains(&to)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [Severity::Low, Severity::Medium, Severity::High, Severity::Critical];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

/// A customer complaint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerClaim {
    pub id: String,

    /// `CLM-YYYY-NNNN`, numbered per calendar year.
    pub claim_number: String,

    pub customer: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_code: Option<String>,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub department: String,

    #[serde(default)]
    pub severity: Severity,

    /// Changed only through the status endpoint.
    #[serde(default)]
    pub status: ClaimStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,

    /// `YYYY-MM-DD` the complaint reached us.
    pub received_date: String,

    /// Set while the claim is closed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<String>,

    pub created_by: String,

    pub created_at: String,

    pub updated_at: String,
}

/// Body of `POST /api/claims`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClaimInput {
    pub customer: String,
    pub title: String,
    #[serde(default)]
    pub product_code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub severity: Option<Severity>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    /// Defaults to today.
    #[serde(default)]
    pub received_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClaimQuery {
    #[serde(default)]
    pub status: Option<ClaimStatus>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub severity: Option<Severity>,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

impl Default for ClaimQuery {
    fn default() -> Self {
        Self {
            status: None,
            department: None,
            severity: None,
            limit: default_limit(),
            offset: 0,
        }
    }
}

fn default_limit() -> usize {
    50
}

/// Claim counts per status and per severity. Every key is present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClaimStats {
    pub total: usize,
    pub by_status: BTreeMap<String, usize>,
    pub by_severity: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatsQuery {
    #[serde(default)]
    pub department: Option<String>,
}
