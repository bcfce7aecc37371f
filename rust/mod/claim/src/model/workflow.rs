use serde::{Deserialize, Serialize};

use super::ClaimStatus;

/// One status transition of a claim. The first row of every claim has no
/// `from_status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimWorkflow {
    pub id: String,
    pub claim_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_status: Option<ClaimStatus>,
    pub to_status: ClaimStatus,
    pub changed_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub created_at: String,
}

/// Body of `POST /api/claims/{id}/status`.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusChange {
    pub status: ClaimStatus,
    #[serde(default)]
    pub note: Option<String>,
}
