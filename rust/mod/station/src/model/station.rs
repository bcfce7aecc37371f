use serde::{Deserialize, Serialize};

/// A production line or work center.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionStation {
    pub id: String,

    /// Short unique code printed on the line, e.g. `PRS-01`.
    pub code: String,

    pub name: String,

    pub department: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default = "default_true")]
    pub active: bool,

    pub created_at: String,

    pub updated_at: String,
}

/// Body of `POST /api/stations`.
#[derive(Debug, Clone, Deserialize)]
pub struct StationInput {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StationQuery {
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

impl Default for StationQuery {
    fn default() -> Self {
        Self {
            department: None,
            active: None,
            limit: default_limit(),
            offset: 0,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_limit() -> usize {
    50
}
