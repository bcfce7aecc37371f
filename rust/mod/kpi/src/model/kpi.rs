use kpidash_core::ServiceError;
use serde::{Deserialize, Serialize};

/// Dashboard area a KPI belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiCategory {
    Safety,
    Quality,
    Production,
    Logistics,
}

impl KpiCategory {
    pub const ALL: [KpiCategory; 4] = [
        KpiCategory::Safety,
        KpiCategory::Quality,
        KpiCategory::Production,
        KpiCategory::Logistics,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            KpiCategory::Safety => "safety",
            KpiCategory::Quality => "quality",
            KpiCategory::Production => "production",
            KpiCategory::Logistics => "logistics",
        }
    }

    /// Parse a path segment. Turkish dashboard labels are accepted too.
    pub fn parse(s: &str) -> Result<Self, ServiceError> {
        match s.trim().to_lowercase().as_str() {
            "safety" | "güvenlik" | "guvenlik" | "isg" => Ok(KpiCategory::Safety),
            "quality" | "kalite" => Ok(KpiCategory::Quality),
            "production" | "üretim" | "uretim" => Ok(KpiCategory::Production),
            "logistics" | "lojistik" => Ok(KpiCategory::Logistics),
            other => Err(ServiceError::Validation(format!("unknown KPI category '{}'", other))),
        }
    }
}

/// One measured value against its target for a department and period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiData {
    pub id: String,

    pub department: String,

    pub category: KpiCategory,

    pub name: String,

    pub value: f64,

    pub target: f64,

    /// `value / target * 100`, zero without a positive target.
    pub percentage: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// `YYYY-MM-DD`.
    pub period: String,

    /// Free-form extras from the entry form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,

    pub created_by: String,

    pub created_at: String,

    pub updated_at: String,
}

/// Body of `POST /api/kpis`.
#[derive(Debug, Clone, Deserialize)]
pub struct KpiInput {
    #[serde(default)]
    pub department: Option<String>,
    pub category: KpiCategory,
    pub name: String,
    pub value: f64,
    pub target: f64,
    #[serde(default)]
    pub unit: Option<String>,
    /// Defaults to today.
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// Query parameters for `GET /api/kpis` and `GET /api/kpis/summary`.
#[derive(Debug, Clone, Deserialize)]
pub struct KpiQuery {
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub category: Option<KpiCategory>,
    /// Inclusive lower bound on `period`.
    #[serde(default)]
    pub from: Option<String>,
    /// Inclusive upper bound on `period`.
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

impl Default for KpiQuery {
    fn default() -> Self {
        Self {
            department: None,
            category: None,
            from: None,
            to: None,
            limit: default_limit(),
            offset: 0,
        }
    }
}

/// Aggregate for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: KpiCategory,
    pub count: usize,
    pub average_percentage: f64,
}

fn default_limit() -> usize {
    50
}
