use kpidash_import::Series;
use serde::{Deserialize, Serialize};

/// A chart dataset imported from a spreadsheet export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartDataset {
    pub name: String,
    /// Detected source encoding, e.g. `windows-1254`.
    pub encoding: String,
    pub delimiter: String,
    pub labels: Vec<String>,
    pub series: Vec<Series>,
    pub imported_by: String,
    pub imported_at: String,
}

/// List entry for `GET /api/charts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartInfo {
    pub name: String,
    pub labels: usize,
    pub series: Vec<String>,
    pub imported_by: String,
    pub imported_at: String,
}

impl From<&ChartDataset> for ChartInfo {
    fn from(d: &ChartDataset) -> Self {
        Self {
            name: d.name.clone(),
            labels: d.labels.len(),
            series: d.series.iter().map(|s| s.name.clone()).collect(),
            imported_by: d.imported_by.clone(),
            imported_at: d.imported_at.clone(),
        }
    }
}
