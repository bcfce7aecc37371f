use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::error::ImportError;
use crate::table::Table;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    /// One value per label; None where the cell was not numeric.
    pub values: Vec<Option<f64>>,
}

/// Chart-ready data: the first column holds labels, every other column is a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub series: Vec<Series>,
}

impl ChartData {
    /// Rows with a blank label are skipped.
    pub fn from_table(table: &Table) -> Result<Self, ImportError> {
        if table.headers.len() < 2 {
            return Err(ImportError::NotEnoughColumns {
                needed: 2,
                found: table.headers.len(),
            });
        }

        let mut labels = Vec::new();
        let mut series: Vec<Series> = table.headers[1..]
            .iter()
            .map(|h| Series {
                name: h.clone(),
                values: Vec::new(),
            })
            .collect();

        for row in &table.rows {
            let label = match &row[0] {
                Cell::Empty => continue,
                Cell::Text(s) => s.clone(),
                Cell::Number(n) => n.to_string(),
            };
            labels.push(label);
            for (s, cell) in series.iter_mut().zip(&row[1..]) {
                s.values.push(cell.as_number());
            }
        }

        if labels.is_empty() {
            return Err(ImportError::Empty);
        }
        Ok(Self { labels, series })
    }
}
