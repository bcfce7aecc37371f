//! Record implementations for KPI models.

use kpidash_store::{ColumnDef, Record, TableDef, Value};

use crate::model::*;

// ── KpiData ──

impl Record for KpiData {
    const TABLE: TableDef = TableDef {
        name: "kpi_data",
        columns: &[
            ColumnDef::text("department").indexed(),
            ColumnDef::text("category").indexed(),
            ColumnDef::text("period").indexed(),
            ColumnDef::text("created_at"),
        ],
    };
    const KIND: &'static str = "kpi";

    fn id(&self) -> &str {
        &self.id
    }

    fn columns(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("department", self.department.as_str().into()),
            ("category", self.category.as_str().into()),
            ("period", self.period.as_str().into()),
            ("created_at", self.created_at.as_str().into()),
        ]
    }
}

// ── ActionItem ──

impl Record for ActionItem {
    const TABLE: TableDef = TableDef {
        name: "action_items",
        columns: &[
            ColumnDef::text("department").indexed(),
            ColumnDef::text("status").indexed(),
            ColumnDef::text("assignee"),
            ColumnDef::text("kpi_id"),
            ColumnDef::text("created_at"),
        ],
    };
    const KIND: &'static str = "action";

    fn id(&self) -> &str {
        &self.id
    }

    fn columns(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("department", self.department.as_str().into()),
            ("status", self.status.as_str().into()),
            ("assignee", Value::opt_text(self.assignee.as_deref())),
            ("kpi_id", Value::opt_text(self.kpi_id.as_deref())),
            ("created_at", self.created_at.as_str().into()),
        ]
    }
}
