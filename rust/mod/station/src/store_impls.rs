//! Record implementations for station models.

use kpidash_store::{ColumnDef, Record, TableDef, Value};

use crate::model::*;

// ── ProductionStation ──

impl Record for ProductionStation {
    const TABLE: TableDef = TableDef {
        name: "stations",
        columns: &[
            ColumnDef::text("code").unique(),
            ColumnDef::text("department").indexed(),
            ColumnDef::integer("active"),
            ColumnDef::text("created_at"),
        ],
    };
    const KIND: &'static str = "station";

    fn id(&self) -> &str {
        &self.id
    }

    fn columns(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("code", self.code.as_str().into()),
            ("department", self.department.as_str().into()),
            ("active", Value::bool(self.active)),
            ("created_at", self.created_at.as_str().into()),
        ]
    }
}

// ── StationDataEntry ──

impl Record for StationDataEntry {
    const TABLE: TableDef = TableDef {
        name: "station_entries",
        columns: &[
            ColumnDef::text("station_id").indexed(),
            ColumnDef::text("date").indexed(),
            ColumnDef::text("created_at"),
        ],
    };
    const KIND: &'static str = "station entry";

    fn id(&self) -> &str {
        &self.id
    }

    fn columns(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("station_id", self.station_id.as_str().into()),
            ("date", self.date.as_str().into()),
            ("created_at", self.created_at.as_str().into()),
        ]
    }
}

// ── StationKpi ──

impl Record for StationKpi {
    const TABLE: TableDef = TableDef {
        name: "station_kpis",
        columns: &[
            ColumnDef::text("station_id").indexed(),
            ColumnDef::text("period"),
            ColumnDef::text("created_at"),
        ],
    };
    const KIND: &'static str = "station kpi";

    fn id(&self) -> &str {
        &self.id
    }

    fn columns(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("station_id", self.station_id.as_str().into()),
            ("period", self.period.as_str().into()),
            ("created_at", self.created_at.as_str().into()),
        ]
    }
}
