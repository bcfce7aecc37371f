//! Record implementations for claim models.

use kpidash_store::{ColumnDef, Record, TableDef, Value};

use crate::model::*;

// ── CustomerClaim ──

impl Record for CustomerClaim {
    const TABLE: TableDef = TableDef {
        name: "customer_claims",
        columns: &[
            ColumnDef::text("claim_number").unique(),
            ColumnDef::text("department").indexed(),
            ColumnDef::text("status").indexed(),
            ColumnDef::text("severity"),
            ColumnDef::text("created_at"),
        ],
    };
    const KIND: &'static str = "claim";

    fn id(&self) -> &str {
        &self.id
    }

    fn columns(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("claim_number", self.claim_number.as_str().into()),
            ("department", self.department.as_str().into()),
            ("status", self.status.as_str().into()),
            ("severity", self.severity.as_str().into()),
            ("created_at", self.created_at.as_str().into()),
        ]
    }
}

// ── ClaimWorkflow ──

impl Record for ClaimWorkflow {
    const TABLE: TableDef = TableDef {
        name: "claim_workflow",
        columns: &[
            ColumnDef::text("claim_id").indexed(),
            ColumnDef::text("created_at"),
        ],
    };
    const KIND: &'static str = "claim workflow";

    fn id(&self) -> &str {
        &self.id
    }

    fn columns(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("claim_id", self.claim_id.as_str().into()),
            ("created_at", self.created_at.as_str().into()),
        ]
    }
}

// ── ClaimComment ──

impl Record for ClaimComment {
    const TABLE: TableDef = TableDef {
        name: "claim_comments",
        columns: &[
            ColumnDef::text("claim_id").indexed(),
            ColumnDef::text("created_at"),
        ],
    };
    const KIND: &'static str = "comment";

    fn id(&self) -> &str {
        &self.id
    }

    fn columns(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("claim_id", self.claim_id.as_str().into()),
            ("created_at", self.created_at.as_str().into()),
        ]
    }
}

// ── ClaimAttachment ──

impl Record for ClaimAttachment {
    const TABLE: TableDef = TableDef {
        name: "claim_attachments",
        columns: &[
            ColumnDef::text("claim_id").indexed(),
            ColumnDef::text("created_at"),
        ],
    };
    const KIND: &'static str = "attachment";

    fn id(&self) -> &str {
        &self.id
    }

    fn columns(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("claim_id", self.claim_id.as_str().into()),
            ("created_at", self.created_at.as_str().into()),
        ]
    }
}
