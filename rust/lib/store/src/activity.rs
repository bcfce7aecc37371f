use std::sync::Arc;

use kpidash_core::{new_id, now_rfc3339, Principal};
use kpidash_sql::Value;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::query::{Filter, Query};
use crate::record::{Record, RecordStoreExt};
use crate::schema::{ColumnDef, TableDef};
use crate::traits::RecordStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Create,
    Update,
    Delete,
    Login,
    Logout,
    Import,
    StatusChange,
    Toggle,
    Comment,
    Upload,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Login => "login",
            Action::Logout => "logout",
            Action::Import => "import",
            Action::StatusChange => "status_change",
            Action::Toggle => "toggle",
            Action::Comment => "comment",
            Action::Upload => "upload",
        }
    }
}

/// One audit row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: String,
    pub user_id: String,
    pub username: String,
    pub action: Action,
    pub entity_type: String,
    pub entity_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    pub created_at: String,
}

impl Record for ActivityEntry {
    const TABLE: TableDef = TableDef {
        name: "activity_log",
        columns: &[
            ColumnDef::text("user_id").indexed(),
            ColumnDef::text("entity_type").indexed(),
            ColumnDef::text("action"),
            ColumnDef::text("created_at"),
        ],
    };
    const KIND: &'static str = "activity";

    fn id(&self) -> &str {
        &self.id
    }

    fn columns(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("user_id", self.user_id.as_str().into()),
            ("entity_type", self.entity_type.as_str().into()),
            ("action", self.action.as_str().into()),
            ("created_at", self.created_at.as_str().into()),
        ]
    }
}

/// Append-only audit trail shared by every module.
#[derive(Clone)]
pub struct ActivityLog {
    store: Arc<dyn RecordStore>,
}

impl ActivityLog {
    pub fn new(store: Arc<dyn RecordStore>) -> Result<Self, StoreError> {
        store.ensure::<ActivityEntry>()?;
        Ok(Self { store })
    }

    /// Append a row. A failed write is logged and never fails the caller.
    pub fn record(
        &self,
        actor: &Principal,
        action: Action,
        entity_type: &str,
        entity_id: &str,
        details: Option<serde_json::Value>,
    ) {
        let entry = ActivityEntry {
            id: new_id(),
            user_id: actor.user_id.clone(),
            username: actor.username.clone(),
            action,
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
            details,
            created_at: now_rfc3339(),
        };
        if let Err(e) = self.store.create(&entry) {
            tracing::warn!(
                action = action.as_str(),
                entity_type,
                entity_id,
                error = %e,
                "failed to write activity row"
            );
        }
    }

    /// Most recent rows first, optionally for one entity type.
    pub fn list(&self, limit: usize, entity_type: Option<&str>) -> Result<Vec<ActivityEntry>, StoreError> {
        let query = Query::new().eq_opt("entity_type", entity_type).page(limit, 0);
        let (items, _) = self.store.query::<ActivityEntry>(&query)?;
        Ok(items)
    }

    pub fn count_for(&self, entity_type: &str) -> Result<usize, StoreError> {
        self.store
            .count_where::<ActivityEntry>(&[Filter::eq("entity_type", entity_type)])
    }
}
