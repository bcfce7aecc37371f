use kpidash_core::{
    department_or_default, merge_patch, new_id, now_rfc3339, parse_date, ListResult, Principal,
    ServiceError, MAX_LIST_LIMIT,
};
use kpidash_store::{Action, Filter, Query, RecordStoreExt};

use crate::model::{ActionInput, ActionItem, ActionQuery, ActionStatus, KpiData, PriorityCounts};
use crate::service::KpiService;

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl KpiService {
    /// `check_link` is false when an update keeps the stored `kpi_id`.
    fn check_action(&self, item: &ActionItem, check_link: bool) -> Result<(), ServiceError> {
        if item.title.trim().is_empty() {
            return Err(ServiceError::Validation("action title is required".into()));
        }
        if let Some(due) = item.due_date.as_deref() {
            parse_date("due_date", due)?;
        }
        if let Some(kpi_id) = item.kpi_id.as_deref().filter(|_| check_link) {
            if self.store.find::<KpiData>(kpi_id)?.is_none() {
                return Err(ServiceError::Validation(format!("kpi '{}' does not exist", kpi_id)));
            }
        }
        Ok(())
    }

    pub fn list_actions(&self, params: &ActionQuery) -> Result<ListResult<ActionItem>, ServiceError> {
        let query = Query::new()
            .eq_opt("department", params.department.as_deref())
            .eq_opt("status", params.status.map(|s| s.as_str()))
            .eq_opt("assignee", params.assignee.as_deref())
            .page(params.limit.clamp(1, MAX_LIST_LIMIT), params.offset);
        let (items, total) = self.store.query::<ActionItem>(&query)?;
        Ok(ListResult { items, total })
    }

    pub fn get_action(&self, id: &str) -> Result<ActionItem, ServiceError> {
        self.store.fetch::<ActionItem>(id)
    }

    pub fn create_action(&self, actor: &Principal, input: ActionInput) -> Result<ActionItem, ServiceError> {
        let now = now_rfc3339();
        let status = input.status.unwrap_or_default();
        let item = ActionItem {
            id: new_id(),
            title: input.title.trim().to_string(),
            description: blank_to_none(input.description),
            department: department_or_default(input.department.as_deref(), &self.config.default_department),
            assignee: blank_to_none(input.assignee),
            status,
            priority: input.priority.unwrap_or_default(),
            due_date: blank_to_none(input.due_date),
            completed_at: (status == ActionStatus::Completed).then(|| now.clone()),
            kpi_id: blank_to_none(input.kpi_id),
            created_by: actor.username.clone(),
            created_at: now.clone(),
            updated_at: now,
        };
        self.check_action(&item, true)?;

        self.store.create(&item)?;
        self.activity.record(
            actor,
            Action::Create,
            "action",
            &item.id,
            Some(serde_json::json!({ "title": item.title })),
        );
        Ok(item)
    }

    /// Merge-patch an action. `completed_at` follows the status: stamped on
    /// the transition to completed, cleared when it leaves completed.
    pub fn update_action(&self, actor: &Principal, id: &str, patch: serde_json::Value) -> Result<ActionItem, ServiceError> {
        let current = self.store.fetch::<ActionItem>(id)?;

        let mut base = serde_json::to_value(&current)?;
        merge_patch(&mut base, &patch);
        base["id"] = serde_json::json!(current.id);
        base["created_by"] = serde_json::json!(current.created_by);
        base["created_at"] = serde_json::json!(current.created_at);
        if base.get("department").is_none() {
            base["department"] = serde_json::json!("");
        }
        let now = now_rfc3339();
        base["updated_at"] = serde_json::json!(now);

        let mut item: ActionItem = serde_json::from_value(base)
            .map_err(|e| ServiceError::Validation(format!("invalid action: {}", e)))?;
        item.title = item.title.trim().to_string();
        item.department = department_or_default(Some(&item.department), &self.config.default_department);
        item.completed_at = match (current.status, item.status) {
            (ActionStatus::Completed, ActionStatus::Completed) => current.completed_at.clone(),
            (_, ActionStatus::Completed) => Some(now),
            _ => None,
        };
        self.check_action(&item, item.kpi_id != current.kpi_id)?;

        if !self.store.save(&item)? {
            return Err(ServiceError::not_found("action", id));
        }
        let action = if current.status != item.status {
            Action::StatusChange
        } else {
            Action::Update
        };
        self.activity.record(
            actor,
            action,
            "action",
            id,
            Some(serde_json::json!({ "status": item.status })),
        );
        Ok(item)
    }

    pub fn delete_action(&self, actor: &Principal, id: &str) -> Result<(), ServiceError> {
        if !self.store.remove::<ActionItem>(id)? {
            return Err(ServiceError::not_found("action", id));
        }
        self.activity.record(actor, Action::Delete, "action", id, None);
        Ok(())
    }

    /// Drop the link from every action that points at `kpi_id`.
    pub(crate) fn unlink_actions(&self, kpi_id: &str) -> Result<usize, ServiceError> {
        let query = Query::new().filter(Filter::eq("kpi_id", kpi_id));
        let (items, _) = self.store.query::<ActionItem>(&query)?;
        let now = now_rfc3339();
        for mut item in items.iter().cloned() {
            item.kpi_id = None;
            item.updated_at = now.clone();
            self.store.save(&item)?;
        }
        Ok(items.len())
    }

    /// Open and in-progress actions per priority.
    pub fn open_actions_by_priority(&self, department: Option<&str>) -> Result<PriorityCounts, ServiceError> {
        let mut counts = PriorityCounts::default();
        for status in [ActionStatus::Open, ActionStatus::InProgress] {
            let query = Query::new()
                .filter(Filter::eq("status", status.as_str()))
                .eq_opt("department", department);
            let (items, _) = self.store.query::<ActionItem>(&query)?;
            for item in items {
                counts.add(item.priority);
            }
        }
        Ok(counts)
    }
}
