use kpidash_core::{Principal, ServiceError};
use kpidash_kv::KVStoreExt;
use kpidash_layout::{LayoutEditor, LayoutStorage, SavedLayout};

use crate::model::{DashboardSummary, KpiQuery};
use crate::service::KpiService;

fn preferences_key(owner: &str) -> String {
    format!("preferences/{}", owner)
}

impl KpiService {
    /// Editor over the user's saved layout, or the defaults.
    fn editor_for(&self, owner: &str) -> Result<LayoutEditor, ServiceError> {
        let container = self.config.container;
        let constraints = self.config.constraints;
        Ok(match self.layouts.load(owner)? {
            Some(saved) => LayoutEditor::from_saved(saved, container, constraints),
            None => LayoutEditor::new(container, constraints),
        })
    }

    /// Keep `current` for undo, then persist the editor's layout.
    fn commit_layout(&self, owner: &str, current: &SavedLayout, editor: &LayoutEditor) -> Result<SavedLayout, ServiceError> {
        let next = editor.save();
        self.undo_layouts.save(owner, current)?;
        self.layouts.save(owner, &next)?;
        Ok(next)
    }

    pub fn get_layout(&self, principal: &Principal) -> Result<SavedLayout, ServiceError> {
        Ok(self.editor_for(&principal.user_id)?.save())
    }

    /// Store a layout sent by the client after clamping it to the container.
    pub fn put_layout(&self, principal: &Principal, layout: SavedLayout) -> Result<SavedLayout, ServiceError> {
        layout.check_version()?;
        let owner = &principal.user_id;
        let mut editor = self.editor_for(owner)?;
        let current = editor.save();
        editor.load(layout);
        let saved = self.commit_layout(owner, &current, &editor)?;
        tracing::debug!(user = %principal.username, widgets = saved.widgets.len(), "layout stored");
        Ok(saved)
    }

    pub fn reset_layout(&self, principal: &Principal) -> Result<SavedLayout, ServiceError> {
        let owner = &principal.user_id;
        let mut editor = self.editor_for(owner)?;
        let current = editor.save();
        editor.reset();
        self.commit_layout(owner, &current, &editor)
    }

    /// Go back to the layout before the last save or reset. Only one step is
    /// kept; a second undo is rejected.
    pub fn undo_layout(&self, principal: &Principal) -> Result<SavedLayout, ServiceError> {
        let owner = &principal.user_id;
        let previous = self
            .undo_layouts
            .load(owner)?
            .ok_or_else(|| ServiceError::Validation("nothing to undo".into()))?;
        let restored = LayoutEditor::from_saved(previous, self.config.container, self.config.constraints).save();
        self.layouts.save(owner, &restored)?;
        self.undo_layouts.clear(owner)?;
        Ok(restored)
    }

    /// Chart preferences blob; `{}` until the user saves one.
    pub fn get_preferences(&self, principal: &Principal) -> Result<serde_json::Value, ServiceError> {
        Ok(self
            .kv
            .get_json::<serde_json::Value>(&preferences_key(&principal.user_id))?
            .unwrap_or_else(|| serde_json::json!({})))
    }

    pub fn put_preferences(&self, principal: &Principal, prefs: serde_json::Value) -> Result<serde_json::Value, ServiceError> {
        if !prefs.is_object() {
            return Err(ServiceError::Validation("preferences must be a JSON object".into()));
        }
        self.kv.set_json(&preferences_key(&principal.user_id), &prefs)?;
        Ok(prefs)
    }

    pub fn dashboard_summary(&self, department: Option<&str>) -> Result<DashboardSummary, ServiceError> {
        let params = KpiQuery {
            department: department.map(str::to_string),
            ..KpiQuery::default()
        };
        let categories = self.kpi_summary(&params)?;
        let open_actions = self.open_actions_by_priority(department)?;
        Ok(DashboardSummary {
            department: department.map(str::to_string),
            kpi_count: categories.iter().map(|c| c.count).sum(),
            categories,
            open_action_count: open_actions.total(),
            open_actions,
        })
    }
}
