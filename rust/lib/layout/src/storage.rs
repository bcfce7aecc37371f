use std::sync::Arc;

use kpidash_kv::{KVStore, KVStoreExt};

use crate::error::LayoutError;
use crate::saved::SavedLayout;

/// Where saved layouts live, keyed by an owner such as a user id.
pub trait LayoutStorage: Send + Sync {
    fn load(&self, owner: &str) -> Result<Option<SavedLayout>, LayoutError>;

    fn save(&self, owner: &str, layout: &SavedLayout) -> Result<(), LayoutError>;

    /// Forget the saved layout. Clearing a missing entry is not an error.
    fn clear(&self, owner: &str) -> Result<(), LayoutError>;
}

/// [`LayoutStorage`] over a key-value store at `{namespace}/{owner}`.
#[derive(Clone)]
pub struct KvLayoutStorage {
    kv: Arc<dyn KVStore>,
    namespace: String,
}

impl KvLayoutStorage {
    pub fn new(kv: Arc<dyn KVStore>, namespace: &str) -> Self {
        Self {
            kv,
            namespace: namespace.trim_end_matches('/').to_string(),
        }
    }

    fn key(&self, owner: &str) -> String {
        format!("{}/{}", self.namespace, owner)
    }
}

impl LayoutStorage for KvLayoutStorage {
    fn load(&self, owner: &str) -> Result<Option<SavedLayout>, LayoutError> {
        let layout: Option<SavedLayout> = self.kv.get_json(&self.key(owner))?;
        if let Some(l) = &layout {
            l.check_version()?;
        }
        Ok(layout)
    }

    fn save(&self, owner: &str, layout: &SavedLayout) -> Result<(), LayoutError> {
        self.kv.set_json(&self.key(owner), layout)?;
        tracing::debug!(owner, widgets = layout.widgets.len(), "layout saved");
        Ok(())
    }

    fn clear(&self, owner: &str) -> Result<(), LayoutError> {
        self.kv.delete(&self.key(owner))?;
        Ok(())
    }
}
