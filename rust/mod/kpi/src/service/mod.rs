pub mod action;
pub mod calendar;
pub mod chart;
pub mod dashboard;
pub mod kpi;

use std::sync::Arc;

use kpidash_core::ServiceError;
use kpidash_kv::KVStore;
use kpidash_layout::{Constraints, KvLayoutStorage, Size};
use kpidash_store::{ActivityLog, RecordStore, RecordStoreExt};

use crate::model::{ActionItem, KpiData};

/// Configuration for the KPI service.
#[derive(Debug, Clone)]
pub struct KpiConfig {
    /// Department for entries created without one.
    pub default_department: String,
    /// Dashboard container the layouts are clamped to.
    pub container: Size,
    pub constraints: Constraints,
}

impl Default for KpiConfig {
    fn default() -> Self {
        Self {
            default_department: "Genel".to_string(),
            container: Size::new(1600.0, 1200.0),
            constraints: Constraints::default(),
        }
    }
}

/// KPIs, actions, calendars and per-user dashboard state.
pub struct KpiService {
    pub(crate) store: Arc<dyn RecordStore>,
    pub(crate) kv: Arc<dyn KVStore>,
    pub(crate) activity: ActivityLog,
    pub(crate) config: KpiConfig,
    pub(crate) layouts: KvLayoutStorage,
    /// Layout before the last change, for one-level undo.
    pub(crate) undo_layouts: KvLayoutStorage,
}

impl KpiService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        kv: Arc<dyn KVStore>,
        activity: ActivityLog,
        config: KpiConfig,
    ) -> Result<Arc<Self>, ServiceError> {
        store.ensure::<KpiData>()?;
        store.ensure::<ActionItem>()?;
        Ok(Arc::new(Self {
            layouts: KvLayoutStorage::new(kv.clone(), "layout"),
            undo_layouts: KvLayoutStorage::new(kv.clone(), "layout-undo"),
            store,
            kv,
            activity,
            config,
        }))
    }

    pub fn config(&self) -> &KpiConfig {
        &self.config
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use kpidash_core::{Principal, Role};
    use kpidash_kv::MemoryKV;
    use kpidash_store::{ActivityLog, MemoryRecords, RecordStore, SqlRecords};

    use super::{KpiConfig, KpiService};

    pub fn memory_service() -> Arc<KpiService> {
        service_over(Arc::new(MemoryRecords::new()))
    }

    pub fn sqlite_service() -> Arc<KpiService> {
        let sql = kpidash_sql::SqliteStore::open_in_memory().unwrap();
        service_over(Arc::new(SqlRecords::new(Arc::new(sql))))
    }

    pub fn service_over(store: Arc<dyn RecordStore>) -> Arc<KpiService> {
        let activity = ActivityLog::new(store.clone()).unwrap();
        KpiService::new(store, Arc::new(MemoryKV::new()), activity, KpiConfig::default()).unwrap()
    }

    pub fn manager() -> Principal {
        Principal {
            user_id: "u-manager".into(),
            username: "ayse".into(),
            role: Role::Manager,
            department: "Kalite".into(),
        }
    }
}
