pub mod entry;
pub mod kpi;
pub mod station;

use std::sync::Arc;

use kpidash_core::ServiceError;
use kpidash_store::{ActivityLog, RecordStore, RecordStoreExt};

use crate::model::{ProductionStation, StationDataEntry, StationKpi};

#[derive(Debug, Clone)]
pub struct StationConfig {
    /// Department for stations created without one.
    pub default_department: String,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            default_department: "Genel".to_string(),
        }
    }
}

/// Stations, their production entries and station-level KPIs.
pub struct StationService {
    pub(crate) store: Arc<dyn RecordStore>,
    pub(crate) activity: ActivityLog,
    pub(crate) config: StationConfig,
}

impl StationService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        activity: ActivityLog,
        config: StationConfig,
    ) -> Result<Arc<Self>, ServiceError> {
        store.ensure::<ProductionStation>()?;
        store.ensure::<StationDataEntry>()?;
        store.ensure::<StationKpi>()?;
        Ok(Arc::new(Self {
            store,
            activity,
            config,
        }))
    }
}
