//! KPI module: metric entries, corrective actions, department calendars and
//! per-user dashboard state.
//!
//! Entities live in the record store. Calendar marks, saved layouts, chart
//! preferences and imported chart datasets live in the key-value store.

pub mod api;
pub mod model;
pub mod service;
pub mod store_impls;

use std::sync::Arc;

use axum::Router;

use kpidash_core::{Authenticator, Module, ServiceError};
use kpidash_kv::KVStore;
use kpidash_store::{ActivityLog, RecordStore};

use crate::service::{KpiConfig, KpiService};

/// KPI module implementing the Module trait.
pub struct KpiModule {
    service: Arc<KpiService>,
    auth: Arc<dyn Authenticator>,
}

impl KpiModule {
    pub fn new(
        store: Arc<dyn RecordStore>,
        kv: Arc<dyn KVStore>,
        activity: ActivityLog,
        config: KpiConfig,
        auth: Arc<dyn Authenticator>,
    ) -> Result<Self, ServiceError> {
        let service = KpiService::new(store, kv, activity, config)?;
        Ok(Self { service, auth })
    }

    pub fn service(&self) -> &Arc<KpiService> {
        &self.service
    }
}

impl Module for KpiModule {
    fn name(&self) -> &str {
        "kpi"
    }

    fn routes(&self) -> Router {
        api::build_router(self.service.clone(), self.auth.clone())
    }
}
