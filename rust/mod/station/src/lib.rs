//! Station module: production stations, their daily output entries and
//! station-level KPIs.

pub mod api;
pub mod model;
pub mod service;
pub mod store_impls;

use std::sync::Arc;

use axum::Router;

use kpidash_core::{Authenticator, Module, ServiceError};
use kpidash_store::{ActivityLog, RecordStore};

use crate::service::{StationConfig, StationService};

/// Station module implementing the Module trait.
pub struct StationModule {
    service: Arc<StationService>,
    auth: Arc<dyn Authenticator>,
}

impl StationModule {
    pub fn new(
        store: Arc<dyn RecordStore>,
        activity: ActivityLog,
        config: StationConfig,
        auth: Arc<dyn Authenticator>,
    ) -> Result<Self, ServiceError> {
        let service = StationService::new(store, activity, config)?;
        Ok(Self { service, auth })
    }

    pub fn service(&self) -> &Arc<StationService> {
        &self.service
    }
}

impl Module for StationModule {
    fn name(&self) -> &str {
        "station"
    }

    fn routes(&self) -> Router {
        api::build_router(self.service.clone(), self.auth.clone())
    }
}
