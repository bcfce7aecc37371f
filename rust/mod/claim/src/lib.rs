//! Claim module: customer complaints, their status workflow, comments and
//! file attachments.
//!
//! Claim records live in the record store; attachment bytes live in the blob
//! store under `claims/{claim_id}/{attachment_id}`.

pub mod api;
pub mod model;
pub mod service;
pub mod store_impls;

use std::sync::Arc;

use axum::Router;

use kpidash_blob::BlobStore;
use kpidash_core::{Authenticator, Module, ServiceError};
use kpidash_store::{ActivityLog, RecordStore};

use crate::service::{ClaimConfig, ClaimService};

/// Claim module implementing the Module trait.
pub struct ClaimModule {
    service: Arc<ClaimService>,
    auth: Arc<dyn Authenticator>,
}

impl ClaimModule {
    pub fn new(
        store: Arc<dyn RecordStore>,
        blobs: Arc<dyn BlobStore>,
        activity: ActivityLog,
        config: ClaimConfig,
        auth: Arc<dyn Authenticator>,
    ) -> Result<Self, ServiceError> {
        let service = ClaimService::new(store, blobs, activity, config)?;
        Ok(Self { service, auth })
    }

    pub fn service(&self) -> &Arc<ClaimService> {
        &self.service
    }
}

impl Module for ClaimModule {
    fn name(&self) -> &str {
        "claim"
    }

    fn routes(&self) -> Router {
        api::build_router(self.service.clone(), self.auth.clone())
    }
}
