//! Auth module: users, departments, sessions and the activity feed.
//!
//! # Resources
//!
//! - **User**: dashboard account with a role and a department
//! - **Department**: named organisational unit
//! - **Session**: revocable JWT issuance record
//!
//! # Usage
//!
//! ```ignore
//! use auth::{AuthModule, service::AuthConfig};
//!
//! let module = AuthModule::new(store, activity, AuthConfig::default())?;
//! let auth = module.authenticator(); // hand to the other modules
//! let router = module.routes();
//! ```

pub mod api;
pub mod authenticator;
pub mod model;
pub mod service;
pub mod store_impls;

use std::sync::Arc;

use axum::Router;

use kpidash_core::{Authenticator, Module, ServiceError};
use kpidash_store::{ActivityLog, RecordStore};

pub use crate::authenticator::SessionAuthenticator;
use crate::service::{AuthConfig, AuthService};

/// Auth module implementing the Module trait.
pub struct AuthModule {
    service: Arc<AuthService>,
    authenticator: Arc<dyn Authenticator>,
}

impl AuthModule {
    pub fn new(
        store: Arc<dyn RecordStore>,
        activity: ActivityLog,
        config: AuthConfig,
    ) -> Result<Self, ServiceError> {
        let service = AuthService::new(store, activity, config)?;
        let authenticator: Arc<dyn Authenticator> = Arc::new(SessionAuthenticator::new(service.clone()));
        Ok(Self {
            service,
            authenticator,
        })
    }

    pub fn service(&self) -> &Arc<AuthService> {
        &self.service
    }

    /// Session-backed authenticator for every module's protected routes.
    pub fn authenticator(&self) -> Arc<dyn Authenticator> {
        self.authenticator.clone()
    }
}

impl Module for AuthModule {
    fn name(&self) -> &str {
        "auth"
    }

    fn routes(&self) -> Router {
        api::build_router(self.service.clone(), self.authenticator.clone())
    }
}
