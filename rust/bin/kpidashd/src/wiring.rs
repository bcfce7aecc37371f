//! Module construction from the server config.

use std::sync::Arc;

use auth::service::AuthConfig;
use auth::AuthModule;
use claim::service::ClaimConfig;
use claim::ClaimModule;
use kpi::service::KpiConfig;
use kpi::KpiModule;
use kpidash_core::{Authenticator, Module};
use kpidash_layout::{Constraints, Size};
use kpidash_store::ActivityLog;
use station::service::StationConfig;
use station::StationModule;
use tracing::info;

use crate::config::ServerConfig;
use crate::storage::Stores;

pub struct Modules {
    pub auth: AuthModule,
    pub kpi: KpiModule,
    pub station: StationModule,
    pub claim: ClaimModule,
}

impl Modules {
    pub fn all(&self) -> Vec<&dyn Module> {
        vec![&self.auth, &self.kpi, &self.station, &self.claim]
    }
}

/// Build every module over the shared stores. All modules authenticate
/// through the auth module's sessions.
pub fn build_modules(stores: &Stores, config: &ServerConfig) -> anyhow::Result<Modules> {
    let activity = ActivityLog::new(stores.records.clone())
        .map_err(|e| anyhow::anyhow!("failed to open activity log: {}", e))?;
    let department = config.defaults.department.clone();

    let auth_config = AuthConfig {
        jwt_secret: config.auth.jwt_secret.clone(),
        session_ttl_secs: config.auth.session_ttl_secs,
        cookie_name: config.auth.cookie_name.clone(),
        secure_cookie: config.auth.secure_cookie,
        default_department: department.clone(),
        import_password: config.defaults.import_password.clone(),
    };
    let auth = AuthModule::new(stores.records.clone(), activity.clone(), auth_config)?;
    let authenticator: Arc<dyn Authenticator> = auth.authenticator();
    info!("auth module initialized");

    let layout = config.layout;
    let kpi_config = KpiConfig {
        default_department: department.clone(),
        container: Size::new(layout.container_width, layout.container_height),
        constraints: Constraints {
            min_width: layout.min_width,
            min_height: layout.min_height,
        },
    };
    let kpi = KpiModule::new(
        stores.records.clone(),
        stores.kv.clone(),
        activity.clone(),
        kpi_config,
        authenticator.clone(),
    )?;
    info!("kpi module initialized");

    let station = StationModule::new(
        stores.records.clone(),
        activity.clone(),
        StationConfig {
            default_department: department.clone(),
        },
        authenticator.clone(),
    )?;
    info!("station module initialized");

    let claim = ClaimModule::new(
        stores.records.clone(),
        stores.blobs.clone(),
        activity,
        ClaimConfig {
            default_department: department,
        },
        authenticator,
    )?;
    info!("claim module initialized");

    Ok(Modules {
        auth,
        kpi,
        station,
        claim,
    })
}
