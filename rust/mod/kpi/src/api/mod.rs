mod actions;
mod calendars;
mod charts;
mod dashboard;
mod kpis;

use std::sync::Arc;

use axum::Router;

use kpidash_core::{protect, Authenticator};

use crate::service::KpiService;

/// Shared application state.
pub type AppState = Arc<KpiService>;

/// Build the KPI router with absolute `/api/...` paths. Every route needs a
/// signed-in user.
pub fn build_router(svc: Arc<KpiService>, auth: Arc<dyn Authenticator>) -> Router {
    let api = Router::new()
        .merge(kpis::routes())
        .merge(actions::routes())
        .merge(calendars::routes())
        .merge(dashboard::routes())
        .merge(charts::routes());

    protect(api, auth).with_state(svc)
}
