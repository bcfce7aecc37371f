//! Route registration: system endpoints plus every module's `/api` routes.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use kpidash_core::Module;

/// Build the complete router. Module routers carry their own state and
/// authentication layers, so they are merged as-is.
pub fn build_router(modules: &[&dyn Module], storage: &'static str) -> Router {
    let mut app = Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
        .with_state(storage);

    for module in modules {
        tracing::info!(module = module.name(), "mounting module routes");
        app = app.merge(module.routes());
    }
    app
}

async fn health(State(storage): State<&'static str>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "storage": storage,
    }))
}

async fn version() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": "kpidashd",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
