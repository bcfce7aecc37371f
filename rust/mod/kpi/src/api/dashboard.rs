use axum::extract::{Extension, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};

use kpidash_core::{Principal, ServiceError};
use kpidash_layout::SavedLayout;

use crate::api::AppState;
use crate::model::{DashboardSummary, SummaryQuery};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/dashboard/layout", get(get_layout).put(put_layout))
        .route("/api/dashboard/layout/reset", post(reset_layout))
        .route("/api/dashboard/layout/undo", post(undo_layout))
        .route("/api/dashboard/preferences", get(get_preferences).put(put_preferences))
        .route("/api/dashboard/summary", get(summary))
}

async fn get_layout(
    State(svc): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<SavedLayout>, ServiceError> {
    Ok(Json(svc.get_layout(&principal)?))
}

async fn put_layout(
    State(svc): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(layout): Json<SavedLayout>,
) -> Result<Json<SavedLayout>, ServiceError> {
    Ok(Json(svc.put_layout(&principal, layout)?))
}

async fn reset_layout(
    State(svc): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<SavedLayout>, ServiceError> {
    Ok(Json(svc.reset_layout(&principal)?))
}

async fn undo_layout(
    State(svc): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<SavedLayout>, ServiceError> {
    Ok(Json(svc.undo_layout(&principal)?))
}

async fn get_preferences(
    State(svc): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    Ok(Json(svc.get_preferences(&principal)?))
}

async fn put_preferences(
    State(svc): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(prefs): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    Ok(Json(svc.put_preferences(&principal, prefs)?))
}

/// GET /api/dashboard/summary: all departments unless `department=` is given.
async fn summary(
    State(svc): State<AppState>,
    Query(q): Query<SummaryQuery>,
) -> Result<Json<DashboardSummary>, ServiceError> {
    Ok(Json(svc.dashboard_summary(q.department.as_deref())?))
}
