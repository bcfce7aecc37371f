use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use kpidash_core::{ServiceError, MAX_LIST_LIMIT};

use crate::api::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/activity", get(recent_activity))
}

#[derive(Debug, Deserialize)]
struct ActivityQuery {
    #[serde(default = "default_limit")]
    limit: usize,
    #[serde(default)]
    entity_type: Option<String>,
}

fn default_limit() -> usize {
    20
}

/// GET /api/activity: newest first.
async fn recent_activity(
    State(svc): State<AppState>,
    Query(q): Query<ActivityQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let limit = q.limit.clamp(1, MAX_LIST_LIMIT);
    let items = svc.activity().list(limit, q.entity_type.as_deref())?;
    Ok(Json(serde_json::json!({
        "total": items.len(),
        "items": items,
    })))
}
