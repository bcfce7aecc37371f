use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use kpidash_core::{Principal, ServiceError};

use crate::api::AppState;
use crate::model::{ActionInput, ActionQuery};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/actions", get(list_actions).post(create_action))
        .route("/api/actions/{id}", get(get_action).put(update_action).delete(delete_action))
}

async fn list_actions(
    State(svc): State<AppState>,
    Query(params): Query<ActionQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let result = svc.list_actions(&params)?;
    Ok(Json(serde_json::json!({
        "items": result.items,
        "total": result.total,
    })))
}

async fn create_action(
    State(svc): State<AppState>,
    Extension(actor): Extension<Principal>,
    Json(input): Json<ActionInput>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServiceError> {
    let item = svc.create_action(&actor, input)?;
    Ok((StatusCode::CREATED, Json(serde_json::to_value(item)?)))
}

async fn get_action(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let item = svc.get_action(&id)?;
    Ok(Json(serde_json::to_value(item)?))
}

async fn update_action(
    State(svc): State<AppState>,
    Extension(actor): Extension<Principal>,
    Path(id): Path<String>,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let item = svc.update_action(&actor, &id, patch)?;
    Ok(Json(serde_json::to_value(item)?))
}

async fn delete_action(
    State(svc): State<AppState>,
    Extension(actor): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServiceError> {
    svc.delete_action(&actor, &id)?;
    Ok(StatusCode::NO_CONTENT)
}
