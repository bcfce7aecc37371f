use axum::body::Bytes;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};

use kpidash_core::{Principal, ServiceError};

use crate::api::AppState;
use crate::model::{CreateUser, UserQuery};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list_users).post(create_user))
        .route("/api/users/import", post(import_users))
        .route("/api/users/{id}", get(get_user).put(update_user).delete(delete_user))
}

async fn list_users(
    State(svc): State<AppState>,
    Query(params): Query<UserQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let result = svc.list_users(&params)?;
    Ok(Json(serde_json::json!({
        "items": result.items,
        "total": result.total,
    })))
}

async fn create_user(
    State(svc): State<AppState>,
    Extension(actor): Extension<Principal>,
    Json(input): Json<CreateUser>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServiceError> {
    let user = svc.create_user(&actor, input)?;
    Ok((StatusCode::CREATED, Json(serde_json::to_value(user)?)))
}

async fn get_user(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let user = svc.get_user(&id)?;
    Ok(Json(serde_json::to_value(user)?))
}

async fn update_user(
    State(svc): State<AppState>,
    Extension(actor): Extension<Principal>,
    Path(id): Path<String>,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let user = svc.update_user(&actor, &id, patch)?;
    Ok(Json(serde_json::to_value(user)?))
}

async fn delete_user(
    State(svc): State<AppState>,
    Extension(actor): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServiceError> {
    svc.delete_user(&actor, &id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/users/import: raw CSV/TSV body.
async fn import_users(
    State(svc): State<AppState>,
    Extension(actor): Extension<Principal>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let report = svc.import_users(&actor, &body)?;
    Ok(Json(serde_json::to_value(report)?))
}
