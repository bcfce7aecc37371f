use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};

use kpidash_core::{Principal, ServiceError};

use crate::api::AppState;
use crate::model::DepartmentInput;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/departments", get(list_departments))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/api/departments", post(create_department))
        .route("/api/departments/{id}", put(update_department).delete(delete_department))
}

async fn list_departments(
    State(svc): State<AppState>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let items = svc.list_departments()?;
    Ok(Json(serde_json::json!({
        "total": items.len(),
        "items": items,
    })))
}

async fn create_department(
    State(svc): State<AppState>,
    Extension(actor): Extension<Principal>,
    Json(input): Json<DepartmentInput>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServiceError> {
    let dept = svc.create_department(&actor, input)?;
    Ok((StatusCode::CREATED, Json(serde_json::to_value(dept)?)))
}

async fn update_department(
    State(svc): State<AppState>,
    Extension(actor): Extension<Principal>,
    Path(id): Path<String>,
    Json(input): Json<DepartmentInput>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let dept = svc.update_department(&actor, &id, input)?;
    Ok(Json(serde_json::to_value(dept)?))
}

async fn delete_department(
    State(svc): State<AppState>,
    Extension(actor): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServiceError> {
    svc.delete_department(&actor, &id)?;
    Ok(StatusCode::NO_CONTENT)
}
