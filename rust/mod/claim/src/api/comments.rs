use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::{Json, Router};

use kpidash_core::{Principal, ServiceError};

use crate::api::AppState;
use crate::model::CommentInput;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/claims/{id}/comments", get(list_comments).post(add_comment))
        .route("/api/claim-comments/{id}", delete(delete_comment))
}

async fn list_comments(
    State(svc): State<AppState>,
    Path(claim_id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let items = svc.list_comments(&claim_id)?;
    Ok(Json(serde_json::json!({
        "total": items.len(),
        "items": items,
    })))
}

async fn add_comment(
    State(svc): State<AppState>,
    Extension(actor): Extension<Principal>,
    Path(claim_id): Path<String>,
    Json(input): Json<CommentInput>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServiceError> {
    let comment = svc.add_comment(&actor, &claim_id, input)?;
    Ok((StatusCode::CREATED, Json(serde_json::to_value(comment)?)))
}

async fn delete_comment(
    State(svc): State<AppState>,
    Extension(actor): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServiceError> {
    svc.delete_comment(&actor, &id)?;
    Ok(StatusCode::NO_CONTENT)
}
