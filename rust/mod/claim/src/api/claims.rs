use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};

use kpidash_core::{Principal, ServiceError};

use crate::api::AppState;
use crate::model::{ClaimInput, ClaimQuery, StatsQuery, StatusChange};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/claims", get(list_claims).post(create_claim))
        .route("/api/claims/stats", get(claim_stats))
        .route("/api/claims/{id}", get(get_claim).put(update_claim))
        .route("/api/claims/{id}/status", post(change_status))
        .route("/api/claims/{id}/workflow", get(claim_workflow))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/api/claims/{id}", delete(delete_claim))
}

async fn list_claims(
    State(svc): State<AppState>,
    Query(params): Query<ClaimQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let result = svc.list_claims(&params)?;
    Ok(Json(serde_json::json!({
        "items": result.items,
        "total": result.total,
    })))
}

async fn create_claim(
    State(svc): State<AppState>,
    Extension(actor): Extension<Principal>,
    Json(input): Json<ClaimInput>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServiceError> {
    let claim = svc.create_claim(&actor, input)?;
    Ok((StatusCode::CREATED, Json(serde_json::to_value(claim)?)))
}

async fn claim_stats(
    State(svc): State<AppState>,
    Query(params): Query<StatsQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let stats = svc.claim_stats(params.department.as_deref())?;
    Ok(Json(serde_json::to_value(stats)?))
}

async fn get_claim(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let claim = svc.get_claim(&id)?;
    Ok(Json(serde_json::to_value(claim)?))
}

async fn update_claim(
    State(svc): State<AppState>,
    Extension(actor): Extension<Principal>,
    Path(id): Path<String>,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let claim = svc.update_claim(&actor, &id, patch)?;
    Ok(Json(serde_json::to_value(claim)?))
}

async fn delete_claim(
    State(svc): State<AppState>,
    Extension(actor): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServiceError> {
    svc.delete_claim(&actor, &id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn change_status(
    State(svc): State<AppState>,
    Extension(actor): Extension<Principal>,
    Path(id): Path<String>,
    Json(change): Json<StatusChange>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let claim = svc.change_status(&actor, &id, change)?;
    Ok(Json(serde_json::to_value(claim)?))
}

async fn claim_workflow(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let items = svc.claim_workflow(&id)?;
    Ok(Json(serde_json::json!({
        "total": items.len(),
        "items": items,
    })))
}
