use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use kpidash_core::{Principal, ServiceError};

use crate::api::AppState;
use crate::model::{KpiInput, KpiQuery};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/kpis", get(list_kpis).post(create_kpi))
        .route("/api/kpis/summary", get(kpi_summary))
        .route("/api/kpis/{id}", get(get_kpi).put(update_kpi).delete(delete_kpi))
}

async fn list_kpis(
    State(svc): State<AppState>,
    Query(params): Query<KpiQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let result = svc.list_kpis(&params)?;
    Ok(Json(serde_json::json!({
        "items": result.items,
        "total": result.total,
    })))
}

async fn kpi_summary(
    State(svc): State<AppState>,
    Query(params): Query<KpiQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let items = svc.kpi_summary(&params)?;
    Ok(Json(serde_json::json!({ "items": items })))
}

async fn create_kpi(
    State(svc): State<AppState>,
    Extension(actor): Extension<Principal>,
    Json(input): Json<KpiInput>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServiceError> {
    let kpi = svc.create_kpi(&actor, input)?;
    Ok((StatusCode::CREATED, Json(serde_json::to_value(kpi)?)))
}

async fn get_kpi(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let kpi = svc.get_kpi(&id)?;
    Ok(Json(serde_json::to_value(kpi)?))
}

async fn update_kpi(
    State(svc): State<AppState>,
    Extension(actor): Extension<Principal>,
    Path(id): Path<String>,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let kpi = svc.update_kpi(&actor, &id, patch)?;
    Ok(Json(serde_json::to_value(kpi)?))
}

async fn delete_kpi(
    State(svc): State<AppState>,
    Extension(actor): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServiceError> {
    svc.delete_kpi(&actor, &id)?;
    Ok(StatusCode::NO_CONTENT)
}
