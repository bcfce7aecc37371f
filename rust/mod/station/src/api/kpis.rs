use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};

use kpidash_core::{Principal, ServiceError};

use crate::api::AppState;
use crate::model::StationKpiInput;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/stations/{id}/kpis", get(list_kpis).post(create_kpi))
        .route("/api/station-kpis/{id}", put(update_kpi).delete(delete_kpi))
}

async fn list_kpis(
    State(svc): State<AppState>,
    Path(station_id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let items = svc.list_station_kpis(&station_id)?;
    Ok(Json(serde_json::json!({
        "total": items.len(),
        "items": items,
    })))
}

async fn create_kpi(
    State(svc): State<AppState>,
    Extension(actor): Extension<Principal>,
    Path(station_id): Path<String>,
    Json(input): Json<StationKpiInput>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServiceError> {
    let kpi = svc.create_station_kpi(&actor, &station_id, input)?;
    Ok((StatusCode::CREATED, Json(serde_json::to_value(kpi)?)))
}

async fn update_kpi(
    State(svc): State<AppState>,
    Extension(actor): Extension<Principal>,
    Path(id): Path<String>,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let kpi = svc.update_station_kpi(&actor, &id, patch)?;
    Ok(Json(serde_json::to_value(kpi)?))
}

async fn delete_kpi(
    State(svc): State<AppState>,
    Extension(actor): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServiceError> {
    svc.delete_station_kpi(&actor, &id)?;
    Ok(StatusCode::NO_CONTENT)
}
