use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};

use kpidash_core::{Principal, ServiceError};

use crate::api::AppState;
use crate::model::{DateRange, StationInput, StationQuery};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/stations", get(list_stations))
        .route("/api/stations/{id}", get(get_station))
        .route("/api/stations/{id}/summary", get(station_summary))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/api/stations", post(create_station))
        .route("/api/stations/{id}", put(update_station).delete(delete_station))
}

async fn list_stations(
    State(svc): State<AppState>,
    Query(params): Query<StationQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let result = svc.list_stations(&params)?;
    Ok(Json(serde_json::json!({
        "items": result.items,
        "total": result.total,
    })))
}

async fn get_station(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let station = svc.get_station(&id)?;
    Ok(Json(serde_json::to_value(station)?))
}

async fn station_summary(
    State(svc): State<AppState>,
    Path(id): Path<String>,
    Query(range): Query<DateRange>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let summary = svc.station_summary(&id, &range)?;
    Ok(Json(serde_json::to_value(summary)?))
}

async fn create_station(
    State(svc): State<AppState>,
    Extension(actor): Extension<Principal>,
    Json(input): Json<StationInput>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServiceError> {
    let station = svc.create_station(&actor, input)?;
    Ok((StatusCode::CREATED, Json(serde_json::to_value(station)?)))
}

async fn update_station(
    State(svc): State<AppState>,
    Extension(actor): Extension<Principal>,
    Path(id): Path<String>,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let station = svc.update_station(&actor, &id, patch)?;
    Ok(Json(serde_json::to_value(station)?))
}

async fn delete_station(
    State(svc): State<AppState>,
    Extension(actor): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServiceError> {
    svc.delete_station(&actor, &id)?;
    Ok(StatusCode::NO_CONTENT)
}
