use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::{Json, Router};

use kpidash_core::{Principal, ServiceError};

use crate::api::AppState;
use crate::model::{DateRange, EntryInput};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/stations/{id}/entries", get(list_entries).post(create_entry))
        .route("/api/station-entries/{id}", delete(delete_entry))
}

async fn list_entries(
    State(svc): State<AppState>,
    Path(station_id): Path<String>,
    Query(range): Query<DateRange>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let items = svc.list_entries(&station_id, &range)?;
    Ok(Json(serde_json::json!({
        "total": items.len(),
        "items": items,
    })))
}

async fn create_entry(
    State(svc): State<AppState>,
    Extension(actor): Extension<Principal>,
    Path(station_id): Path<String>,
    Json(input): Json<EntryInput>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServiceError> {
    let entry = svc.create_entry(&actor, &station_id, input)?;
    Ok((StatusCode::CREATED, Json(serde_json::to_value(entry)?)))
}

async fn delete_entry(
    State(svc): State<AppState>,
    Extension(actor): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServiceError> {
    svc.delete_entry(&actor, &id)?;
    Ok(StatusCode::NO_CONTENT)
}
