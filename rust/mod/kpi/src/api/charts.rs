use axum::body::Bytes;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use kpidash_core::{Principal, ServiceError};

use crate::api::AppState;
use crate::model::ChartDataset;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/charts", get(list_charts))
        .route("/api/charts/import", post(import_chart))
        .route("/api/charts/{name}", get(get_chart).delete(delete_chart))
}

#[derive(Debug, Deserialize)]
struct ImportParams {
    #[serde(default)]
    name: String,
}

async fn list_charts(State(svc): State<AppState>) -> Result<Json<serde_json::Value>, ServiceError> {
    let items = svc.list_charts()?;
    Ok(Json(serde_json::json!({
        "total": items.len(),
        "items": items,
    })))
}

/// POST /api/charts/import?name=: raw CSV/TSV body.
async fn import_chart(
    State(svc): State<AppState>,
    Extension(actor): Extension<Principal>,
    Query(params): Query<ImportParams>,
    body: Bytes,
) -> Result<(StatusCode, Json<ChartDataset>), ServiceError> {
    let dataset = svc.import_chart(&actor, &params.name, &body)?;
    Ok((StatusCode::CREATED, Json(dataset)))
}

async fn get_chart(
    State(svc): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ChartDataset>, ServiceError> {
    Ok(Json(svc.get_chart(&name)?))
}

async fn delete_chart(
    State(svc): State<AppState>,
    Extension(actor): Extension<Principal>,
    Path(name): Path<String>,
) -> Result<StatusCode, ServiceError> {
    svc.delete_chart(&actor, &name)?;
    Ok(StatusCode::NO_CONTENT)
}
