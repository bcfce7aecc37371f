use axum::extract::{Extension, Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};

use kpidash_core::{Principal, ServiceError};

use crate::api::AppState;
use crate::model::{CalendarDay, CalendarMonth, KpiCategory, SetDay};

/// `{period}` is a month (`YYYY-MM`) for reads and a day (`YYYY-MM-DD`) for writes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/calendars/{department}/{category}/{period}",
            get(month_view).put(set_day),
        )
        .route(
            "/api/calendars/{department}/{category}/{period}/toggle",
            post(toggle_day),
        )
}

async fn month_view(
    State(svc): State<AppState>,
    Path((department, category, month)): Path<(String, String, String)>,
) -> Result<Json<CalendarMonth>, ServiceError> {
    let category = KpiCategory::parse(&category)?;
    Ok(Json(svc.calendar_month(&department, category, &month)?))
}

async fn toggle_day(
    State(svc): State<AppState>,
    Extension(actor): Extension<Principal>,
    Path((department, category, date)): Path<(String, String, String)>,
) -> Result<Json<CalendarDay>, ServiceError> {
    let category = KpiCategory::parse(&category)?;
    Ok(Json(svc.toggle_day(&actor, &department, category, &date)?))
}

async fn set_day(
    State(svc): State<AppState>,
    Extension(actor): Extension<Principal>,
    Path((department, category, date)): Path<(String, String, String)>,
    Json(body): Json<SetDay>,
) -> Result<Json<CalendarDay>, ServiceError> {
    let category = KpiCategory::parse(&category)?;
    Ok(Json(svc.set_day(&actor, &department, category, &date, body.status)?))
}
