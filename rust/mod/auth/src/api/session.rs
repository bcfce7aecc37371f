use axum::extract::{Extension, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};

use kpidash_core::{Principal, ServiceError};

use crate::api::AppState;
use crate::model::{ChangePassword, LoginRequest};

pub fn public_routes() -> Router<AppState> {
    Router::new().route("/api/auth/login", post(login))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(me))
        .route("/api/auth/password", put(change_password))
}

/// POST /api/auth/login: sets the session cookie and returns the token.
async fn login(
    State(svc): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let resp = svc.login(&input.username, &input.password)?;
    let cookie = svc.session_cookie(&resp.token);
    Ok(([(header::SET_COOKIE, cookie)], Json(resp)))
}

/// POST /api/auth/logout: revokes the session and expires the cookie.
async fn logout(
    State(svc): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ServiceError> {
    svc.logout(&headers)?;
    Ok((StatusCode::NO_CONTENT, [(header::SET_COOKIE, svc.clear_cookie())]))
}

/// GET /api/auth/me: the signed-in user.
async fn me(
    State(svc): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let user = svc.get_user(&principal.user_id)?;
    Ok(Json(serde_json::to_value(user)?))
}

async fn change_password(
    State(svc): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(input): Json<ChangePassword>,
) -> Result<StatusCode, ServiceError> {
    svc.change_password(&principal, input)?;
    Ok(StatusCode::NO_CONTENT)
}
