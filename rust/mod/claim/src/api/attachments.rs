use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Extension, Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{delete, get};
use axum::{Json, Router};

use kpidash_core::{Principal, ServiceError};

use crate::api::AppState;
use crate::service::MAX_ATTACHMENT_BYTES;

/// Original file name of an uploaded attachment.
pub const FILE_NAME_HEADER: &str = "x-file-name";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/claims/{id}/attachments",
            get(list_attachments)
                .post(upload_attachment)
                .layer(DefaultBodyLimit::max(MAX_ATTACHMENT_BYTES)),
        )
        .route("/api/attachments/{id}", delete(delete_attachment))
        .route("/api/attachments/{id}/content", get(attachment_content))
}

fn header_text(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).trim().to_string())
        .filter(|v| !v.is_empty())
}

/// ASCII-only name for `Content-Disposition`.
fn disposition_name(file_name: &str) -> String {
    file_name
        .chars()
        .map(|c| if (c.is_ascii_graphic() && c != '"') || c == ' ' { c } else { '_' })
        .collect()
}

async fn list_attachments(
    State(svc): State<AppState>,
    Path(claim_id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let items = svc.list_attachments(&claim_id)?;
    Ok(Json(serde_json::json!({
        "total": items.len(),
        "items": items,
    })))
}

async fn upload_attachment(
    State(svc): State<AppState>,
    Extension(actor): Extension<Principal>,
    Path(claim_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<serde_json::Value>), ServiceError> {
    let file_name = header_text(&headers, FILE_NAME_HEADER)
        .ok_or_else(|| ServiceError::Validation(format!("{} header is required", FILE_NAME_HEADER)))?;
    let content_type = header_text(&headers, header::CONTENT_TYPE.as_str());
    let attachment = svc.add_attachment(&actor, &claim_id, &file_name, content_type.as_deref(), &body)?;
    Ok((StatusCode::CREATED, Json(serde_json::to_value(attachment)?)))
}

async fn attachment_content(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let (attachment, bytes) = svc.attachment_content(&id)?;
    Ok((
        [
            (header::CONTENT_TYPE, attachment.content_type),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", disposition_name(&attachment.file_name)),
            ),
        ],
        bytes,
    ))
}

async fn delete_attachment(
    State(svc): State<AppState>,
    Extension(actor): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServiceError> {
    svc.delete_attachment(&actor, &id)?;
    Ok(StatusCode::NO_CONTENT)
}
