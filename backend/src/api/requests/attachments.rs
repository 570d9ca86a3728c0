//! Handler functions for request attachments.

use axum::extract::{Multipart, Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::auth::AuthUser;
use crate::database::models::Attachment;
use crate::errors::{AppError, AppResult};
use crate::services::attachments::{self, Upload, DEFAULT_CONTENT_TYPE};
use crate::AppState;

const FILE_FIELD: &str = "file";

fn multipart_error(state: &AppState, err: axum::extract::multipart::MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(state.config.max_upload_bytes)
    } else {
        AppError::validation(format!("malformed multipart body: {}", err.body_text()))
    }
}

pub async fn upload_attachment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(request_id): Path<i64>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<Attachment>)> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| multipart_error(&state, err))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(|err| multipart_error(&state, err))?;
        upload = Some(Upload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
        break;
    }
    let upload = upload.ok_or_else(|| AppError::validation("multipart field `file` is required"))?;

    let attachment = attachments::upload(
        &state.db,
        &state.storage,
        state.config.max_upload_bytes,
        &auth.record,
        request_id,
        upload,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(attachment)))
}

pub async fn list_attachments(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(request_id): Path<i64>,
) -> AppResult<Json<Vec<Attachment>>> {
    Ok(Json(attachments::list(&state.db, &auth.record, request_id).await?))
}

/// `Content-Disposition` with an ASCII fallback name and the RFC 5987 encoded original.
fn content_disposition(name: &str) -> HeaderValue {
    let fallback: String = name
        .chars()
        .map(|c| if c.is_ascii_graphic() || c == ' ' { c } else { '_' })
        .filter(|c| *c != '"' && *c != '\\')
        .collect();
    let encoded: String = name
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'.' | b'-' | b'_' | b'~' => (b as char).to_string(),
            other => format!("%{other:02X}"),
        })
        .collect();
    HeaderValue::from_str(&format!(
        "attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}"
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

pub async fn download_attachment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(attachment_id): Path<i64>,
) -> AppResult<Response> {
    let (attachment, bytes) =
        attachments::download(&state.db, &state.storage, &auth.record, attachment_id).await?;
    let content_type = HeaderValue::from_str(&attachment.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
    Ok((
        [
            (CONTENT_TYPE, content_type),
            (CONTENT_DISPOSITION, content_disposition(&attachment.original_name)),
        ],
        bytes,
    )
        .into_response())
}

pub async fn delete_attachment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(attachment_id): Path<i64>,
) -> AppResult<StatusCode> {
    attachments::delete(&state.db, &state.storage, &auth.record, attachment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
