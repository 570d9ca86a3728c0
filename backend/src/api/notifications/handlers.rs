//! Handler functions for a user's notification inbox.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::database::models::Notification;
use crate::database::queries;
use crate::errors::{AppError, AppResult};
use crate::utils::MAX_PAGE_SIZE;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct InboxQuery {
    #[serde(default)]
    pub unread_only: bool,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub unread: i64,
}

#[derive(Debug, Serialize)]
pub struct MarkedRead {
    pub updated: usize,
}

pub async fn list_notifications(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<InboxQuery>,
) -> AppResult<Json<Vec<Notification>>> {
    let user_id = auth.id();
    let limit = query.limit.unwrap_or(50).clamp(1, MAX_PAGE_SIZE);
    let items = state
        .db
        .call(move |conn| Ok(queries::list_notifications(conn, user_id, query.unread_only, limit)?))
        .await?;
    Ok(Json(items))
}

pub async fn unread_count(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<UnreadCount>> {
    let user_id = auth.id();
    let unread = state
        .db
        .call(move |conn| Ok(queries::unread_notification_count(conn, user_id)?))
        .await?;
    Ok(Json(UnreadCount { unread }))
}

pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(notification_id): Path<i64>,
) -> AppResult<StatusCode> {
    let user_id = auth.id();
    let updated = state
        .db
        .call(move |conn| Ok(queries::mark_notification_read(conn, user_id, notification_id)?))
        .await?;
    if !updated {
        return Err(AppError::NotFound("notification"));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn mark_all_read(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<MarkedRead>> {
    let user_id = auth.id();
    let updated = state
        .db
        .call(move |conn| Ok(queries::mark_all_notifications_read(conn, user_id)?))
        .await?;
    Ok(Json(MarkedRead { updated }))
}
