//! Handler functions for purchase requests and their workflow actions.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::errors::{AppError, AppResult};
use crate::services::requests::{self, CreateRequestInput, ListQuery, RequestDetail, RequestPage};
use crate::services::workflow::WorkflowAction;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct DecisionBody {
    pub comment: Option<String>,
}

impl DecisionBody {
    /// An empty body means no comment. Anything else must be a valid JSON object.
    fn parse(raw: &[u8]) -> AppResult<Self> {
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(raw).map_err(|err| AppError::validation(format!("invalid decision body: {err}")))
    }
}

pub async fn create_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateRequestInput>,
) -> AppResult<(StatusCode, Json<RequestDetail>)> {
    let detail = requests::create_request(&state.db, &auth.record, body).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

pub async fn list_requests(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<RequestPage>> {
    Ok(Json(requests::list_requests(&state.db, &auth.record, query).await?))
}

pub async fn get_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(request_id): Path<i64>,
) -> AppResult<Json<RequestDetail>> {
    Ok(Json(requests::get_request(&state.db, &auth.record, request_id).await?))
}

pub async fn cancel_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(request_id): Path<i64>,
) -> AppResult<StatusCode> {
    requests::cancel(&state.db, &state.storage, &auth.record, request_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn act(
    state: AppState,
    auth: AuthUser,
    request_id: i64,
    action: WorkflowAction,
    body: Bytes,
) -> AppResult<Json<RequestDetail>> {
    let comment = DecisionBody::parse(&body)?.comment;
    let detail = requests::decide(&state.db, &auth.record, request_id, action, comment).await?;
    Ok(Json(detail))
}

pub async fn approve(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(request_id): Path<i64>,
    body: Bytes,
) -> AppResult<Json<RequestDetail>> {
    act(state, auth, request_id, WorkflowAction::Approve, body).await
}

pub async fn reject(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(request_id): Path<i64>,
    body: Bytes,
) -> AppResult<Json<RequestDetail>> {
    act(state, auth, request_id, WorkflowAction::Reject, body).await
}

pub async fn start_purchase(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(request_id): Path<i64>,
    body: Bytes,
) -> AppResult<Json<RequestDetail>> {
    act(state, auth, request_id, WorkflowAction::StartPurchase, body).await
}

pub async fn complete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(request_id): Path<i64>,
    body: Bytes,
) -> AppResult<Json<RequestDetail>> {
    act(state, auth, request_id, WorkflowAction::Complete, body).await
}
