//! Handler functions for the dashboard summary, to-do list and calendar.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::auth::AuthUser;
use crate::database::models::{CalendarEvent, Todo};
use crate::errors::AppResult;
use crate::services::dashboard::{self, DashboardSummary};
use crate::services::planner::{self, EventInput, EventRange, TodoInput, UpdateTodoInput};
use crate::AppState;

pub async fn summary(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<DashboardSummary>> {
    Ok(Json(dashboard::summary(&state.db, &auth.record).await?))
}

pub async fn list_todos(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<Vec<Todo>>> {
    Ok(Json(planner::list_todos(&state.db, auth.id()).await?))
}

pub async fn create_todo(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<TodoInput>,
) -> AppResult<(StatusCode, Json<Todo>)> {
    let todo = planner::create_todo(&state.db, auth.id(), body).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

pub async fn update_todo(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(todo_id): Path<i64>,
    Json(body): Json<UpdateTodoInput>,
) -> AppResult<Json<Todo>> {
    Ok(Json(planner::update_todo(&state.db, auth.id(), todo_id, body).await?))
}

pub async fn delete_todo(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(todo_id): Path<i64>,
) -> AppResult<StatusCode> {
    planner::delete_todo(&state.db, auth.id(), todo_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_events(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(range): Query<EventRange>,
) -> AppResult<Json<Vec<CalendarEvent>>> {
    Ok(Json(planner::list_events(&state.db, auth.company_id(), range).await?))
}

pub async fn create_event(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<EventInput>,
) -> AppResult<(StatusCode, Json<CalendarEvent>)> {
    let event = planner::create_event(&state.db, &auth.record, body).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn delete_event(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(event_id): Path<i64>,
) -> AppResult<StatusCode> {
    planner::delete_event(&state.db, &auth.record, event_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
