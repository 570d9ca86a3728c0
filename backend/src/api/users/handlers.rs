//! Handler functions for user management API endpoints.
//!
//! All endpoints here are restricted to company administrators.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::auth::AuthUser;
use crate::database::models::User;
use crate::errors::AppResult;
use crate::services::directory::{self, CreateUserInput, UpdateUserInput};
use crate::AppState;

pub async fn list_users(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<Vec<User>>> {
    auth.require_admin()?;
    Ok(Json(directory::list_users(&state.db, auth.company_id()).await?))
}

pub async fn get_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<i64>,
) -> AppResult<Json<User>> {
    auth.require_admin()?;
    Ok(Json(directory::get_user(&state.db, auth.company_id(), user_id).await?))
}

pub async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateUserInput>,
) -> AppResult<(StatusCode, Json<User>)> {
    auth.require_admin()?;
    let user = directory::create_user(&state.db, auth.company_id(), body).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<i64>,
    Json(body): Json<UpdateUserInput>,
) -> AppResult<Json<User>> {
    auth.require_admin()?;
    Ok(Json(directory::update_user(&state.db, &auth.record, user_id, body).await?))
}

pub async fn deactivate_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<i64>,
) -> AppResult<Json<User>> {
    auth.require_admin()?;
    Ok(Json(directory::deactivate_user(&state.db, &auth.record, user_id).await?))
}
