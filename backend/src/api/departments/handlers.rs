//! Handler functions for department endpoints. Listing is open to every
//! authenticated user; changes require an administrator.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::auth::AuthUser;
use crate::database::models::Department;
use crate::errors::AppResult;
use crate::services::directory::{self, DepartmentInput, UpdateDepartmentInput};
use crate::AppState;

pub async fn list_departments(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<Vec<Department>>> {
    Ok(Json(directory::list_departments(&state.db, auth.company_id()).await?))
}

pub async fn create_department(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<DepartmentInput>,
) -> AppResult<(StatusCode, Json<Department>)> {
    auth.require_admin()?;
    let department = directory::create_department(&state.db, auth.company_id(), body).await?;
    Ok((StatusCode::CREATED, Json(department)))
}

pub async fn update_department(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(department_id): Path<i64>,
    Json(body): Json<UpdateDepartmentInput>,
) -> AppResult<Json<Department>> {
    auth.require_admin()?;
    Ok(Json(
        directory::update_department(&state.db, auth.company_id(), department_id, body).await?,
    ))
}

pub async fn delete_department(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(department_id): Path<i64>,
) -> AppResult<StatusCode> {
    auth.require_admin()?;
    directory::delete_department(&state.db, auth.company_id(), department_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
