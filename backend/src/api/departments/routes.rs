//! Defines the HTTP routes for departments.

use axum::routing::{get, patch};
use axum::Router;

use super::handlers::{create_department, delete_department, list_departments, update_department};
use crate::AppState;

pub fn departments_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_departments).post(create_department))
        .route("/:id", patch(update_department).delete(delete_department))
}
