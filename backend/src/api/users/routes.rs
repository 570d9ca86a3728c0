//! Defines the HTTP routes for user management.

use axum::routing::get;
use axum::Router;

use super::handlers::{create_user, deactivate_user, get_user, list_users, update_user};
use crate::AppState;

pub fn users_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", get(get_user).patch(update_user).delete(deactivate_user))
}
