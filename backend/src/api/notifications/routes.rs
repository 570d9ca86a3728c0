//! Defines the HTTP routes for notifications.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{list_notifications, mark_all_read, mark_read, unread_count};
use crate::AppState;

pub fn notifications_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications))
        .route("/unread-count", get(unread_count))
        .route("/read-all", post(mark_all_read))
        .route("/:id/read", post(mark_read))
}
