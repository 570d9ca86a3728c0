//! Defines the HTTP routes for purchase requests and attachments.

use axum::routing::{get, post};
use axum::Router;

use super::attachments::{delete_attachment, download_attachment, list_attachments, upload_attachment};
use super::handlers::{
    approve, cancel_request, complete, create_request, get_request, list_requests, reject,
    start_purchase,
};
use crate::AppState;

pub fn requests_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_requests).post(create_request))
        .route("/:id", get(get_request).delete(cancel_request))
        .route("/:id/approve", post(approve))
        .route("/:id/reject", post(reject))
        .route("/:id/start-purchase", post(start_purchase))
        .route("/:id/complete", post(complete))
        .route("/:id/attachments", get(list_attachments).post(upload_attachment))
}

pub fn attachments_router() -> Router<AppState> {
    Router::new().route("/:id", get(download_attachment).delete(delete_attachment))
}
