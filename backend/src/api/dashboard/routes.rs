//! Defines the HTTP routes for the dashboard and its widgets.

use axum::routing::{delete, get, patch};
use axum::Router;

use super::handlers::{
    create_event, create_todo, delete_event, delete_todo, list_events, list_todos, summary,
    update_todo,
};
use super::widgets::{exchange_rates, weather};
use crate::AppState;

pub fn dashboard_router() -> Router<AppState> {
    Router::new().route("/summary", get(summary))
}

pub fn todos_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_todos).post(create_todo))
        .route("/:id", patch(update_todo).delete(delete_todo))
}

pub fn calendar_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_events).post(create_event))
        .route("/:id", delete(delete_event))
}

pub fn widgets_router() -> Router<AppState> {
    Router::new()
        .route("/weather", get(weather))
        .route("/exchange-rates", get(exchange_rates))
}
