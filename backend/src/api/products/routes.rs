//! Defines the HTTP routes for the product catalogue.

use axum::routing::get;
use axum::Router;

use super::handlers::{create_product, deactivate_product, get_product, list_products, update_product};
use crate::AppState;

pub fn products_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/:id",
            get(get_product).patch(update_product).delete(deactivate_product),
        )
}
