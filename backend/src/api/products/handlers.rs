//! Handler functions for the product catalogue.
//!
//! Everyone in a company can browse its catalogue; administrators and the
//! purchasing department maintain it.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::auth::AuthUser;
use crate::database::models::{Product, Role};
use crate::errors::AppResult;
use crate::services::catalog::{self, ProductInput, ProductQuery, UpdateProductInput};
use crate::AppState;

const CATALOGUE_EDITORS: &[Role] = &[Role::Admin, Role::Purchasing];

pub async fn list_products(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<Vec<Product>>> {
    Ok(Json(catalog::list_products(&state.db, auth.company_id(), query).await?))
}

pub async fn get_product(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(product_id): Path<i64>,
) -> AppResult<Json<Product>> {
    Ok(Json(catalog::get_product(&state.db, auth.company_id(), product_id).await?))
}

pub async fn create_product(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<ProductInput>,
) -> AppResult<(StatusCode, Json<Product>)> {
    auth.require_any(CATALOGUE_EDITORS)?;
    let product = catalog::create_product(&state.db, auth.company_id(), body).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(product_id): Path<i64>,
    Json(body): Json<UpdateProductInput>,
) -> AppResult<Json<Product>> {
    auth.require_any(CATALOGUE_EDITORS)?;
    Ok(Json(
        catalog::update_product(&state.db, auth.company_id(), product_id, body).await?,
    ))
}

pub async fn deactivate_product(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(product_id): Path<i64>,
) -> AppResult<Json<Product>> {
    auth.require_any(CATALOGUE_EDITORS)?;
    let update = UpdateProductInput {
        active: Some(false),
        ..UpdateProductInput::default()
    };
    Ok(Json(
        catalog::update_product(&state.db, auth.company_id(), product_id, update).await?,
    ))
}
