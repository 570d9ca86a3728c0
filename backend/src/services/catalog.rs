//! Product catalogue maintenance.

use serde::Deserialize;
use tracing::info;

use crate::database::models::Product;
use crate::database::queries::{self, NewProduct};
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::utils::{normalize_currency, optional_text, required_text};

#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub unit_price_cents: i64,
    pub currency: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub unit_price_cents: Option<i64>,
    pub currency: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductQuery {
    #[serde(default)]
    pub active_only: bool,
    pub category: Option<String>,
}

fn check_price(cents: i64) -> AppResult<i64> {
    if cents < 0 {
        return Err(AppError::validation("unit_price_cents must not be negative"));
    }
    Ok(cents)
}

pub async fn list_products(db: &Database, company_id: i64, query: ProductQuery) -> AppResult<Vec<Product>> {
    db.call(move |conn| {
        Ok(queries::list_products(
            conn,
            company_id,
            query.active_only,
            query.category.as_deref().map(str::trim).filter(|c| !c.is_empty()),
        )?)
    })
    .await
}

pub async fn get_product(db: &Database, company_id: i64, product_id: i64) -> AppResult<Product> {
    db.call(move |conn| {
        queries::get_product(conn, company_id, product_id)?.ok_or(AppError::NotFound("product"))
    })
    .await
}

pub async fn create_product(db: &Database, company_id: i64, input: ProductInput) -> AppResult<Product> {
    let name = required_text("name", &input.name, 200)?;
    let category = required_text("category", &input.category, 80)?;
    let description = optional_text("description", &input.description, 2000)?;
    let unit_price_cents = check_price(input.unit_price_cents)?;
    let currency = normalize_currency(&input.currency)?;

    let product = db
        .call(move |conn| {
            Ok(queries::insert_product(
                conn,
                &NewProduct {
                    company_id,
                    name: &name,
                    category: &category,
                    description: &description,
                    unit_price_cents,
                    currency: &currency,
                },
            )?)
        })
        .await?;
    info!(company_id, product_id = product.id, "product created");
    Ok(product)
}

pub async fn update_product(
    db: &Database,
    company_id: i64,
    product_id: i64,
    input: UpdateProductInput,
) -> AppResult<Product> {
    let name = input.name.as_deref().map(|v| required_text("name", v, 200)).transpose()?;
    let category = input.category.as_deref().map(|v| required_text("category", v, 80)).transpose()?;
    let description = input
        .description
        .as_deref()
        .map(|v| optional_text("description", v, 2000))
        .transpose()?;
    let price = input.unit_price_cents.map(check_price).transpose()?;
    let currency = input.currency.as_deref().map(normalize_currency).transpose()?;

    db.transaction(move |tx| {
        let mut product = queries::get_product(tx, company_id, product_id)?.ok_or(AppError::NotFound("product"))?;
        if let Some(name) = name {
            product.name = name;
        }
        if let Some(category) = category {
            product.category = category;
        }
        if let Some(description) = description {
            product.description = description;
        }
        if let Some(price) = price {
            product.unit_price_cents = price;
        }
        if let Some(currency) = currency {
            product.currency = currency;
        }
        if let Some(active) = input.active {
            product.active = active;
        }
        queries::save_product(tx, &product)?;
        Ok(product)
    })
    .await
}
