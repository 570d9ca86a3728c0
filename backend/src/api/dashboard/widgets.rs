//! Handler functions for the weather and exchange-rate widgets.

use adapters::{RateTable, WeatherReport};
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::errors::AppResult;
use crate::AppState;

const DEFAULT_CITY: &str = "İstanbul";
const DEFAULT_BASE_CURRENCY: &str = "TRY";

#[derive(Debug, Default, Deserialize)]
pub struct WeatherQuery {
    pub city: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RatesQuery {
    pub base: Option<String>,
}

pub async fn weather(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<WeatherQuery>,
) -> AppResult<Json<WeatherReport>> {
    let city = query.city.as_deref().unwrap_or(DEFAULT_CITY);
    Ok(Json(state.weather.current(city).await?))
}

pub async fn exchange_rates(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<RatesQuery>,
) -> AppResult<Json<RateTable>> {
    let base = query.base.as_deref().unwrap_or(DEFAULT_BASE_CURRENCY);
    Ok(Json(state.rates.rates(base).await?))
}
