//! Generic data models for the `adapters` crate.
//!
//! These models define the provider-independent representation of widget data,
//! so the backend can serve any provider implementation through one response format.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    Clear,
    PartlyCloudy,
    Cloudy,
    Rain,
    Snow,
    Storm,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    pub city: String,
    pub temperature_c: f64,
    pub humidity_pct: u8,
    pub wind_kph: f64,
    pub condition: WeatherCondition,
    pub provider: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExchangeRate {
    pub currency: String,
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateTable {
    pub base: String,
    pub rates: Vec<ExchangeRate>,
    pub provider: &'static str,
}

impl RateTable {
    pub fn rate_for(&self, currency: &str) -> Option<f64> {
        self.rates
            .iter()
            .find(|r| r.currency.eq_ignore_ascii_case(currency))
            .map(|r| r.rate)
    }
}
