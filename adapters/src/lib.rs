//! Core `adapters` crate for abstracting the data sources behind dashboard widgets.
//!
//! This crate defines the `WeatherProvider` and `ExchangeRateProvider` traits, which
//! outline the functionality the backend needs from weather and currency sources, and
//! provides the built-in in-process implementations used by the dashboard.

pub mod errors;
pub mod models;
pub mod rates;
pub mod weather;

use async_trait::async_trait;

pub use errors::AdapterError;
pub use models::{ExchangeRate, RateTable, WeatherCondition, WeatherReport};
pub use rates::FixedRateProvider;
pub use weather::StaticWeatherProvider;

/// Source of current weather conditions for the dashboard widget.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Human readable provider name, reported alongside widget payloads.
    fn name(&self) -> &'static str;

    async fn current(&self, city: &str) -> Result<WeatherReport, AdapterError>;
}

/// Source of currency exchange rates for the dashboard widget.
#[async_trait]
pub trait ExchangeRateProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns how many units of every other known currency one unit of `base` buys.
    async fn rates(&self, base: &str) -> Result<RateTable, AdapterError>;
}
