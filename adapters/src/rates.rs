//! In-process exchange rate provider backing the dashboard currency widget.
//!
//! Rates are anchored on USD; cross rates for any other base are derived from the
//! anchor table and rounded to four decimal places.

use async_trait::async_trait;

use crate::errors::AdapterError;
use crate::models::{ExchangeRate, RateTable};
use crate::ExchangeRateProvider;

/// Units of each currency one US dollar buys.
const USD_ANCHORED: &[(&str, f64)] = &[
    ("USD", 1.0),
    ("EUR", 0.92),
    ("GBP", 0.79),
    ("CHF", 0.90),
    ("JPY", 151.20),
    ("TRY", 32.45),
];

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[derive(Debug, Clone)]
pub struct FixedRateProvider {
    anchored: Vec<(String, f64)>,
}

impl Default for FixedRateProvider {
    fn default() -> Self {
        Self {
            anchored: USD_ANCHORED
                .iter()
                .map(|(code, rate)| (code.to_string(), *rate))
                .collect(),
        }
    }
}

impl FixedRateProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a provider from a custom USD-anchored table. Non-positive rates are rejected.
    pub fn with_table(table: Vec<(String, f64)>) -> Result<Self, AdapterError> {
        if let Some((code, _)) = table.iter().find(|(_, rate)| !(*rate > 0.0)) {
            return Err(AdapterError::InvalidInput(format!(
                "rate for {code} must be positive"
            )));
        }
        Ok(Self {
            anchored: table
                .into_iter()
                .map(|(code, rate)| (code.to_ascii_uppercase(), rate))
                .collect(),
        })
    }

    fn per_usd(&self, currency: &str) -> Result<f64, AdapterError> {
        let code = currency.trim().to_ascii_uppercase();
        self.anchored
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, rate)| *rate)
            .ok_or(AdapterError::UnknownCurrency(code))
    }

    /// Converts `amount` of `from` into `to`, rounded to four decimals.
    pub fn convert(&self, amount: f64, from: &str, to: &str) -> Result<f64, AdapterError> {
        let from_rate = self.per_usd(from)?;
        let to_rate = self.per_usd(to)?;
        Ok(round4(amount / from_rate * to_rate))
    }
}

#[async_trait]
impl ExchangeRateProvider for FixedRateProvider {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn rates(&self, base: &str) -> Result<RateTable, AdapterError> {
        let base_code = base.trim().to_ascii_uppercase();
        let base_rate = self.per_usd(&base_code)?;

        let rates = self
            .anchored
            .iter()
            .filter(|(code, _)| *code != base_code)
            .map(|(code, rate)| ExchangeRate {
                currency: code.clone(),
                rate: round4(rate / base_rate),
            })
            .collect();

        Ok(RateTable {
            base: base_code,
            rates,
            provider: self.name(),
        })
    }
}
