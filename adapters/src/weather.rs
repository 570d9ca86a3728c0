//! In-process weather provider backing the dashboard weather widget.
//!
//! Conditions come from a fixed table of cities. Lookups ignore case and Turkish
//! diacritics so that "istanbul", "ISTANBUL" and "İstanbul" resolve to the same entry.

use async_trait::async_trait;
use tracing::debug;

use crate::errors::AdapterError;
use crate::models::{WeatherCondition, WeatherReport};
use crate::WeatherProvider;

struct CityWeather {
    name: &'static str,
    temperature_c: f64,
    humidity_pct: u8,
    wind_kph: f64,
    condition: WeatherCondition,
}

const CITIES: &[CityWeather] = &[
    CityWeather { name: "İstanbul", temperature_c: 18.5, humidity_pct: 72, wind_kph: 14.0, condition: WeatherCondition::PartlyCloudy },
    CityWeather { name: "Ankara", temperature_c: 12.0, humidity_pct: 48, wind_kph: 9.5, condition: WeatherCondition::Clear },
    CityWeather { name: "İzmir", temperature_c: 21.3, humidity_pct: 60, wind_kph: 18.2, condition: WeatherCondition::Clear },
    CityWeather { name: "Bursa", temperature_c: 15.8, humidity_pct: 70, wind_kph: 7.0, condition: WeatherCondition::Cloudy },
    CityWeather { name: "Antalya", temperature_c: 24.1, humidity_pct: 65, wind_kph: 11.4, condition: WeatherCondition::Clear },
    CityWeather { name: "Trabzon", temperature_c: 14.2, humidity_pct: 84, wind_kph: 12.6, condition: WeatherCondition::Rain },
    CityWeather { name: "Erzurum", temperature_c: -3.5, humidity_pct: 78, wind_kph: 20.1, condition: WeatherCondition::Snow },
    CityWeather { name: "London", temperature_c: 11.0, humidity_pct: 81, wind_kph: 16.3, condition: WeatherCondition::Rain },
    CityWeather { name: "Berlin", temperature_c: 9.4, humidity_pct: 69, wind_kph: 13.0, condition: WeatherCondition::Cloudy },
];

/// Folds case and Turkish diacritics so user input matches table entries.
pub(crate) fn fold_city_name(input: &str) -> String {
    input
        .trim()
        .chars()
        .map(|c| match c {
            'İ' | 'I' | 'ı' => 'i',
            'Ş' | 'ş' => 's',
            'Ğ' | 'ğ' => 'g',
            'Ü' | 'ü' => 'u',
            'Ö' | 'ö' => 'o',
            'Ç' | 'ç' => 'c',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

#[derive(Debug, Default, Clone)]
pub struct StaticWeatherProvider;

impl StaticWeatherProvider {
    pub fn new() -> Self {
        Self
    }

    /// Names of every city this provider knows about.
    pub fn cities(&self) -> Vec<&'static str> {
        CITIES.iter().map(|c| c.name).collect()
    }
}

#[async_trait]
impl WeatherProvider for StaticWeatherProvider {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn current(&self, city: &str) -> Result<WeatherReport, AdapterError> {
        let key = fold_city_name(city);
        if key.is_empty() {
            return Err(AdapterError::InvalidInput("city must not be empty".to_string()));
        }

        let entry = CITIES
            .iter()
            .find(|c| fold_city_name(c.name) == key)
            .ok_or_else(|| AdapterError::UnknownCity(city.trim().to_string()))?;
        debug!(city = entry.name, "resolved weather from static table");

        Ok(WeatherReport {
            city: entry.name.to_string(),
            temperature_c: entry.temperature_c,
            humidity_pct: entry.humidity_pct,
            wind_kph: entry.wind_kph,
            condition: entry.condition,
            provider: self.name(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folding_ignores_case_and_turkish_letters() {
        assert_eq!(fold_city_name("İstanbul"), "istanbul");
        assert_eq!(fold_city_name("  ISTANBUL "), "istanbul");
        assert_eq!(fold_city_name("Çanakkale"), "canakkale");
    }

    #[tokio::test]
    async fn known_city_resolves_to_canonical_name() {
        let provider = StaticWeatherProvider::new();
        let report = provider.current("izmir").await.expect("izmir is known");
        assert_eq!(report.city, "İzmir");
        assert_eq!(report.provider, "static");
    }

    #[tokio::test]
    async fn unknown_and_empty_cities_are_rejected() {
        let provider = StaticWeatherProvider::new();
        assert_eq!(
            provider.current("Atlantis").await,
            Err(AdapterError::UnknownCity("Atlantis".to_string()))
        );
        assert!(matches!(
            provider.current("   ").await,
            Err(AdapterError::InvalidInput(_))
        ));
    }
}
