use crate::{
    Config, UmbrellaError,
    model::{GeoLocation, HourlyForecast},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// A source of coordinates and hourly forecasts.
#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    /// Resolve `city` to its first matching location.
    async fn geocode(&self, city: &str) -> Result<GeoLocation, UmbrellaError>;

    /// Hourly samples for `location`, starting with the current hour.
    async fn hourly_forecast(&self, location: &GeoLocation) -> Result<HourlyForecast, UmbrellaError>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn ForecastProvider>> {
    let api_key = config.api_key()?;
    let provider = OpenWeatherProvider::new(api_key.to_owned(), &config.network)?;
    Ok(Box::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = provider_from_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("No OpenWeather API key configured"));
    }

    #[test]
    fn provider_from_config_works_when_configured() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".to_string());
        cfg.network.timeout_secs = Some(5);

        assert!(provider_from_config(&cfg).is_ok());
    }
}
