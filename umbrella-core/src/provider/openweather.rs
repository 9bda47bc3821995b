use anyhow::Context;
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use crate::{
    config::NetworkConfig,
    error::UmbrellaError,
    model::{GeoLocation, HourlyForecast, HourlySample},
};

use super::ForecastProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

/// Geocoding + One Call 3.0 client.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
    retries: u32,
    retry_delay: Duration,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, network: &NetworkConfig) -> anyhow::Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = network.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            http,
            retries: network.retries,
            retry_delay: network.retry_delay(),
        })
    }

    /// Point the provider at another host, e.g. a mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<(StatusCode, String), reqwest::Error> {
        let url = format!("{}{}", self.base_url, path);
        let mut attempt = 0;

        loop {
            let result = self.send_once(&url, query).await;

            let retryable = match &result {
                Ok((status, _)) => status.is_server_error(),
                Err(_) => true,
            };
            if !retryable || attempt >= self.retries {
                return result;
            }

            attempt += 1;
            tracing::warn!(path, attempt, max = self.retries, "OpenWeather request failed, retrying");
            tokio::time::sleep(self.retry_delay).await;
        }
    }

    async fn send_once(&self, url: &str, query: &[(&str, &str)]) -> Result<(StatusCode, String), reqwest::Error> {
        let res = self
            .http
            .get(url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;
        tracing::debug!(
            %status,
            bytes = body.len(),
            body = %truncate_body(&body),
            "OpenWeather response"
        );

        Ok((status, body))
    }
}

#[derive(Debug, Deserialize)]
struct OwGeoMatch {
    name: String,
    #[serde(default)]
    country: Option<String>,
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwHour {
    dt: i64,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwOneCallResponse {
    hourly: Vec<OwHour>,
}

#[async_trait]
impl ForecastProvider for OpenWeatherProvider {
    async fn geocode(&self, city: &str) -> Result<GeoLocation, UmbrellaError> {
        let not_found = |status: Option<StatusCode>, body: String| UmbrellaError::LocationNotFound {
            city: city.to_string(),
            status: status.as_ref().map(StatusCode::as_u16),
            body,
        };

        let (status, body) = self
            .get("/geo/1.0/direct", &[("q", city), ("limit", "1")])
            .await
            .map_err(|e| not_found(None, transport_message(e)))?;

        if !status.is_success() {
            return Err(not_found(Some(status), body));
        }

        let matches: Vec<OwGeoMatch> = match serde_json::from_str(&body) {
            Ok(matches) => matches,
            Err(e) => {
                tracing::debug!(error = %e, "geocoding response is not a match list");
                return Err(not_found(Some(status), body));
            }
        };

        let Some(first) = matches.into_iter().next() else {
            return Err(not_found(Some(status), body));
        };

        let location = GeoLocation {
            name: first.name,
            country: first.country,
            latitude: first.lat,
            longitude: first.lon,
        };
        tracing::info!(
            location = %location.display_name(),
            lat = location.latitude,
            lon = location.longitude,
            "resolved city"
        );

        Ok(location)
    }

    async fn hourly_forecast(&self, location: &GeoLocation) -> Result<HourlyForecast, UmbrellaError> {
        let failed = |status: Option<StatusCode>, body: String| UmbrellaError::ForecastFetchFailed {
            status: status.as_ref().map(StatusCode::as_u16),
            body,
        };

        let lat = location.latitude.to_string();
        let lon = location.longitude.to_string();

        let (status, body) = self
            .get(
                "/data/3.0/onecall",
                &[
                    ("lat", lat.as_str()),
                    ("lon", lon.as_str()),
                    ("exclude", "current,minutely,daily,alerts"),
                    ("units", "metric"),
                ],
            )
            .await
            .map_err(|e| failed(None, transport_message(e)))?;

        if !status.is_success() {
            return Err(failed(Some(status), body));
        }

        let parsed: OwOneCallResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!(error = %e, "failed to parse One Call response");
                return Err(failed(Some(status), body));
            }
        };

        if parsed.hourly.is_empty() {
            return Err(failed(Some(status), body));
        }

        let samples = parsed
            .hourly
            .into_iter()
            .map(|hour| -> Result<HourlySample, UmbrellaError> {
                let time = DateTime::from_timestamp(hour.dt, 0).ok_or_else(|| {
                    failed(Some(status), format!("invalid hourly timestamp {}", hour.dt))
                })?;
                let (condition, description) = hour
                    .weather
                    .into_iter()
                    .next()
                    .map(|w| (w.main, w.description))
                    .unwrap_or_else(|| ("Unknown".to_string(), "unknown".to_string()));

                Ok(HourlySample {
                    time,
                    condition,
                    description,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(samples = samples.len(), "fetched hourly forecast");
        Ok(HourlyForecast::new(samples))
    }
}

/// Transport error text without the request URL, which carries the API key.
fn transport_message(err: reqwest::Error) -> String {
    let err = err.without_url();
    let mut message = err.to_string();
    let mut source = std::error::Error::source(&err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Short preview of a response body for logs.
fn truncate_body(body: &str) -> String {
    const MAX: usize = 500;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
