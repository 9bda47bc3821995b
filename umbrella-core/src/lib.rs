//! Core library for the `umbrella` CLI.
//!
//! This crate defines:
//! - Clock-time phrase parsing ("9 PM" -> the next 21:00)
//! - Abstraction over forecast providers, with an OpenWeather implementation
//! - The umbrella decision over an hourly forecast window
//! - Configuration & credentials handling
//!
//! It is used by `umbrella-cli`, but can also be reused by other binaries or services.

pub mod clock;
pub mod config;
pub mod decision;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod provider;

pub use clock::{ClockTime, resolve_end_time};
pub use config::{Config, NetworkConfig};
pub use decision::{PeriodSpan, PrecipitationPeriod, UmbrellaVerdict, decide, is_precipitating};
pub use error::UmbrellaError;
pub use model::{GeoLocation, HourlyForecast, HourlySample};
pub use pipeline::{UmbrellaReport, check_umbrella};
pub use provider::{ForecastProvider, openweather::OpenWeatherProvider, provider_from_config};
