//! Core library for the `citycast` CLI.
//!
//! This crate defines:
//! - Configuration handling (base URL, optional credentials, timeouts)
//! - The `WeatherService` abstraction and its HTTP implementation
//! - City resolution with a pluggable selection policy
//! - Daily sampling of the 3-hour forecast series
//!
//! It is used by `citycast-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod forecast;
pub mod model;
pub mod provider;
pub mod resolver;

#[cfg(test)]
pub(crate) mod fake;

pub use config::Config;
pub use error::WeatherError;
pub use forecast::{SAMPLE_STRIDE, fetch_forecast, sample_daily};
pub use model::{City, ForecastEntry};
pub use provider::{WeatherService, service_from_config};
pub use resolver::{FirstMatch, FixedChoice, Selector, resolve_city, select_city};
