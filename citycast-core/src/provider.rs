use crate::{
    Config,
    model::{City, ForecastEntry},
    provider::openweather::OpenWeatherService,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// The two upstream calls the pipeline needs.
#[async_trait]
pub trait WeatherService: Send + Sync + Debug {
    /// All geocoding matches for `query`, in upstream order.
    async fn search_cities(&self, query: &str) -> anyhow::Result<Vec<City>>;

    /// The full, unsampled 3-hour forecast series at a coordinate.
    async fn forecast_series(&self, lat: f64, lon: f64) -> anyhow::Result<Vec<ForecastEntry>>;
}

/// Construct the HTTP-backed service from config.
pub fn service_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherService>> {
    let service = OpenWeatherService::new(config)?;
    Ok(Box::new(service))
}
