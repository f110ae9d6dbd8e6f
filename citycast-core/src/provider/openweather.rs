use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    Config,
    error::{WeatherError, truncate_body},
    model::{City, ForecastEntry},
};

use super::WeatherService;

/// OpenWeather-compatible geocoding and forecast endpoints under one base URL.
#[derive(Debug, Clone)]
pub struct OpenWeatherService {
    base_url: Url,
    api_key: Option<String>,
    units: Option<String>,
    geocode_limit: u8,
    http: Client,
}

impl OpenWeatherService {
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;

        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: config.base_url()?,
            api_key: config.api_key.clone(),
            units: config.units.clone(),
            geocode_limit: config.geocode_limit,
            http,
        })
    }

    pub fn geocode_url(&self, query: &str) -> Result<Url> {
        let limit = self.geocode_limit.to_string();
        let mut params = vec![("q", query), ("limit", limit.as_str())];
        if let Some(key) = &self.api_key {
            params.push(("appid", key.as_str()));
        }

        self.endpoint(&["geo", "1.0", "direct"], &params)
    }

    pub fn forecast_url(&self, lat: f64, lon: f64) -> Result<Url> {
        let lat = lat.to_string();
        let lon = lon.to_string();
        let mut params = vec![("lat", lat.as_str()), ("lon", lon.as_str())];
        if let Some(key) = &self.api_key {
            params.push(("appid", key.as_str()));
        }
        if let Some(units) = &self.units {
            params.push(("units", units.as_str()));
        }

        self.endpoint(&["data", "2.5", "forecast"], &params)
    }

    fn endpoint(&self, segments: &[&str], params: &[(&str, &str)]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("Base URL '{}' cannot carry a path", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        url.query_pairs_mut().extend_pairs(params);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, what: &str) -> Result<T> {
        debug!(url = %redact(&url), "GET {what}");

        let res = self
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to send {what} request"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read {what} response body"))?;

        if !status.is_success() {
            return Err(WeatherError::UpstreamStatus {
                status: status.as_u16(),
                body: truncate_body(&body),
            })
            .with_context(|| format!("{what} request was rejected"));
        }

        serde_json::from_str(&body).with_context(|| format!("Failed to parse {what} JSON"))
    }
}

#[async_trait]
impl WeatherService for OpenWeatherService {
    async fn search_cities(&self, query: &str) -> Result<Vec<City>> {
        let url = self.geocode_url(query)?;
        let cities: Vec<City> = self.get_json(url, "geocoding").await?;
        debug!(query, matches = cities.len(), "geocoding finished");
        Ok(cities)
    }

    async fn forecast_series(&self, lat: f64, lon: f64) -> Result<Vec<ForecastEntry>> {
        let url = self.forecast_url(lat, lon)?;
        let parsed: OwForecastResponse = self.get_json(url, "forecast").await?;
        debug!(entries = parsed.list.len(), "forecast series received");
        into_entries(parsed)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwForecastItem {
    dt_txt: String,
    main: OwMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastItem>,
}

fn into_entries(response: OwForecastResponse) -> Result<Vec<ForecastEntry>> {
    response
        .list
        .into_iter()
        .map(|item| -> Result<ForecastEntry> {
            let description = item
                .weather
                .into_iter()
                .next()
                .map(|w| w.description)
                .ok_or_else(|| WeatherError::MissingDescription {
                    timestamp: item.dt_txt.clone(),
                })?;

            Ok(ForecastEntry {
                timestamp_text: item.dt_txt,
                description,
                temperature: item.main.temp,
            })
        })
        .collect()
}

/// Hide the API key when a URL ends up in logs.
fn redact(url: &Url) -> Url {
    let mut shown = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "appid" { "***".to_string() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();
    shown.query_pairs_mut().clear().extend_pairs(pairs);
    shown
}
