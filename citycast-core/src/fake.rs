//! In-memory `WeatherService` for unit tests.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;

use crate::{City, ForecastEntry, WeatherService};

#[derive(Debug, Default)]
pub(crate) struct FakeService {
    cities: HashMap<String, Vec<City>>,
    series: Vec<ForecastEntry>,
    pub(crate) geocode_calls: AtomicUsize,
    pub(crate) forecast_calls: AtomicUsize,
}

pub(crate) fn city(name: &str, lat: f64, lon: f64, country: &str) -> City {
    City {
        name: name.to_string(),
        lat,
        lon,
        country: Some(country.to_string()),
        state: None,
    }
}

/// `len` three-hourly readings starting at 2024-05-14 00:00.
pub(crate) fn series(len: usize) -> Vec<ForecastEntry> {
    (0..len)
        .map(|i| ForecastEntry {
            timestamp_text: format!("2024-05-{:02} {:02}:00:00", 14 + i / 8, (i % 8) * 3),
            description: format!("reading {i}"),
            temperature: 10.0 + i as f64 / 4.0,
        })
        .collect()
}

impl FakeService {
    /// Geocoding answers shaped like the real service's for the usual test queries.
    pub(crate) fn with_fixtures() -> Self {
        let mut cities = HashMap::new();
        cities.insert("Paris".to_string(), vec![city("Paris", 48.8588897, 2.3200410, "FR")]);
        cities.insert(
            "London".to_string(),
            vec![
                city("London", 51.5073219, -0.1276474, "GB"),
                city("City of London", 51.5156177, -0.0919983, "GB"),
                city("London", 42.9832406, -81.243372, "CA"),
                city("Chelsea", 51.4875167, -0.1687007, "GB"),
                city("London", 37.1289771, -84.0832646, "US"),
            ],
        );

        Self {
            cities,
            series: series(40),
            ..Self::default()
        }
    }

    pub(crate) fn with_series(mut self, series: Vec<ForecastEntry>) -> Self {
        self.series = series;
        self
    }
}

#[async_trait]
impl WeatherService for FakeService {
    async fn search_cities(&self, query: &str) -> anyhow::Result<Vec<City>> {
        self.geocode_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.cities.get(query).cloned().unwrap_or_default())
    }

    async fn forecast_series(&self, _lat: f64, _lon: f64) -> anyhow::Result<Vec<ForecastEntry>> {
        self.forecast_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.series.clone())
    }
}
