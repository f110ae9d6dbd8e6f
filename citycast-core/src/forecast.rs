use anyhow::Result;
use tracing::{debug, warn};

use crate::{model::ForecastEntry, provider::WeatherService};

/// The upstream series has one reading every 3 hours, so every 8th is one per day.
pub const SAMPLE_STRIDE: usize = 8;

/// Keep positions 0, 8, 16, ... of `series`, `series.len() / 8` entries in total.
///
/// A trailing partial day is dropped, so a series shorter than one stride
/// gives an empty result.
pub fn sample_daily(series: Vec<ForecastEntry>) -> Vec<ForecastEntry> {
    let days = series.len() / SAMPLE_STRIDE;
    series.into_iter().step_by(SAMPLE_STRIDE).take(days).collect()
}

/// One forecast reading per day at the given coordinate.
pub async fn fetch_forecast(
    service: &dyn WeatherService,
    lat: f64,
    lon: f64,
) -> Result<Vec<ForecastEntry>> {
    let series = service.forecast_series(lat, lon).await?;
    let upstream = series.len();
    let daily = sample_daily(series);

    if daily.is_empty() {
        warn!(upstream, "forecast series shorter than one day");
    } else {
        debug!(upstream, sampled = daily.len(), "forecast sampled");
    }

    Ok(daily)
}
