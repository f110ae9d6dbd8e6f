use serde::{Deserialize, Serialize};

/// A geocoding match.
///
/// `country` and `state` come straight from the geocoding service and are
/// only carried along; resolution and forecasting use `name`, `lat`, `lon`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

/// One reading of the forecast series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    /// Upstream `dt_txt`, e.g. `2024-05-14 12:00:00`.
    pub timestamp_text: String,
    pub description: String,
    pub temperature: f64,
}
