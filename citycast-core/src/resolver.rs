use anyhow::Result;
use tracing::{debug, info};

use crate::{WeatherError, model::City, provider::WeatherService};

/// Policy for picking one city out of several geocoding matches.
///
/// Implementations return a 1-based choice, the same number a user would
/// type next to the enumerated menu. The resolver checks the range.
pub trait Selector {
    fn choose(&self, candidates: &[City]) -> Result<usize>;
}

/// Always takes the first (best ranked) match.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstMatch;

impl Selector for FirstMatch {
    fn choose(&self, _candidates: &[City]) -> Result<usize> {
        Ok(1)
    }
}

/// A choice decided up front, e.g. from a command-line flag.
#[derive(Debug, Clone, Copy)]
pub struct FixedChoice(pub usize);

impl Selector for FixedChoice {
    fn choose(&self, _candidates: &[City]) -> Result<usize> {
        Ok(self.0)
    }
}

/// Narrow a candidate list down to at most one city.
///
/// The selector is only consulted when there is more than one candidate.
pub fn select_city(candidates: Vec<City>, selector: &dyn Selector) -> Result<Option<City>> {
    match candidates.len() {
        0 => Ok(None),
        1 => Ok(candidates.into_iter().next()),
        count => {
            let choice = selector.choose(&candidates)?;
            if choice == 0 || choice > count {
                return Err(WeatherError::InvalidSelection { choice, count }.into());
            }

            debug!(choice, count, "candidate selected");
            Ok(candidates.into_iter().nth(choice - 1))
        }
    }
}

/// Look `query` up and resolve it to a single city, or `None` when nothing matches.
pub async fn resolve_city(
    service: &dyn WeatherService,
    query: &str,
    selector: &dyn Selector,
) -> Result<Option<City>> {
    let candidates = service.search_cities(query).await?;
    let city = select_city(candidates, selector)?;

    match &city {
        Some(c) => info!(query, name = %c.name, lat = c.lat, lon = c.lon, "city resolved"),
        None => info!(query, "no city matched"),
    }

    Ok(city)
}
