use std::io::Write;

use anyhow::{Context, Result};
use citycast_core::{Selector, WeatherService, fetch_forecast, resolve_city};
use tracing::debug;

use crate::{
    output::write_forecast,
    prompt::{CityInput, is_interrupt},
};

/// Outcome of one prompt → display round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Ties a service, an input source and a selection policy together for
/// repeated lookups.
pub struct Session {
    service: Box<dyn WeatherService>,
    input: Box<dyn CityInput>,
    selector: Box<dyn Selector>,
}

impl Session {
    pub fn new(
        service: Box<dyn WeatherService>,
        input: Box<dyn CityInput>,
        selector: Box<dyn Selector>,
    ) -> Self {
        Self { service, input, selector }
    }

    /// Ask for cities until the input ends or the user interrupts, then say goodbye.
    pub async fn run(&self, out: &mut dyn Write) -> Result<()> {
        while self.step(out).await? == Flow::Continue {}

        writeln!(out, "\nGoodbye!")?;
        Ok(())
    }

    /// Read one city and print its forecast.
    ///
    /// End of input, or Ctrl-C at a prompt or while a request is in flight,
    /// ends the session; any other failure is returned as is.
    pub async fn step(&self, out: &mut dyn Write) -> Result<Flow> {
        let query = match self.input.next_city() {
            Ok(Some(query)) => query,
            Ok(None) => {
                debug!("input exhausted");
                return Ok(Flow::Stop);
            }
            Err(err) if is_interrupt(&err) => return Ok(Flow::Stop),
            Err(err) => return Err(err),
        };

        if query.is_empty() {
            return Ok(Flow::Continue);
        }

        tokio::select! {
            shown = self.show(&query, out) => match shown {
                Ok(()) => Ok(Flow::Continue),
                Err(err) if is_interrupt(&err) => Ok(Flow::Stop),
                Err(err) => Err(err),
            },
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for Ctrl-C")?;
                debug!("interrupted during request");
                Ok(Flow::Stop)
            }
        }
    }

    /// Resolve `query` and write its daily forecast to `out`.
    pub async fn show(&self, query: &str, out: &mut dyn Write) -> Result<()> {
        let city = resolve_city(self.service.as_ref(), query, self.selector.as_ref()).await?;

        let Some(city) = city else {
            writeln!(out, "No city found for '{query}'.")?;
            return Ok(());
        };

        let entries = fetch_forecast(self.service.as_ref(), city.lat, city.lon).await?;
        write_forecast(out, &entries)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::LineInput;
    use async_trait::async_trait;
    use citycast_core::{City, FirstMatch, FixedChoice, ForecastEntry, WeatherError};
    use inquire::InquireError;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    /// Returns the same candidates for every query; readings are labelled
    /// with the latitude they were fetched for.
    #[derive(Debug)]
    struct StubService {
        cities: Vec<City>,
        readings: usize,
        searches: Arc<AtomicUsize>,
    }

    fn city(name: &str, lat: f64, lon: f64) -> City {
        City { name: name.into(), lat, lon, country: None, state: None }
    }

    #[async_trait]
    impl WeatherService for StubService {
        async fn search_cities(&self, _query: &str) -> Result<Vec<City>> {
            self.searches.fetch_add(1, Ordering::SeqCst);
            Ok(self.cities.clone())
        }

        async fn forecast_series(&self, lat: f64, _lon: f64) -> Result<Vec<ForecastEntry>> {
            Ok((0..self.readings)
                .map(|i| ForecastEntry {
                    timestamp_text: format!("2024-05-{:02} {:02}:00:00", 14 + i / 8, (i % 8) * 3),
                    description: format!("sky at {lat}"),
                    temperature: i as f64,
                })
                .collect())
        }
    }

    /// Stands in for a terminal whose user presses Ctrl-C.
    struct Interrupted;

    impl CityInput for Interrupted {
        fn next_city(&self) -> Result<Option<String>> {
            Err(InquireError::OperationInterrupted.into())
        }
    }

    struct Fixture {
        session: Session,
        searches: Arc<AtomicUsize>,
    }

    fn fixture(
        cities: Vec<City>,
        readings: usize,
        input: Box<dyn CityInput>,
        selector: Box<dyn Selector>,
    ) -> Fixture {
        let searches = Arc::new(AtomicUsize::new(0));
        let service = StubService { cities, readings, searches: Arc::clone(&searches) };
        Fixture { session: Session::new(Box::new(service), input, selector), searches }
    }

    /// A session reading `script` line by line, for both cities and menu answers.
    fn scripted(cities: Vec<City>, readings: usize, script: &'static str) -> Fixture {
        let lines = LineInput::new(script.as_bytes());
        fixture(cities, readings, Box::new(lines.clone()), Box::new(lines))
    }

    fn london_candidates() -> Vec<City> {
        vec![city("London", 51.5, -0.12), city("City of London", 51.51, -0.09)]
    }

    async fn ran(session: &Session) -> Result<String> {
        let mut out = Vec::new();
        session.run(&mut out).await?;
        Ok(String::from_utf8(out).expect("output is utf-8"))
    }

    async fn shown(session: &Session, query: &str) -> Result<String> {
        let mut out = Vec::new();
        session.show(query, &mut out).await?;
        Ok(String::from_utf8(out).expect("output is utf-8"))
    }

    #[tokio::test]
    async fn run_skips_blank_lines_and_stops_at_end_of_input() {
        let f = scripted(vec![city("Paris", 48.85, 2.32)], 16, "\nParis\n");

        let text = ran(&f.session).await.unwrap();

        assert_eq!(
            text,
            "2024-05-1: sky at 48.85 0.0\n2024-05-1: sky at 48.85 8.0\n\nGoodbye!\n"
        );
        assert_eq!(f.searches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn run_loops_over_several_cities() {
        let f = scripted(vec![city("Paris", 48.85, 2.32)], 8, "Paris\nParis\n");

        let text = ran(&f.session).await.unwrap();

        assert_eq!(text.matches("sky at 48.85").count(), 2);
        assert!(text.ends_with("\nGoodbye!\n"));
    }

    #[tokio::test]
    async fn interrupt_at_the_prompt_says_goodbye() {
        let f = fixture(london_candidates(), 8, Box::new(Interrupted), Box::new(FirstMatch));

        let text = ran(&f.session).await.unwrap();

        assert_eq!(text, "\nGoodbye!\n");
        assert_eq!(f.searches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn step_reports_continue_then_stop() {
        let f = scripted(vec![city("Paris", 48.85, 2.32)], 8, "Paris\n");
        let mut out = Vec::new();

        assert_eq!(f.session.step(&mut out).await.unwrap(), Flow::Continue);
        assert_eq!(f.session.step(&mut out).await.unwrap(), Flow::Stop);
    }

    #[tokio::test]
    async fn menu_answer_comes_from_the_next_line() {
        let f = scripted(london_candidates(), 8, "London\n2\n");

        let text = ran(&f.session).await.unwrap();

        assert_eq!(text, "2024-05-1: sky at 51.51 0.0\n\nGoodbye!\n");
    }

    #[tokio::test]
    async fn non_numeric_menu_answer_is_fatal() {
        let f = scripted(london_candidates(), 8, "London\nsecond\nParis\n");

        let err = ran(&f.session).await.unwrap_err();

        assert_eq!(
            err.downcast_ref::<WeatherError>(),
            Some(&WeatherError::UnreadableSelection { input: "second".into() })
        );
    }

    #[tokio::test]
    async fn out_of_range_menu_answer_is_fatal() {
        let f = scripted(london_candidates(), 8, "London\n3\n");

        let err = ran(&f.session).await.unwrap_err();

        assert_eq!(
            err.downcast_ref::<WeatherError>(),
            Some(&WeatherError::InvalidSelection { choice: 3, count: 2 })
        );
    }

    #[tokio::test]
    async fn missing_city_is_reported_and_the_loop_goes_on() {
        let f = scripted(Vec::new(), 40, "LGTM\n");

        let text = ran(&f.session).await.unwrap();

        assert_eq!(text, "No city found for 'LGTM'.\n\nGoodbye!\n");
    }

    #[tokio::test]
    async fn fixed_choice_overrides_the_menu() {
        let f = fixture(london_candidates(), 8, Box::new(Interrupted), Box::new(FixedChoice(2)));

        let text = shown(&f.session, "London").await.unwrap();

        assert_eq!(text, "2024-05-1: sky at 51.51 0.0\n");
    }

    #[tokio::test]
    async fn short_series_prints_a_notice() {
        let f = fixture(vec![city("Paris", 48.85, 2.32)], 3, Box::new(Interrupted), Box::new(FirstMatch));

        let text = shown(&f.session, "Paris").await.unwrap();

        assert_eq!(text, "No forecast data available.\n");
    }
}
