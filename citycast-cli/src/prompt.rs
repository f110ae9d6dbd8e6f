use std::{cell::RefCell, io::BufRead, rc::Rc};

use anyhow::{Context, Result, anyhow};
use citycast_core::{City, Config, Selector, WeatherError};
use inquire::{CustomType, CustomUserError, InquireError, Text, validator::Validation};

use crate::output::menu_line;

/// Prints the enumerated candidates and asks for a number on the terminal.
///
/// Out-of-range and non-numeric answers are rejected by the prompt itself,
/// which keeps asking until it gets a usable choice.
#[derive(Debug, Default)]
pub struct PromptSelector;

impl Selector for PromptSelector {
    fn choose(&self, candidates: &[City]) -> Result<usize> {
        for (index, city) in candidates.iter().enumerate() {
            println!("{}", menu_line(index, city));
        }

        let count = candidates.len();
        let choice = CustomType::<usize>::new("Choose your city")
            .with_error_message("Please type a number")
            .with_validator(move |choice: &usize| -> Result<Validation, CustomUserError> {
                if (1..=count).contains(choice) {
                    Ok(Validation::Valid)
                } else {
                    Ok(Validation::Invalid(
                        format!("Pick a number between 1 and {count}").into(),
                    ))
                }
            })
            .prompt()?;

        Ok(choice)
    }
}

/// Where city queries come from.
pub trait CityInput {
    /// The next query, trimmed and possibly empty. `None` once input is exhausted.
    fn next_city(&self) -> Result<Option<String>>;
}

/// Interactive prompt; never runs out, Ctrl-C surfaces as an error.
#[derive(Debug, Default)]
pub struct TerminalInput;

impl CityInput for TerminalInput {
    fn next_city(&self) -> Result<Option<String>> {
        let query = Text::new("City?").prompt()?;
        Ok(Some(query.trim().to_string()))
    }
}

/// Plain line reader for piped or scripted stdin.
///
/// One city per line. When a city is ambiguous the next line must hold the
/// menu number; clones share the same reader so both roles consume one stream.
#[derive(Debug)]
pub struct LineInput<R> {
    reader: Rc<RefCell<R>>,
}

impl<R> Clone for LineInput<R> {
    fn clone(&self) -> Self {
        Self { reader: Rc::clone(&self.reader) }
    }
}

impl<R: BufRead> LineInput<R> {
    pub fn new(reader: R) -> Self {
        Self { reader: Rc::new(RefCell::new(reader)) }
    }

    fn read_line(&self) -> Result<Option<String>> {
        let mut line = String::new();
        let read = self
            .reader
            .borrow_mut()
            .read_line(&mut line)
            .context("Failed to read standard input")?;

        Ok((read > 0).then(|| line.trim().to_string()))
    }
}

impl<R: BufRead> CityInput for LineInput<R> {
    fn next_city(&self) -> Result<Option<String>> {
        self.read_line()
    }
}

/// No re-prompting here: a bad line is fatal, out-of-range numbers are
/// rejected by the resolver.
impl<R: BufRead> Selector for LineInput<R> {
    fn choose(&self, candidates: &[City]) -> Result<usize> {
        for (index, city) in candidates.iter().enumerate() {
            println!("{}", menu_line(index, city));
        }

        let line = self
            .read_line()?
            .ok_or_else(|| anyhow!("Input ended before a city was chosen"))?;

        match line.parse::<usize>() {
            Ok(choice) => Ok(choice),
            Err(_) => Err(WeatherError::UnreadableSelection { input: line }.into()),
        }
    }
}

/// True when the error chain carries a Ctrl-C or Esc from a prompt.
pub fn is_interrupt(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<InquireError>(),
        Some(InquireError::OperationInterrupted | InquireError::OperationCanceled)
    )
}

/// Walk through every config field, starting from the current values.
pub fn edit_config(current: &Config) -> Result<Config> {
    let base_url = Text::new("Base URL:")
        .with_default(&current.base_url)
        .prompt()
        .context("Failed to read base URL")?;

    let api_key = Text::new("API key (leave empty for none):")
        .with_initial_value(current.api_key.as_deref().unwrap_or_default())
        .prompt()
        .context("Failed to read API key")?;

    let units = Text::new("Units (metric, imperial, standard; empty for the service default):")
        .with_initial_value(current.units.as_deref().unwrap_or_default())
        .prompt()
        .context("Failed to read units")?;

    let timeout_secs = CustomType::<u64>::new("Request timeout in seconds:")
        .with_default(current.timeout_secs)
        .with_error_message("Please type a whole number of seconds")
        .prompt()
        .context("Failed to read timeout")?;

    let edited = Config {
        base_url: base_url.trim().to_string(),
        api_key: non_empty(api_key),
        units: non_empty(units),
        timeout_secs,
        ..current.clone()
    };
    edited.validate()?;

    Ok(edited)
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
