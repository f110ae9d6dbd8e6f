use std::io::{self, IsTerminal};

use anyhow::Result;
use citycast_core::{
    Config, FirstMatch, FixedChoice, Selector, WeatherService, service_from_config,
};
use clap::{Parser, Subcommand};

use crate::{
    output::lookup_line,
    prompt::{CityInput, LineInput, PromptSelector, TerminalInput, edit_config, is_interrupt},
    session::Session,
};

/// Top-level CLI struct. Without a subcommand it keeps asking for cities.
#[derive(Debug, Parser)]
#[command(name = "citycast", version, about = "Daily weather forecast for a city")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Override the configured API base URL for this run.
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Override the configured request timeout for this run.
    #[arg(long, global = true, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Take the first match instead of asking when a city name is ambiguous.
    #[arg(long, global = true, conflicts_with = "choice")]
    pub pick_first: bool,

    /// Answer the city menu with this number (1-based) instead of asking.
    #[arg(long, global = true, value_name = "N")]
    pub choice: Option<usize>,

    /// Log requests and resolution steps to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Edit and save the configuration file.
    Configure,

    /// List every geocoding match with its coordinates.
    Lookup {
        /// City name, e.g. "Barcelona".
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Print the daily forecast for one city and exit.
    Forecast {
        /// City name, e.g. "London".
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let (input, selector) =
            console(scripted_selector(self.pick_first, self.choice), io::stdin().is_terminal());

        match self.command {
            Some(Command::Configure) => configure(),
            Some(Command::Lookup { query }) => {
                let service = build_service(self.base_url, self.timeout)?;
                lookup(service.as_ref(), &query.join(" ")).await
            }
            Some(Command::Forecast { query }) => {
                let service = build_service(self.base_url, self.timeout)?;
                Session::new(service, input, selector)
                    .show(&query.join(" "), &mut io::stdout())
                    .await
            }
            None => {
                let service = build_service(self.base_url, self.timeout)?;
                Session::new(service, input, selector).run(&mut io::stdout()).await
            }
        }
    }
}

/// A menu answer fixed by flags, if any.
fn scripted_selector(pick_first: bool, choice: Option<usize>) -> Option<Box<dyn Selector>> {
    match (choice, pick_first) {
        (Some(n), _) => Some(Box::new(FixedChoice(n))),
        (None, true) => Some(Box::new(FirstMatch)),
        (None, false) => None,
    }
}

/// Prompts when a user sits at a terminal, plain stdin lines otherwise.
/// A scripted selector still answers the menu in both cases.
fn console(
    scripted: Option<Box<dyn Selector>>,
    terminal: bool,
) -> (Box<dyn CityInput>, Box<dyn Selector>) {
    if terminal {
        let selector: Box<dyn Selector> = match scripted {
            Some(selector) => selector,
            None => Box::new(PromptSelector),
        };
        return (Box::new(TerminalInput), selector);
    }

    let lines = LineInput::new(io::stdin().lock());
    let selector: Box<dyn Selector> = match scripted {
        Some(selector) => selector,
        None => Box::new(lines.clone()),
    };
    (Box::new(lines), selector)
}

fn build_service(base_url: Option<String>, timeout: Option<u64>) -> Result<Box<dyn WeatherService>> {
    let config = Config::load(base_url, timeout)?;
    service_from_config(&config)
}

async fn lookup(service: &dyn WeatherService, query: &str) -> Result<()> {
    let cities = service.search_cities(query).await?;
    if cities.is_empty() {
        println!("No city found for '{query}'.");
    }

    for city in &cities {
        println!("{}", lookup_line(city));
    }
    Ok(())
}

fn configure() -> Result<()> {
    let current = Config::stored()?;

    let edited = match edit_config(&current) {
        Ok(edited) => edited,
        Err(err) if is_interrupt(&err) => {
            println!("Configuration unchanged.");
            return Ok(());
        }
        Err(err) => return Err(err),
    };

    let path = edited.save()?;
    println!("Configuration saved to {}", path.display());
    Ok(())
}
