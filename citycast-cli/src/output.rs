use std::io::{self, Write};

use citycast_core::{City, ForecastEntry};

/// Characters of `dt_txt` shown in front of each forecast line.
const TIMESTAMP_WIDTH: usize = 9;

/// `<index>, <name>` with a 1-based index.
pub fn menu_line(index: usize, city: &City) -> String {
    format!("{}, {}", index + 1, city.name)
}

/// `<dt_txt prefix>: <description> <temperature>`.
///
/// The temperature always keeps its decimal point (`14.0`, not `14`).
pub fn forecast_line(entry: &ForecastEntry) -> String {
    let stamp: String = entry.timestamp_text.chars().take(TIMESTAMP_WIDTH).collect();
    format!("{stamp}: {} {:?}", entry.description, entry.temperature)
}

/// `<name>: (<lat>, <lon>)`.
pub fn lookup_line(city: &City) -> String {
    format!("{}: ({}, {})", city.name, city.lat, city.lon)
}

pub fn write_forecast(out: &mut dyn Write, entries: &[ForecastEntry]) -> io::Result<()> {
    if entries.is_empty() {
        return writeln!(out, "No forecast data available.");
    }

    for entry in entries {
        writeln!(out, "{}", forecast_line(entry))?;
    }
    Ok(())
}
