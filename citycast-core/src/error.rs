use thiserror::Error;

/// Domain failures callers may want to tell apart.
///
/// Everything else (transport errors, malformed JSON) travels as a plain
/// `anyhow::Error` with context attached.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WeatherError {
    #[error("Invalid selection {choice}: expected a number between 1 and {count}")]
    InvalidSelection { choice: usize, count: usize },

    #[error("Invalid selection '{input}': expected a number")]
    UnreadableSelection { input: String },

    #[error("Upstream request failed with status {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    #[error("Forecast entry at {timestamp} carries no weather description")]
    MissingDescription { timestamp: String },
}

/// Cut a response body down to something that fits in an error message.
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }

    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
